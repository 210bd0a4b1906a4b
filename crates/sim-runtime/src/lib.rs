#![deny(warnings)]

//! Production runtime for the factory simulation.
//!
//! Samples defects per worker, times the factory stations, derives the
//! results-view insights and aggregates everything into an
//! [`sim_core::OutcomeSnapshot`]. Also hosts the small persisted session
//! store the client keeps between steps.

pub mod defects;
pub mod insights;
pub mod session;
pub mod snapshot;
pub mod stations;

pub use defects::{sample_defects, DefectReport};
pub use insights::{PerformanceInsights, QualityGrade};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionError, SessionStore};
pub use snapshot::{build_snapshot, preview, SnapshotOptions};
pub use stations::{
    best_station, crew_from_factory, factory_plan, find_bottleneck, labour_cost, station_loads,
    station_minutes, Bottleneck, CrewMember,
};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Errors raised while building an outcome.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("unknown worker id: {0}")]
    UnknownWorker(String),
    #[error("unknown enhancement id: {0}")]
    UnknownEnhancement(String),
    #[error("{0} overflowed")]
    Overflow(&'static str),
    #[error(transparent)]
    Econ(#[from] sim_econ::EconError),
    #[error(transparent)]
    Validation(#[from] sim_core::ValidationError),
}

/// Deterministic generator for reproducible runs.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}
