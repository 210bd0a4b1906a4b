#![deny(warnings)]

//! Headless client: runs one simulation pass, optionally syncing with the API.

mod api;

use anyhow::{Context, Result};
use api::{ApiClient, ClientError};
use sim_core::*;
use sim_runtime::{
    build_snapshot, crew_from_factory, factory_plan, seeded_rng, FileSessionStore,
    PerformanceInsights, Session, SessionStore, SnapshotOptions,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

const DEFAULT_SESSION_PATH: &str = "./saves/session.json";

#[derive(Debug, Clone, PartialEq)]
struct CliArgs {
    quantity: Option<u64>,
    quality: Option<u32>,
    workers: Option<Vec<String>>,
    all_stations: bool,
    enhancements: Vec<String>,
    seed: Option<u64>,
    settings: Option<PathBuf>,
    server: Option<String>,
    session: PathBuf,
    new_simulation: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            quantity: None,
            quality: None,
            workers: None,
            all_stations: false,
            enhancements: Vec::new(),
            seed: None,
            settings: None,
            server: None,
            session: PathBuf::from(DEFAULT_SESSION_PATH),
            new_simulation: false,
        }
    }
}

fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> CliArgs {
    let mut out = CliArgs::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--quantity" => out.quantity = it.next().and_then(|s| s.parse().ok()),
            "--quality" => out.quality = it.next().and_then(|s| s.parse().ok()),
            "--workers" => out.workers = it.next().map(|s| split_ids(&s)),
            "--all-stations" => out.all_stations = true,
            "--enhancements" => out.enhancements = it.next().map(|s| split_ids(&s)).unwrap_or_default(),
            "--seed" => out.seed = it.next().and_then(|s| s.parse().ok()),
            "--settings" => out.settings = it.next().map(PathBuf::from),
            "--server" => out.server = it.next(),
            "--session" => {
                if let Some(path) = it.next() {
                    out.session = PathBuf::from(path);
                }
            }
            "--new" => out.new_simulation = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    out
}

fn settings_from_file(path: &Path) -> Result<SimulationSettings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings file {}", path.display()))?;
    Ok(SimulationSettings::from_yaml_str(&text)?)
}

/// Server settings first, then the YAML file, then built-in defaults.
async fn load_settings(client: Option<&ApiClient>, path: Option<&Path>) -> SimulationSettings {
    if let Some(client) = client {
        match client.get_config().await {
            Ok(Some(settings)) => match validate_settings(&settings) {
                Ok(()) => return settings,
                Err(e) => warn!(error = %e, "server settings are invalid"),
            },
            Ok(None) => info!("server has no settings saved"),
            Err(e) => warn!(error = %e, "could not fetch settings"),
        }
    }
    if let Some(path) = path {
        match settings_from_file(path) {
            Ok(settings) => return settings,
            Err(e) => warn!(error = %format!("{e:#}"), "falling back to default settings"),
        }
    }
    SimulationSettings::default()
}

/// Save the simulation sections. Failures are logged and the run goes on.
async fn sync_simulation<S: SessionStore>(
    client: &ApiClient,
    session: &mut Session<S>,
    update: &SimulationUpdate,
) -> Result<()> {
    let saved = match session.simulation_id() {
        Some(id) => match client.update_simulation(id, update).await {
            Err(ClientError::NotFound(_)) => {
                warn!(id, "stored simulation is gone, creating a new one");
                client.create_simulation(update).await
            }
            other => other,
        },
        None => client.create_simulation(update).await,
    };
    match saved {
        Ok(id) => {
            info!(id, "simulation saved");
            session.set_simulation_id(id)?;
        }
        Err(e) => warn!(error = %e, "could not save simulation"),
    }
    Ok(())
}

fn print_report(snapshot: &OutcomeSnapshot, seed: u64) {
    let money = |v: Option<rust_decimal::Decimal>| v.map_or("-".to_string(), |d| format!("${d}"));
    let pct = |v: Option<rust_decimal::Decimal>| v.map_or("-".to_string(), |d| format!("{d}%"));
    println!(
        "Run OK | quantity: {} | quality: {} | price/unit: ${} | weeks: {} | seed: {}",
        snapshot.quantity,
        snapshot.quality_rating,
        snapshot.price_per_unit,
        snapshot.time_to_produce_weeks,
        seed
    );
    println!(
        "KPI | spending: ${} | potential revenue: ${} | potential profit: ${} | margin: {}",
        snapshot.spending_forecast.total_spending,
        snapshot.potential_revenue,
        snapshot.potential_profit,
        pct(snapshot.potential_margin_percent)
    );
    println!(
        "KPI | defects: {} | sellable: {} | eff. quality: {} | price: {} | revenue: {} | profit: {} | margin: {}",
        snapshot.defective_units.unwrap_or(0),
        snapshot.final_quantity.unwrap_or(snapshot.quantity),
        snapshot
            .effective_quality
            .map_or("-".to_string(), |q| format!("{q:.1}")),
        money(snapshot.final_selling_price),
        money(snapshot.actual_revenue),
        money(snapshot.actual_profit),
        pct(snapshot.actual_margin_percent)
    );
    if let Some(insights) = PerformanceInsights::from_snapshot(snapshot) {
        println!(
            "Crew | grade: {} | avg quality: {:.1}% | defect rate: {:.1}% | gap: {}",
            insights.grade, insights.average_quality, insights.defect_rate_percent, insights.performance_gap
        );
        for line in &insights.advice {
            println!("  - {line}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args(std::env::args().skip(1));
    info!(?args, "starting CLI");

    let client = args.server.as_deref().map(ApiClient::new).transpose()?;
    let settings = load_settings(client.as_ref(), args.settings.as_deref()).await;
    let table = settings.price_table()?;

    let mut params = SimulationParameters::default();
    params.quantity = settings.clamp_quantity(args.quantity.unwrap_or(params.quantity));
    params.quality_rating = settings.snap_quality(args.quality.unwrap_or(params.quality_rating));

    let roster = default_roster();
    let worker_ids = args
        .workers
        .clone()
        .unwrap_or_else(|| roster.iter().map(|w| w.id.clone()).collect());
    let factory = factory_plan(&roster, &worker_ids, args.all_stations)?;
    let crew = crew_from_factory(&factory, &roster)?;

    let mut session = Session::new(FileSessionStore::open(&args.session)?);
    if args.new_simulation {
        session.start_new_simulation()?;
    }

    if let Some(client) = &client {
        let price = sim_econ::price_for_quality(f64::from(params.quality_rating), &table);
        let update = SimulationUpdate {
            warehouse_data: Some(WarehouseData::new(&params, price)),
            factory_data: Some(factory.clone()),
            extra_additions: Some(ExtraAdditions {
                selected_add_on_ids: args.enhancements.clone(),
            }),
        };
        sync_simulation(client, &mut session, &update).await?;
    }

    let options = SnapshotOptions {
        simulation_id: session.simulation_id(),
        ..SnapshotOptions::default()
    }
    .with_enhancement_ids(&args.enhancements, &enhancement_catalogue())?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = seeded_rng(seed);
    let snapshot = build_snapshot(&params, &table, &crew, &options, &mut rng)?;

    if let Some(client) = &client {
        match client.create_order(&snapshot).await {
            Ok(id) => info!(id, "order saved"),
            Err(e) => warn!(error = %e, "could not save order"),
        }
    }
    session.set_last_order(&snapshot)?;

    print_report(&snapshot, seed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_runtime::MemorySessionStore;

    fn args(list: &[&str]) -> CliArgs {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_without_flags() {
        let a = args(&[]);
        assert_eq!(a, CliArgs::default());
        assert_eq!(a.session, PathBuf::from(DEFAULT_SESSION_PATH));
    }

    #[test]
    fn flags_are_parsed() {
        let a = args(&[
            "--quantity", "4500", "--quality", "50", "--workers", "1, 2,,3", "--all-stations",
            "--enhancements", "shoelace-protector", "--seed", "7", "--server", "http://localhost:5000",
            "--session", "/tmp/s.json", "--new",
        ]);
        assert_eq!(a.quantity, Some(4500));
        assert_eq!(a.quality, Some(50));
        assert_eq!(a.workers, Some(vec!["1".into(), "2".into(), "3".into()]));
        assert!(a.all_stations && a.new_simulation);
        assert_eq!(a.enhancements, vec!["shoelace-protector".to_string()]);
        assert_eq!(a.seed, Some(7));
        assert_eq!(a.server.as_deref(), Some("http://localhost:5000"));
        assert_eq!(a.session, PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn bad_numbers_are_dropped() {
        let a = args(&["--quantity", "lots", "--bogus", "--seed"]);
        assert_eq!(a.quantity, None);
        assert_eq!(a.seed, None);
    }

    #[tokio::test]
    async fn unreadable_settings_fall_back_to_defaults() {
        let s = load_settings(None, Some(Path::new("/definitely/not/here.yaml"))).await;
        assert_eq!(s, SimulationSettings::default());
        assert_eq!(load_settings(None, None).await, SimulationSettings::default());
    }

    #[tokio::test]
    async fn unreachable_server_does_not_abort_sync() {
        let client = ApiClient::new("http://127.0.0.1:1").unwrap();
        let mut session = Session::new(MemorySessionStore::default());
        let update = SimulationUpdate {
            extra_additions: Some(ExtraAdditions::default()),
            ..Default::default()
        };
        sync_simulation(&client, &mut session, &update).await.unwrap();
        assert_eq!(session.simulation_id(), None);
    }
}
