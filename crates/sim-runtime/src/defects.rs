//! Defect sampling: one Bernoulli trial per unit a worker touches.

use rand::distributions::{Bernoulli, Distribution};
use rand::Rng;
use sim_core::{DefectOutcome, EmployeeQuality, WorkerProfile};
use tracing::{debug, warn};

/// Outcome of one sampling pass over the selected workers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DefectReport {
    pub per_worker: Vec<DefectOutcome>,
    /// Units lost, never more than the ordered quantity.
    pub total_defective: u64,
    pub final_quantity: u64,
}

/// Draw defects for every worker over `quantity` units.
///
/// Every worker handles all units, so per-worker counts are independent
/// draws from Binomial(quantity, rate / 100). The total is capped at
/// `quantity`, which keeps `final_quantity + total_defective == quantity`.
pub fn sample_defects<R: Rng + ?Sized>(
    quantity: u64,
    workers: &[WorkerProfile],
    rng: &mut R,
) -> DefectReport {
    let mut per_worker = Vec::with_capacity(workers.len());
    for w in workers {
        let defective_count = draw_defective(quantity, w, rng);
        debug!(worker = %w.id, quantity, defective_count, "sampled defects");
        per_worker.push(DefectOutcome {
            worker_id: w.id.clone(),
            units_assigned: quantity,
            defective_count,
        });
    }
    let raw_total: u64 = per_worker.iter().map(|o| o.defective_count).sum();
    let total_defective = raw_total.min(quantity);
    DefectReport {
        per_worker,
        total_defective,
        final_quantity: quantity - total_defective,
    }
}

fn draw_defective<R: Rng + ?Sized>(quantity: u64, worker: &WorkerProfile, rng: &mut R) -> u64 {
    if quantity == 0 || worker.defect_rate.is_nan() || worker.defect_rate <= 0.0 {
        return 0;
    }
    let p = (worker.defect_rate / 100.0).min(1.0);
    match Bernoulli::new(p) {
        Ok(dist) => (0..quantity).filter(|_| dist.sample(rng)).count() as u64,
        Err(e) => {
            warn!(worker = %worker.id, rate = worker.defect_rate, error = %e, "skipping unusable defect rate");
            0
        }
    }
}

/// Percent of good units in one outcome; 100 when nothing was assigned.
pub fn outcome_quality(outcome: &DefectOutcome) -> f64 {
    if outcome.units_assigned == 0 {
        return 100.0;
    }
    let good = outcome.units_assigned.saturating_sub(outcome.defective_count);
    100.0 * good as f64 / outcome.units_assigned as f64
}

impl DefectReport {
    /// Per-worker quality, named from `roster` (falls back to the id).
    pub fn employee_quality(&self, roster: &[WorkerProfile]) -> Vec<EmployeeQuality> {
        self.per_worker
            .iter()
            .map(|o| {
                let name = roster
                    .iter()
                    .find(|w| w.id == o.worker_id)
                    .map(|w| w.name.clone())
                    .unwrap_or_else(|| o.worker_id.clone());
                EmployeeQuality {
                    id: o.worker_id.clone(),
                    name,
                    defective: o.defective_count,
                    quality: outcome_quality(o),
                }
            })
            .collect()
    }

    /// Mean worker quality, `None` without workers.
    pub fn average_quality(&self) -> Option<f64> {
        if self.per_worker.is_empty() {
            return None;
        }
        let sum: f64 = self.per_worker.iter().map(outcome_quality).sum();
        Some(sum / self.per_worker.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeded_rng;
    use proptest::prelude::*;
    use sim_core::default_roster;
    use std::collections::BTreeMap;

    fn worker(id: &str, rate: f64) -> WorkerProfile {
        WorkerProfile {
            id: id.to_string(),
            name: format!("W{id}"),
            hourly_rate: Default::default(),
            defect_rate: rate,
            skills: BTreeMap::new(),
        }
    }

    #[test]
    fn no_workers_means_no_defects() {
        let mut rng = seeded_rng(1);
        let r = sample_defects(500, &[], &mut rng);
        assert_eq!(r.total_defective, 0);
        assert_eq!(r.final_quantity, 500);
        assert_eq!(r.average_quality(), None);
    }

    #[test]
    fn zero_quantity_draws_nothing() {
        let mut rng = seeded_rng(1);
        let r = sample_defects(0, &[worker("a", 50.0)], &mut rng);
        assert_eq!(r.per_worker[0].defective_count, 0);
        assert_eq!(r.final_quantity, 0);
        assert_eq!(r.average_quality(), Some(100.0));
    }

    #[test]
    fn ten_percent_rate_lands_near_one_hundred() {
        for seed in 0..3 {
            let mut rng = seeded_rng(seed);
            let r = sample_defects(1000, &[worker("a", 10.0)], &mut rng);
            assert!((70..=130).contains(&r.total_defective), "seed {seed}: {}", r.total_defective);
        }
    }

    #[test]
    fn same_seed_same_draw() {
        let roster = default_roster();
        let a = sample_defects(2000, &roster, &mut seeded_rng(7));
        let b = sample_defects(2000, &roster, &mut seeded_rng(7));
        assert_eq!(a, b);
    }

    #[test]
    fn total_is_capped_at_quantity() {
        let workers = [worker("a", 100.0), worker("b", 100.0)];
        let r = sample_defects(10, &workers, &mut seeded_rng(3));
        assert_eq!(r.per_worker[0].defective_count, 10);
        assert_eq!(r.per_worker[1].defective_count, 10);
        assert_eq!(r.total_defective, 10);
        assert_eq!(r.final_quantity, 0);
    }

    #[test]
    fn unusable_rates_are_ignored() {
        let workers = [worker("nan", f64::NAN), worker("neg", -4.0), worker("big", 250.0)];
        let r = sample_defects(20, &workers, &mut seeded_rng(3));
        assert_eq!(r.per_worker[0].defective_count, 0);
        assert_eq!(r.per_worker[1].defective_count, 0);
        assert_eq!(r.per_worker[2].defective_count, 20);
    }

    #[test]
    fn employee_quality_uses_roster_names() {
        let report = DefectReport {
            per_worker: vec![
                DefectOutcome { worker_id: "1".into(), units_assigned: 200, defective_count: 20 },
                DefectOutcome { worker_id: "zz".into(), units_assigned: 200, defective_count: 0 },
            ],
            total_defective: 20,
            final_quantity: 180,
        };
        let q = report.employee_quality(&default_roster());
        assert_eq!(q[0].name, "Ashley");
        assert!((q[0].quality - 90.0).abs() < 1e-9);
        assert_eq!(q[1].name, "zz");
        assert!((report.average_quality().unwrap() - 95.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn conservation_holds(quantity in 0u64..3000, rates in proptest::collection::vec(0.0f64..=100.0, 0..6), seed in any::<u64>()) {
            let workers: Vec<_> = rates.iter().enumerate().map(|(i, r)| worker(&i.to_string(), *r)).collect();
            let r = sample_defects(quantity, &workers, &mut seeded_rng(seed));
            prop_assert_eq!(r.final_quantity + r.total_defective, quantity);
        }

        #[test]
        fn zero_rate_never_defects(quantity in 0u64..5000, seed in any::<u64>()) {
            let r = sample_defects(quantity, &[worker("z", 0.0)], &mut seeded_rng(seed));
            prop_assert_eq!(r.per_worker[0].defective_count, 0);
        }
    }
}
