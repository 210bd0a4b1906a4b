//! Station timing, crew assembly, labour cost and bottleneck analysis.

use crate::RuntimeError;
use rust_decimal::Decimal;
use sim_core::{FactoryData, ProductionMode, QualityTier, Station, StationLoad, WorkerProfile};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Minutes per unit at a station, as `(best, worst)` for 5 and 1 stars.
pub fn minutes_range(station: Station, tier: QualityTier) -> (f64, f64) {
    match (tier, station) {
        (QualityTier::Basic, Station::Preparation) => (2.0, 4.0),
        (QualityTier::Basic, Station::Assembly) => (4.0, 8.0),
        (QualityTier::Basic, Station::Completion) => (3.0, 6.0),
        (QualityTier::Basic, Station::Inspection) => (2.0, 4.0),
        (QualityTier::Premium, Station::Preparation) => (4.0, 8.0),
        (QualityTier::Premium, Station::Assembly) => (10.0, 20.0),
        (QualityTier::Premium, Station::Completion) => (8.0, 16.0),
        (QualityTier::Premium, Station::Inspection) => (5.0, 10.0),
    }
}

/// Minutes a worker with `stars` needs per unit at `station`, rounded to 2 dp.
///
/// Linear in the rating: 5 stars hits the best time, 1 star the worst.
pub fn station_minutes(station: Station, stars: u8, tier: QualityTier) -> f64 {
    let (best, worst) = minutes_range(station, tier);
    let r = f64::from(stars.clamp(1, 5));
    let minutes = best + (worst - best) * (5.0 - r) / 4.0;
    (minutes * 100.0).round() / 100.0
}

/// A worker together with the stations they staff.
#[derive(Clone, Debug, PartialEq)]
pub struct CrewMember {
    pub worker: WorkerProfile,
    pub stations: Vec<Station>,
}

impl CrewMember {
    pub fn minutes_at(&self, station: Station, tier: QualityTier) -> f64 {
        station_minutes(station, self.worker.skill(station), tier)
    }

    /// Minutes this member spends on one unit across their stations.
    pub fn minutes_per_unit(&self, tier: QualityTier) -> f64 {
        self.stations.iter().map(|s| self.minutes_at(*s, tier)).sum()
    }

    /// `hourly_rate * quantity * minutes_per_unit / 60`, rounded to cents.
    pub fn labour_cost(&self, quantity: u64, tier: QualityTier) -> Result<Decimal, RuntimeError> {
        let minutes = sim_econ::to_money(self.minutes_per_unit(tier))?;
        self.worker
            .hourly_rate
            .checked_mul(Decimal::from(quantity))
            .and_then(|v| v.checked_mul(minutes))
            .map(|v| sim_econ::round_money(v / Decimal::from(60)))
            .ok_or(RuntimeError::Overflow("labour cost"))
    }
}

fn find_worker(roster: &[WorkerProfile], id: &str) -> Result<WorkerProfile, RuntimeError> {
    roster
        .iter()
        .find(|w| w.id == id)
        .cloned()
        .ok_or_else(|| RuntimeError::UnknownWorker(id.to_string()))
}

/// Resolve the factory step into crew members.
///
/// In `one` mode every assigned worker staffs their station and unassigned
/// workers stay home. In `all` mode each listed worker covers every station.
pub fn crew_from_factory(
    factory: &FactoryData,
    roster: &[WorkerProfile],
) -> Result<Vec<CrewMember>, RuntimeError> {
    match factory.production_mode {
        ProductionMode::One => factory
            .assignments
            .iter()
            .filter_map(|(id, station)| station.map(|s| (id, s)))
            .map(|(id, station)| {
                Ok(CrewMember {
                    worker: find_worker(roster, id)?,
                    stations: vec![station],
                })
            })
            .collect(),
        ProductionMode::All => {
            let mut seen = BTreeSet::new();
            factory
                .all_stations_employee_ids
                .iter()
                .filter(|id| seen.insert(id.as_str()))
                .map(|id| {
                    Ok(CrewMember {
                        worker: find_worker(roster, id)?,
                        stations: Station::ALL.to_vec(),
                    })
                })
                .collect()
        }
    }
}

/// Highest rated station of a worker; earlier stations win ties.
pub fn best_station(worker: &WorkerProfile) -> Station {
    let mut best = Station::Preparation;
    for station in Station::ALL {
        if worker.skill(station) > worker.skill(best) {
            best = station;
        }
    }
    best
}

/// Factory step for the given workers: their best station each, or every
/// station when `all_stations` is set.
pub fn factory_plan(
    roster: &[WorkerProfile],
    worker_ids: &[String],
    all_stations: bool,
) -> Result<FactoryData, RuntimeError> {
    let workers = worker_ids
        .iter()
        .map(|id| find_worker(roster, id))
        .collect::<Result<Vec<_>, _>>()?;
    if all_stations {
        return Ok(FactoryData {
            production_mode: ProductionMode::All,
            assignments: BTreeMap::new(),
            all_stations_employee_ids: workers.into_iter().map(|w| w.id).collect(),
        });
    }
    let assignments = workers
        .iter()
        .map(|w| (w.id.clone(), Some(best_station(w))))
        .collect();
    Ok(FactoryData {
        production_mode: ProductionMode::One,
        assignments,
        all_stations_employee_ids: Vec::new(),
    })
}

/// Total labour cost of the crew for `quantity` units.
pub fn labour_cost(
    crew: &[CrewMember],
    quantity: u64,
    tier: QualityTier,
) -> Result<Decimal, RuntimeError> {
    crew.iter().try_fold(Decimal::ZERO, |acc, m| {
        let cost = m.labour_cost(quantity, tier)?;
        acc.checked_add(cost).ok_or(RuntimeError::Overflow("labour cost"))
    })
}

/// Hours each staffed station needs for `quantity` units, staff working in
/// parallel. Unstaffed stations are left out.
pub fn station_loads(crew: &[CrewMember], quantity: u64, tier: QualityTier) -> Vec<StationLoad> {
    Station::ALL
        .into_iter()
        .filter_map(|station| {
            let minutes: Vec<f64> = crew
                .iter()
                .filter(|m| m.stations.contains(&station))
                .map(|m| m.minutes_at(station, tier))
                .collect();
            if minutes.is_empty() {
                return None;
            }
            let units_per_minute: f64 = minutes.iter().map(|m| 1.0 / m).sum();
            let hours = quantity as f64 / units_per_minute / 60.0;
            Some(StationLoad {
                station,
                staff: minutes.len() as u32,
                hours: (hours * 100.0).round() / 100.0,
            })
        })
        .collect()
}

/// The slowest station and its share of total station time.
#[derive(Clone, Debug, PartialEq)]
pub struct Bottleneck {
    pub station: Station,
    pub hours: f64,
    pub share_percent: f64,
}

/// Station with the most hours; the first one in line order on ties.
pub fn find_bottleneck(loads: &[StationLoad]) -> Option<Bottleneck> {
    let mut worst: Option<&StationLoad> = None;
    for load in loads {
        if worst.map_or(true, |w| load.hours > w.hours) {
            worst = Some(load);
        }
    }
    let worst = worst?;
    let total: f64 = loads.iter().map(|l| l.hours).sum();
    let share_percent = if total > 0.0 {
        worst.hours / total * 100.0
    } else {
        0.0
    };
    debug!(station = %worst.station, hours = worst.hours, share_percent, "bottleneck");
    Some(Bottleneck {
        station: worst.station,
        hours: worst.hours,
        share_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::default_roster;

    fn member(id: &str, stations: &[Station]) -> CrewMember {
        let worker = default_roster().into_iter().find(|w| w.id == id).unwrap();
        CrewMember { worker, stations: stations.to_vec() }
    }

    #[test]
    fn minutes_follow_star_rating() {
        let basic = QualityTier::Basic;
        assert_eq!(station_minutes(Station::Assembly, 5, basic), 4.0);
        assert_eq!(station_minutes(Station::Assembly, 1, basic), 8.0);
        assert_eq!(station_minutes(Station::Assembly, 3, basic), 6.0);
        assert_eq!(station_minutes(Station::Completion, 2, basic), 5.25);
        assert_eq!(station_minutes(Station::Assembly, 0, basic), 8.0);
        assert_eq!(station_minutes(Station::Assembly, 9, basic), 4.0);
        assert_eq!(station_minutes(Station::Assembly, 5, QualityTier::Premium), 10.0);
        assert_eq!(station_minutes(Station::Inspection, 4, QualityTier::Premium), 6.25);
    }

    #[test]
    fn labour_cost_scales_with_rate_and_time() {
        // Vu on assembly: 5 stars, 4 minutes, $15/h.
        let vu = member("2", &[Station::Assembly]);
        assert_eq!(vu.labour_cost(4500, QualityTier::Basic).unwrap(), Decimal::from(4500));
        // Mark on every station: 3.5 + 4 + 3.75 + 3.5 = 14.75 minutes.
        let mark = member("4", &Station::ALL);
        assert_eq!(mark.minutes_per_unit(QualityTier::Basic), 14.75);
        let total = labour_cost(&[vu, mark], 60, QualityTier::Basic).unwrap();
        assert_eq!(total, Decimal::from(60) + Decimal::new(7375, 1));
    }

    #[test]
    fn crew_from_one_mode_skips_unassigned() {
        let mut factory = FactoryData::default();
        factory.assignments.insert("1".into(), Some(Station::Completion));
        factory.assignments.insert("2".into(), None);
        let crew = crew_from_factory(&factory, &default_roster()).unwrap();
        assert_eq!(crew.len(), 1);
        assert_eq!(crew[0].worker.name, "Ashley");
        assert_eq!(crew[0].stations, vec![Station::Completion]);
    }

    #[test]
    fn crew_from_all_mode_covers_every_station_once() {
        let factory = FactoryData {
            production_mode: ProductionMode::All,
            assignments: BTreeMap::new(),
            all_stations_employee_ids: vec!["6".into(), "6".into(), "3".into()],
        };
        let crew = crew_from_factory(&factory, &default_roster()).unwrap();
        assert_eq!(crew.len(), 2);
        assert!(crew.iter().all(|m| m.stations.len() == 4));
    }

    #[test]
    fn unknown_worker_is_an_error() {
        let mut factory = FactoryData::default();
        factory.assignments.insert("99".into(), Some(Station::Assembly));
        assert!(matches!(
            crew_from_factory(&factory, &default_roster()),
            Err(RuntimeError::UnknownWorker(id)) if id == "99"
        ));
    }

    #[test]
    fn plan_puts_workers_on_their_best_station() {
        let roster = default_roster();
        assert_eq!(best_station(&roster[0]), Station::Completion);
        assert_eq!(best_station(&roster[4]), Station::Preparation);
        // Lucy is 5 at completion only.
        assert_eq!(best_station(&roster[2]), Station::Completion);
        let plan = factory_plan(&roster, &["2".into(), "5".into()], false).unwrap();
        assert_eq!(plan.assignments.get("2"), Some(&Some(Station::Assembly)));
        assert_eq!(plan.assignments.get("5"), Some(&Some(Station::Preparation)));
        let all = factory_plan(&roster, &["2".into()], true).unwrap();
        assert_eq!(all.production_mode, ProductionMode::All);
        assert!(factory_plan(&roster, &["nope".into()], false).is_err());
    }

    #[test]
    fn loads_run_staff_in_parallel_and_find_bottleneck() {
        let crew = vec![
            member("2", &[Station::Assembly]),
            member("4", &[Station::Assembly]),
            member("5", &[Station::Preparation]),
        ];
        let loads = station_loads(&crew, 600, QualityTier::Basic);
        assert_eq!(loads.len(), 2);
        // Two 4-minute assemblers: 600 units in 1200 minutes.
        let assembly = loads.iter().find(|l| l.station == Station::Assembly).unwrap();
        assert_eq!(assembly.staff, 2);
        assert_eq!(assembly.hours, 20.0);
        let prep = loads.iter().find(|l| l.station == Station::Preparation).unwrap();
        assert_eq!(prep.hours, 20.0);
        let b = find_bottleneck(&loads).unwrap();
        assert_eq!(b.station, Station::Preparation);
        assert!((b.share_percent - 50.0).abs() < 1e-9);
        assert!(find_bottleneck(&[]).is_none());
    }
}
