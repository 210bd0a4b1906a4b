//! Outcome aggregation: pricing, spending, defects and timing in one pass.

use crate::defects::sample_defects;
use crate::stations::{find_bottleneck, labour_cost, station_loads, CrewMember};
use crate::RuntimeError;
use rand::Rng;
use sim_core::{validate_snapshot, Enhancement, OutcomeSnapshot, PriceTable, SimulationParameters, WorkerProfile};
use sim_econ as econ;
use tracing::info;

/// Choices that shape the outcome beyond the warehouse parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotOptions {
    /// Quality zone used by the warehouse revenue preview.
    pub quality_zone: u32,
    /// Showroom add-ons applied to every unit.
    pub enhancements: Vec<Enhancement>,
    pub simulation_id: Option<i64>,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            quality_zone: econ::QUALITY_ZONE_BASELINE,
            enhancements: Vec::new(),
            simulation_id: None,
        }
    }
}

impl SnapshotOptions {
    /// Resolve add-on ids against `catalogue`.
    pub fn with_enhancement_ids(
        mut self,
        ids: &[String],
        catalogue: &[Enhancement],
    ) -> Result<Self, RuntimeError> {
        self.enhancements = ids
            .iter()
            .map(|id| {
                catalogue
                    .iter()
                    .find(|e| &e.id == id)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UnknownEnhancement(id.clone()))
            })
            .collect::<Result<_, _>>()?;
        Ok(self)
    }
}

/// Pre-defect order shown on the warehouse step. Draws nothing.
pub fn preview(
    params: &SimulationParameters,
    table: &PriceTable,
    options: &SnapshotOptions,
) -> Result<OutcomeSnapshot, RuntimeError> {
    let price_per_unit = econ::price_for_quality(f64::from(params.quality_rating), table);
    let spending_forecast = econ::cost_breakdown(params.quantity);
    let potential_revenue =
        econ::potential_revenue(params.quantity, price_per_unit, options.quality_zone)?;
    let potential_profit = econ::profit(potential_revenue, &spending_forecast);
    let snapshot = OutcomeSnapshot {
        simulation_id: options.simulation_id,
        quantity: params.quantity,
        quality_rating: params.quality_rating,
        price_per_unit,
        time_to_produce_weeks: econ::time_to_produce_weeks(params.quality_rating),
        potential_revenue,
        potential_profit,
        spending_forecast,
        selected_employee_ids: Vec::new(),
        defective_units: None,
        final_quantity: None,
        average_quality_across_workers: None,
        per_employee_quality: Vec::new(),
        effective_quality: None,
        final_selling_price: None,
        actual_revenue: None,
        actual_profit: None,
        potential_margin_percent: econ::margin_percent(potential_profit, potential_revenue),
        actual_margin_percent: None,
        station_hours: Vec::new(),
        bottleneck_station: None,
    };
    validate_snapshot(&snapshot)?;
    Ok(snapshot)
}

/// Full results snapshot for one run.
///
/// Spending includes crew labour and add-ons. Defects are sampled once from
/// `rng` and taken as the outcome of record. Both revenue paths are kept:
/// the quality-zone estimate and the post-defect actual.
pub fn build_snapshot<R: Rng + ?Sized>(
    params: &SimulationParameters,
    table: &PriceTable,
    crew: &[CrewMember],
    options: &SnapshotOptions,
    rng: &mut R,
) -> Result<OutcomeSnapshot, RuntimeError> {
    let quantity = params.quantity;
    let tier = params.tier();
    let mut snapshot = preview(params, table, options)?;

    let spending = snapshot
        .spending_forecast
        .clone()
        .with_labour(labour_cost(crew, quantity, tier)?)
        .with_enhancements(econ::enhancement_cost(quantity, &options.enhancements)?);
    snapshot.potential_profit = econ::profit(snapshot.potential_revenue, &spending);
    snapshot.potential_margin_percent =
        econ::margin_percent(snapshot.potential_profit, snapshot.potential_revenue);

    let workers: Vec<WorkerProfile> = crew.iter().map(|m| m.worker.clone()).collect();
    let report = sample_defects(quantity, &workers, rng);
    let average = report.average_quality();
    let effective = econ::effective_quality(params.quality_rating, average);
    let base_price = econ::selling_price(effective)?;
    let final_price = econ::round_money(base_price * econ::price_multiplier(&options.enhancements));
    let actual_revenue = econ::actual_revenue(report.final_quantity, final_price)?;
    let actual_profit = econ::profit(actual_revenue, &spending);

    let loads = station_loads(crew, quantity, tier);
    let bottleneck = find_bottleneck(&loads);

    snapshot.selected_employee_ids = workers.iter().map(|w| w.id.clone()).collect();
    snapshot.per_employee_quality = report.employee_quality(&workers);
    snapshot.defective_units = Some(report.total_defective);
    snapshot.final_quantity = Some(report.final_quantity);
    snapshot.average_quality_across_workers = average;
    snapshot.effective_quality = Some(effective);
    snapshot.final_selling_price = Some(final_price);
    snapshot.actual_revenue = Some(actual_revenue);
    snapshot.actual_profit = Some(actual_profit);
    snapshot.actual_margin_percent = econ::margin_percent(actual_profit, actual_revenue);
    snapshot.spending_forecast = spending;
    snapshot.station_hours = loads;
    snapshot.bottleneck_station = bottleneck.map(|b| b.station);

    validate_snapshot(&snapshot)?;
    info!(
        quantity,
        quality = params.quality_rating,
        defective = report.total_defective,
        revenue = %actual_revenue,
        profit = %actual_profit,
        "snapshot built"
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeded_rng;
    use crate::stations::{crew_from_factory, factory_plan};
    use rust_decimal::Decimal;
    use sim_core::{default_roster, enhancement_catalogue, SimulationSettings};

    fn table() -> PriceTable {
        SimulationSettings::default().price_table().unwrap()
    }

    #[test]
    fn preview_matches_warehouse_scenario() {
        let snap = preview(&SimulationParameters::default(), &table(), &SnapshotOptions::default()).unwrap();
        assert_eq!(snap.price_per_unit, Decimal::from(20));
        assert_eq!(snap.spending_forecast.total_spending, Decimal::from(293_220));
        assert_eq!(snap.potential_revenue, Decimal::from(90_000));
        assert_eq!(snap.potential_profit, Decimal::from(-203_220));
        assert_eq!(snap.time_to_produce_weeks, 10.0);
        assert!(snap.defective_units.is_none());
    }

    #[test]
    fn snapshot_without_crew_keeps_every_unit() {
        let params = SimulationParameters { quantity: 1000, quality_rating: 80, ..Default::default() };
        let snap = build_snapshot(&params, &table(), &[], &SnapshotOptions::default(), &mut seeded_rng(1)).unwrap();
        assert_eq!(snap.defective_units, Some(0));
        assert_eq!(snap.final_quantity, Some(1000));
        assert_eq!(snap.effective_quality, Some(80.0));
        // 80 + 10 * 2/3
        assert_eq!(snap.final_selling_price, Some(Decimal::new(8667, 2)));
        assert_eq!(snap.actual_revenue, Some(Decimal::new(8_667_000, 2)));
        assert!(snap.station_hours.is_empty());
        assert!(snap.bottleneck_station.is_none());
        assert_eq!(snap.time_to_produce_weeks, 8.0);
    }

    #[test]
    fn crew_and_add_ons_flow_into_spending_and_price() {
        let roster = default_roster();
        let plan = factory_plan(&roster, &["2".into(), "5".into()], false).unwrap();
        let crew = crew_from_factory(&plan, &roster).unwrap();
        let options = SnapshotOptions::default()
            .with_enhancement_ids(&["shoelace-protector".into()], &enhancement_catalogue())
            .unwrap();
        let params = SimulationParameters::default();
        let snap = build_snapshot(&params, &table(), &crew, &options, &mut seeded_rng(42)).unwrap();

        let s = &snap.spending_forecast;
        // Vu on assembly 4 min at $15, Ali on preparation 2 min at $24.
        assert_eq!(s.labour_cost, Decimal::from(4500 + 3600));
        assert_eq!(s.enhancement_cost, Decimal::new(112_500, 2));
        assert_eq!(s.total_spending, Decimal::from(293_220 + 8100) + Decimal::new(112_500, 2));
        assert_eq!(snap.selected_employee_ids, vec!["2".to_string(), "5".to_string()]);
        assert_eq!(snap.per_employee_quality.len(), 2);
        assert_eq!(
            snap.defective_units.unwrap() + snap.final_quantity.unwrap(),
            params.quantity
        );
        let effective = snap.effective_quality.unwrap();
        let base = econ::selling_price(effective).unwrap();
        assert_eq!(snap.final_selling_price, Some(econ::round_money(base * Decimal::new(102, 2))));
        assert_eq!(snap.station_hours.len(), 2);
        assert!(snap.bottleneck_station.is_some());
    }

    #[test]
    fn same_seed_reproduces_snapshot() {
        let roster = default_roster();
        let plan = factory_plan(&roster, &["1".into(), "3".into()], true).unwrap();
        let crew = crew_from_factory(&plan, &roster).unwrap();
        let params = SimulationParameters { quality_rating: 60, ..Default::default() };
        let opts = SnapshotOptions { simulation_id: Some(9), ..Default::default() };
        let a = build_snapshot(&params, &table(), &crew, &opts, &mut seeded_rng(5)).unwrap();
        let b = build_snapshot(&params, &table(), &crew, &opts, &mut seeded_rng(5)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.simulation_id, Some(9));
    }

    #[test]
    fn unknown_add_on_is_rejected() {
        let err = SnapshotOptions::default()
            .with_enhancement_ids(&["gold-plating".into()], &enhancement_catalogue())
            .unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownEnhancement(id) if id == "gold-plating"));
    }

    #[test]
    fn oversized_price_stop_is_an_error_not_a_panic() {
        let table = PriceTable::new(10.0, 60.0, vec![Decimal::MAX / Decimal::from(10)]).unwrap();
        let err = preview(&SimulationParameters::default(), &table, &SnapshotOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Econ(econ::EconError::Overflow("potential revenue"))
        ));
    }
}
