#![deny(warnings)]

//! Core domain models and invariants for the MBA Master simulations.
//!
//! This crate defines the serializable types shared by the calculator, the
//! persistence layer and the HTTP API, with validation helpers that guard the
//! basic invariants. Wire-facing types use the camelCase field names and
//! kebab-case choice strings the web client sends.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Quality rating from which a product counts as premium.
pub const PREMIUM_QUALITY_THRESHOLD: u32 = 70;

/// Step used between quality breakpoints when a table has a single price stop.
pub const FALLBACK_QUALITY_STEP: f64 = 10.0;

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A price table needs at least one stop.
    #[error("price table has no stops")]
    EmptyPriceStops,
    /// Price stops must never decrease along the quality axis.
    #[error("price stop {0} is lower than the stop before it")]
    DecreasingPriceStops(usize),
    /// Quality range bounds are inverted or collapsed.
    #[error("invalid quality range [{min}, {max}]")]
    InvalidQualityRange { min: f64, max: f64 },
    /// Quantity range bounds are inverted.
    #[error("invalid quantity range [{min}, {max}]")]
    InvalidQuantityRange { min: u64, max: u64 },
    /// Numeric field must be finite.
    #[error("non-finite numeric value encountered")]
    NonFinite,
    /// Price or cost must be non-negative.
    #[error("negative monetary value is invalid")]
    NegativeMoney,
    /// Defect rates are percentages.
    #[error("defect rate {0} is outside [0, 100]")]
    DefectRateOutOfRange(f64),
    /// Station skill ratings are 1 to 5 stars.
    #[error("skill rating {rating} for {station} is outside 1..=5")]
    SkillRatingOutOfRange { station: Station, rating: u8 },
    /// Quality ratings live on a 0..=100 scale.
    #[error("quality rating {0} is outside 0..=100")]
    QualityOutOfRange(u32),
    /// Required text field is blank.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    /// Defective and sellable units must add back up to the ordered quantity.
    #[error("defective ({defective}) + final ({final_quantity}) != quantity ({quantity})")]
    DefectConservation {
        quantity: u64,
        defective: u64,
        final_quantity: u64,
    },
    /// Spending total must be the sum of its lines.
    #[error("total spending {total} does not match the sum of its lines {lines}")]
    SpendingMismatch { total: Decimal, lines: Decimal },
    /// Settings document could not be parsed.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// A factory station a worker can be assigned to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Station {
    Preparation,
    Assembly,
    Completion,
    Inspection,
}

impl Station {
    /// All stations in line order.
    pub const ALL: [Station; 4] = [
        Station::Preparation,
        Station::Assembly,
        Station::Completion,
        Station::Inspection,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Station::Preparation => "preparation",
            Station::Assembly => "assembly",
            Station::Completion => "completion",
            Station::Inspection => "inspection",
        }
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product tier derived from the quality rating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Basic,
    Premium,
}

impl QualityTier {
    pub fn from_rating(quality_rating: u32) -> Self {
        if quality_rating >= PREMIUM_QUALITY_THRESHOLD {
            QualityTier::Premium
        } else {
            QualityTier::Basic
        }
    }
}

/// Sourcing option picked on the warehouse step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdditionalOption {
    #[default]
    BuyingGroup,
    JustInTime,
    None,
}

/// Who delivers the finished product.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryMethod {
    #[default]
    InHouse,
    Outsource,
}

/// How the finished product is shipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FulfillmentMethod {
    #[default]
    Batches,
    SingleShipment,
}

/// User-chosen inputs of one simulation session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    /// Units to order.
    pub quantity: u64,
    /// Quality rating on the configured stepped scale.
    pub quality_rating: u32,
    pub additional_option: AdditionalOption,
    pub delivery_method: DeliveryMethod,
    pub fulfillment_method: FulfillmentMethod,
    /// Keep a safety buffer before final delivery.
    pub add_buffer: bool,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            quantity: 4500,
            quality_rating: 50,
            additional_option: AdditionalOption::default(),
            delivery_method: DeliveryMethod::default(),
            fulfillment_method: FulfillmentMethod::default(),
            add_buffer: false,
        }
    }
}

impl SimulationParameters {
    pub fn tier(&self) -> QualityTier {
        QualityTier::from_rating(self.quality_rating)
    }
}

/// Serialized shape of a [`PriceTable`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceTableRepr {
    pub min: f64,
    pub max: f64,
    pub stops: Vec<Decimal>,
}

/// Quality breakpoints mapped to price stops.
///
/// Breakpoints split `[min, max]` into `stops.len() - 1` equal steps, so
/// breakpoint `i` sits at `min + i * step`. A table can only be obtained
/// through [`PriceTable::new`], which guarantees at least one stop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PriceTableRepr", into = "PriceTableRepr")]
pub struct PriceTable {
    min: f64,
    max: f64,
    stops: Vec<Decimal>,
}

impl PriceTable {
    pub fn new(min: f64, max: f64, stops: Vec<Decimal>) -> Result<Self, ValidationError> {
        if stops.is_empty() {
            return Err(ValidationError::EmptyPriceStops);
        }
        if !(min.is_finite() && max.is_finite()) {
            return Err(ValidationError::NonFinite);
        }
        if min > max || (stops.len() > 1 && min == max) {
            return Err(ValidationError::InvalidQualityRange { min, max });
        }
        if stops.iter().any(|s| *s < Decimal::ZERO) {
            return Err(ValidationError::NegativeMoney);
        }
        if let Some(i) = stops.windows(2).position(|w| w[1] < w[0]) {
            return Err(ValidationError::DecreasingPriceStops(i + 1));
        }
        Ok(Self { min, max, stops })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn stops(&self) -> &[Decimal] {
        &self.stops
    }

    /// Distance between two neighbouring breakpoints.
    pub fn step(&self) -> f64 {
        if self.stops.len() > 1 {
            (self.max - self.min) / (self.stops.len() - 1) as f64
        } else {
            FALLBACK_QUALITY_STEP
        }
    }

    /// Quality value of breakpoint `index`.
    pub fn breakpoint(&self, index: usize) -> f64 {
        self.min + index as f64 * self.step()
    }
}

impl TryFrom<PriceTableRepr> for PriceTable {
    type Error = ValidationError;

    fn try_from(repr: PriceTableRepr) -> Result<Self, Self::Error> {
        PriceTable::new(repr.min, repr.max, repr.stops)
    }
}

impl From<PriceTable> for PriceTableRepr {
    fn from(table: PriceTable) -> Self {
        PriceTableRepr {
            min: table.min,
            max: table.max,
            stops: table.stops,
        }
    }
}

/// Ranges and price stops served by the config endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSettings {
    pub quantity_range: [u64; 2],
    pub quality_range: [u32; 2],
    pub price_stops: Vec<Decimal>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            quantity_range: [1000, 6000],
            quality_range: [10, 60],
            price_stops: [10i64, 11, 13, 16, 20, 25].into_iter().map(Decimal::from).collect(),
        }
    }
}

impl SimulationSettings {
    /// Parse and validate a YAML settings document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ValidationError> {
        let settings: SimulationSettings = serde_yaml::from_str(text)
            .map_err(|e| ValidationError::InvalidSettings(e.to_string()))?;
        validate_settings(&settings)?;
        Ok(settings)
    }

    /// Build the price table described by these settings.
    pub fn price_table(&self) -> Result<PriceTable, ValidationError> {
        PriceTable::new(
            f64::from(self.quality_range[0]),
            f64::from(self.quality_range[1]),
            self.price_stops.clone(),
        )
    }

    /// Clamp a quantity into the configured range.
    pub fn clamp_quantity(&self, quantity: u64) -> u64 {
        let [min, max] = self.quantity_range;
        quantity.max(min).min(max)
    }

    /// Clamp a quality rating into range and snap it to the nearest breakpoint.
    pub fn snap_quality(&self, quality_rating: u32) -> u32 {
        let [min, max] = self.quality_range;
        let clamped = quality_rating.max(min).min(max);
        let step = if self.price_stops.len() > 1 {
            f64::from(max.saturating_sub(min)) / (self.price_stops.len() - 1) as f64
        } else {
            FALLBACK_QUALITY_STEP
        };
        if step <= 0.0 {
            return clamped;
        }
        let idx = (f64::from(clamped - min) / step).round();
        let snapped = (f64::from(min) + idx * step).round();
        (snapped as u32).min(max)
    }
}

/// Validate settings, including that they describe a usable price table.
pub fn validate_settings(settings: &SimulationSettings) -> Result<(), ValidationError> {
    let [qmin, qmax] = settings.quantity_range;
    if qmin > qmax {
        return Err(ValidationError::InvalidQuantityRange { min: qmin, max: qmax });
    }
    settings.price_table()?;
    Ok(())
}

/// A factory worker as shown on the staffing screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerProfile {
    pub id: String,
    pub name: String,
    pub hourly_rate: Decimal,
    /// Percent chance that a unit this worker touches ends up defective.
    pub defect_rate: f64,
    /// Star rating (1-5) per station.
    pub skills: BTreeMap<Station, u8>,
}

impl WorkerProfile {
    /// Rating for a station, 1 star when unrated.
    pub fn skill(&self, station: Station) -> u8 {
        self.skills.get(&station).copied().unwrap_or(1)
    }
}

/// Validate a worker profile.
pub fn validate_worker(w: &WorkerProfile) -> Result<(), ValidationError> {
    if w.id.trim().is_empty() {
        return Err(ValidationError::EmptyField("worker id"));
    }
    if w.name.trim().is_empty() {
        return Err(ValidationError::EmptyField("worker name"));
    }
    if w.hourly_rate < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }
    if !w.defect_rate.is_finite() || !(0.0..=100.0).contains(&w.defect_rate) {
        return Err(ValidationError::DefectRateOutOfRange(w.defect_rate));
    }
    for (&station, &rating) in &w.skills {
        if !(1..=5).contains(&rating) {
            return Err(ValidationError::SkillRatingOutOfRange { station, rating });
        }
    }
    Ok(())
}

fn worker(id: &str, name: &str, hourly: i64, defect_rate: f64, stars: [u8; 4]) -> WorkerProfile {
    WorkerProfile {
        id: id.to_string(),
        name: name.to_string(),
        hourly_rate: Decimal::new(hourly, 0),
        defect_rate,
        skills: Station::ALL.into_iter().zip(stars).collect(),
    }
}

/// Reference staff available on the factory floor.
pub fn default_roster() -> Vec<WorkerProfile> {
    vec![
        worker("1", "Ashley", 17, 9.0, [2, 1, 5, 2]),
        worker("2", "Vu", 15, 10.0, [2, 5, 1, 2]),
        worker("3", "Lucy", 48, 2.0, [2, 4, 5, 2]),
        worker("4", "Mark", 50, 1.0, [2, 5, 4, 2]),
        worker("5", "Ali", 24, 3.5, [5, 2, 1, 1]),
        worker("6", "Navid", 20, 5.0, [4, 1, 4, 4]),
    ]
}

/// Optional product add-on offered in the showroom.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enhancement {
    pub id: String,
    pub name: String,
    pub cost_per_unit: Decimal,
    /// How much more buyers may pay, in percent.
    pub price_uplift_pct: u32,
}

fn enhancement(id: &str, name: &str, cost_cents: i64, uplift: u32) -> Enhancement {
    Enhancement {
        id: id.to_string(),
        name: name.to_string(),
        cost_per_unit: Decimal::new(cost_cents, 2),
        price_uplift_pct: uplift,
    }
}

/// Add-ons offered in the showroom.
pub fn enhancement_catalogue() -> Vec<Enhancement> {
    vec![
        enhancement("shoelace-protector", "Shoelace protector", 25, 2),
        enhancement("technology-improvement", "Technology improvement", 250, 5),
        enhancement("customized-flag", "Customized flag add-on", 50, 3),
        enhancement("performance-insole", "Upgraded performance insole", 150, 3),
    ]
}

/// Sampled defect count for one worker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectOutcome {
    pub worker_id: String,
    pub units_assigned: u64,
    pub defective_count: u64,
}

/// Spending lines of an order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingForecast {
    pub warehouse_cost: Decimal,
    pub factory_cost: Decimal,
    pub showroom_cost: Decimal,
    #[serde(default)]
    pub labour_cost: Decimal,
    #[serde(default)]
    pub enhancement_cost: Decimal,
    pub total_spending: Decimal,
}

impl SpendingForecast {
    pub fn from_components(warehouse: Decimal, factory: Decimal, showroom: Decimal) -> Self {
        let mut s = Self {
            warehouse_cost: warehouse,
            factory_cost: factory,
            showroom_cost: showroom,
            ..Self::default()
        };
        s.recompute_total();
        s
    }

    pub fn with_labour(mut self, labour: Decimal) -> Self {
        self.labour_cost = labour;
        self.recompute_total();
        self
    }

    pub fn with_enhancements(mut self, cost: Decimal) -> Self {
        self.enhancement_cost = cost;
        self.recompute_total();
        self
    }

    fn recompute_total(&mut self) {
        self.total_spending = self.warehouse_cost
            + self.factory_cost
            + self.showroom_cost
            + self.labour_cost
            + self.enhancement_cost;
    }
}

/// Result quality of one worker after sampling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeQuality {
    pub id: String,
    pub name: String,
    pub defective: u64,
    /// Percent of good units.
    pub quality: f64,
}

/// Hours a station needs for the whole order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationLoad {
    pub station: Station,
    pub staff: u32,
    pub hours: f64,
}

/// Persisted record of one completed simulation run.
///
/// The defect-dependent fields are optional: the warehouse step posts an
/// order before any worker has been sampled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation_id: Option<i64>,
    pub quantity: u64,
    pub quality_rating: u32,
    pub price_per_unit: Decimal,
    pub time_to_produce_weeks: f64,
    pub potential_revenue: Decimal,
    pub potential_profit: Decimal,
    pub spending_forecast: SpendingForecast,
    #[serde(default)]
    pub selected_employee_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defective_units: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_quantity: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_quality_across_workers: Option<f64>,
    #[serde(default)]
    pub per_employee_quality: Vec<EmployeeQuality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_quality: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_selling_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_revenue: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_profit: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_margin_percent: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_margin_percent: Option<Decimal>,
    #[serde(default)]
    pub station_hours: Vec<StationLoad>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottleneck_station: Option<Station>,
}

/// Validate a snapshot before it is stored.
pub fn validate_snapshot(s: &OutcomeSnapshot) -> Result<(), ValidationError> {
    if s.quality_rating > 100 {
        return Err(ValidationError::QualityOutOfRange(s.quality_rating));
    }
    if !s.time_to_produce_weeks.is_finite() {
        return Err(ValidationError::NonFinite);
    }
    let f = &s.spending_forecast;
    if s.price_per_unit < Decimal::ZERO
        || [
            f.warehouse_cost,
            f.factory_cost,
            f.showroom_cost,
            f.labour_cost,
            f.enhancement_cost,
            f.total_spending,
        ]
        .iter()
        .any(|c| *c < Decimal::ZERO)
    {
        return Err(ValidationError::NegativeMoney);
    }
    let lines = [
        f.warehouse_cost,
        f.factory_cost,
        f.showroom_cost,
        f.labour_cost,
        f.enhancement_cost,
    ]
    .iter()
    .try_fold(Decimal::ZERO, |acc, c| acc.checked_add(*c))
    .ok_or(ValidationError::NonFinite)?;
    // Web clients add the lines up in floating point; compare at cent precision.
    let cents = |d: Decimal| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if cents(lines) != cents(f.total_spending) {
        return Err(ValidationError::SpendingMismatch {
            total: f.total_spending,
            lines,
        });
    }
    if let Some(avg) = s.average_quality_across_workers {
        if !avg.is_finite() {
            return Err(ValidationError::NonFinite);
        }
    }
    if let (Some(defective), Some(final_quantity)) = (s.defective_units, s.final_quantity) {
        if defective.checked_add(final_quantity) != Some(s.quantity) {
            return Err(ValidationError::DefectConservation {
                quantity: s.quantity,
                defective,
                final_quantity,
            });
        }
    }
    Ok(())
}

/// Warehouse step section of a simulation document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseData {
    pub quantity: u64,
    pub quality_rating: u32,
    pub price_per_unit: Decimal,
    pub additional_option: AdditionalOption,
    pub delivery_method: DeliveryMethod,
    pub fulfillment_method: FulfillmentMethod,
    pub add_buffer: bool,
}

impl WarehouseData {
    pub fn new(params: &SimulationParameters, price_per_unit: Decimal) -> Self {
        Self {
            quantity: params.quantity,
            quality_rating: params.quality_rating,
            price_per_unit,
            additional_option: params.additional_option,
            delivery_method: params.delivery_method,
            fulfillment_method: params.fulfillment_method,
            add_buffer: params.add_buffer,
        }
    }

    pub fn parameters(&self) -> SimulationParameters {
        SimulationParameters {
            quantity: self.quantity,
            quality_rating: self.quality_rating,
            additional_option: self.additional_option,
            delivery_method: self.delivery_method,
            fulfillment_method: self.fulfillment_method,
            add_buffer: self.add_buffer,
        }
    }
}

/// How workers are spread over stations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductionMode {
    /// Each worker staffs a single station.
    #[default]
    One,
    /// Selected workers staff every station.
    All,
}

/// Factory step section of a simulation document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryData {
    #[serde(default)]
    pub production_mode: ProductionMode,
    /// Worker id to assigned station (`null` when unassigned).
    #[serde(default)]
    pub assignments: BTreeMap<String, Option<Station>>,
    #[serde(default)]
    pub all_stations_employee_ids: Vec<String>,
}

/// Showroom add-ons picked on the extras step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraAdditions {
    #[serde(default)]
    pub selected_add_on_ids: Vec<String>,
}

/// Partial update of a simulation document; absent sections are left alone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_data: Option<WarehouseData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory_data: Option<FactoryData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_additions: Option<ExtraAdditions>,
}

impl SimulationUpdate {
    pub fn is_empty(&self) -> bool {
        self.warehouse_data.is_none() && self.factory_data.is_none() && self.extra_additions.is_none()
    }

    /// Overlay the sections present in `other`.
    pub fn merge(&mut self, other: SimulationUpdate) {
        if other.warehouse_data.is_some() {
            self.warehouse_data = other.warehouse_data;
        }
        if other.factory_data.is_some() {
            self.factory_data = other.factory_data;
        }
        if other.extra_additions.is_some() {
            self.extra_additions = other.extra_additions;
        }
    }
}

/// One section of a simulation document.
#[derive(Clone, Debug, PartialEq)]
pub enum SimulationSection {
    Warehouse(WarehouseData),
    Factory(FactoryData),
    Extras(ExtraAdditions),
}

impl SimulationSection {
    pub fn name(&self) -> &'static str {
        match self {
            SimulationSection::Warehouse(_) => "warehouseData",
            SimulationSection::Factory(_) => "factoryData",
            SimulationSection::Extras(_) => "extraAdditions",
        }
    }
}

impl From<SimulationSection> for SimulationUpdate {
    fn from(section: SimulationSection) -> Self {
        let mut update = SimulationUpdate::default();
        match section {
            SimulationSection::Warehouse(w) => update.warehouse_data = Some(w),
            SimulationSection::Factory(f) => update.factory_data = Some(f),
            SimulationSection::Extras(e) => update.extra_additions = Some(e),
        }
        update
    }
}
