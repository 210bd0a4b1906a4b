#![deny(warnings)]

//! Economic models: pricing and spending helpers for the production simulations.
//!
//! This module provides pure utilities for:
//! - Price lookup on a stepped quality table
//! - Fixed per-unit spending lines
//! - Tiered selling price with showroom add-on multipliers
//! - Revenue, profit, margin and production time estimates

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use sim_core::{Enhancement, PriceTable, SpendingForecast};
use thiserror::Error;

/// Quality zone at which the warehouse revenue preview is unscaled.
pub const QUALITY_ZONE_BASELINE: u32 = 50;

/// Lowest and highest effective quality the selling price tiers understand.
pub const SELLING_QUALITY_FLOOR: f64 = 10.0;
pub const SELLING_QUALITY_CEILING: f64 = 100.0;

/// Effective quality from which the premium tier applies.
pub const PREMIUM_TIER_START: f64 = 70.0;

/// Errors produced by economic helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Floating point input could not be turned into money.
    #[error("non-finite numeric conversion: {0}")]
    NonFinite(f64),
    /// Money arithmetic left the representable range.
    #[error("{0} overflowed")]
    Overflow(&'static str),
}

/// Unit price for a quality rating.
///
/// Quality is clamped into the table range and snapped to the nearest
/// breakpoint; the stop at that breakpoint is returned as is, without
/// interpolation.
///
/// Example:
/// let t = PriceTable::new(10.0, 60.0, stops)?; // [10, 11, 13, 16, 20, 25]
/// assert_eq!(price_for_quality(30.0, &t), Decimal::from(13));
pub fn price_for_quality(quality: f64, table: &PriceTable) -> Decimal {
    let stops = table.stops();
    let last = stops.len().saturating_sub(1);
    let clamped = if quality.is_finite() {
        quality.clamp(table.min(), table.max())
    } else {
        table.min()
    };
    let raw = ((clamped - table.min()) / table.step()).round();
    let index = if raw.is_finite() && raw > 0.0 {
        (raw as usize).min(last)
    } else {
        0
    };
    stops.get(index).copied().unwrap_or(Decimal::ZERO)
}

/// Fixed per-unit spending rates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostRates {
    pub warehouse_per_unit: Decimal,
    pub factory_per_unit: Decimal,
    pub showroom_per_unit: Decimal,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            warehouse_per_unit: Decimal::new(4373, 2),
            factory_per_unit: Decimal::new(2003, 2),
            showroom_per_unit: Decimal::new(140, 2),
        }
    }
}

impl CostRates {
    /// Sum of all per-unit rates.
    pub fn per_unit(&self) -> Decimal {
        self.warehouse_per_unit + self.factory_per_unit + self.showroom_per_unit
    }

    /// Spending lines for `quantity` units; labour and add-ons start at zero.
    pub fn breakdown(&self, quantity: u64) -> SpendingForecast {
        let q = Decimal::from(quantity);
        SpendingForecast::from_components(
            q * self.warehouse_per_unit,
            q * self.factory_per_unit,
            q * self.showroom_per_unit,
        )
    }
}

/// Spending lines for `quantity` units at the default rates.
///
/// Example:
/// let s = cost_breakdown(4500);
/// assert_eq!(s.total_spending, Decimal::from(293_220));
pub fn cost_breakdown(quantity: u64) -> SpendingForecast {
    CostRates::default().breakdown(quantity)
}

/// Basic tier: 25 at quality 10, rising 20 over the next 60 points.
pub fn basic_tier_price(quality: f64) -> f64 {
    25.0 + (quality - 10.0) * (20.0 / 60.0)
}

/// Premium tier: 80 at quality 70, rising 20 over the next 30 points.
pub fn premium_tier_price(quality: f64) -> f64 {
    80.0 + (quality - 70.0) * (20.0 / 30.0)
}

/// Base selling price for an effective quality.
///
/// The two tiers do not meet: just below 70 the basic tier gives ~45 while
/// the premium tier starts at 80. The jump is intentional until product
/// owners decide otherwise.
pub fn selling_price(effective_quality: f64) -> Result<Decimal, EconError> {
    if !effective_quality.is_finite() {
        return Err(EconError::NonFinite(effective_quality));
    }
    let q = effective_quality.clamp(SELLING_QUALITY_FLOOR, SELLING_QUALITY_CEILING);
    let price = if q < PREMIUM_TIER_START {
        basic_tier_price(q)
    } else {
        premium_tier_price(q)
    };
    to_money(price)
}

/// Quality scaled by how well the crew performed, or the rating itself
/// when no crew data exists.
pub fn effective_quality(quality_rating: u32, average_worker_quality: Option<f64>) -> f64 {
    let rating = f64::from(quality_rating);
    match average_worker_quality {
        Some(avg) if avg.is_finite() => rating * (avg / 100.0),
        _ => rating,
    }
}

/// Price multiplier from showroom add-ons: `1 + sum(uplift) / 100`.
pub fn price_multiplier(enhancements: &[Enhancement]) -> Decimal {
    let uplift: u32 = enhancements.iter().map(|e| e.price_uplift_pct).sum();
    Decimal::ONE + Decimal::from(uplift) / Decimal::ONE_HUNDRED
}

/// Cost of fitting every unit with the chosen add-ons.
pub fn enhancement_cost(quantity: u64, enhancements: &[Enhancement]) -> Result<Decimal, EconError> {
    enhancements
        .iter()
        .try_fold(Decimal::ZERO, |acc, e| acc.checked_add(e.cost_per_unit))
        .and_then(|per_unit| per_unit.checked_mul(Decimal::from(quantity)))
        .ok_or(EconError::Overflow("enhancement cost"))
}

/// Pre-defect revenue estimate shown on the warehouse step.
pub fn potential_revenue(
    quantity: u64,
    price_per_unit: Decimal,
    quality_zone: u32,
) -> Result<Decimal, EconError> {
    Decimal::from(quantity)
        .checked_mul(price_per_unit)
        .and_then(|r| r.checked_mul(Decimal::from(quality_zone)))
        .and_then(|r| r.checked_div(Decimal::from(QUALITY_ZONE_BASELINE)))
        .ok_or(EconError::Overflow("potential revenue"))
}

/// Post-defect revenue from the units that can actually be sold.
pub fn actual_revenue(final_quantity: u64, final_selling_price: Decimal) -> Result<Decimal, EconError> {
    Decimal::from(final_quantity)
        .checked_mul(final_selling_price)
        .ok_or(EconError::Overflow("actual revenue"))
}

pub fn profit(revenue: Decimal, spending: &SpendingForecast) -> Decimal {
    revenue - spending.total_spending
}

/// Profit as a percentage of revenue, rounded to 2 dp. None without revenue.
pub fn margin_percent(profit: Decimal, revenue: Decimal) -> Option<Decimal> {
    if revenue.is_zero() {
        return None;
    }
    profit
        .checked_div(revenue)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .map(round_money)
}

/// Production time estimate: 8 weeks at quality 80, one week per 10 points,
/// bounded to [6, 10].
pub fn time_to_produce_weeks(quality_rating: u32) -> f64 {
    (8.0 - (f64::from(quality_rating) - 80.0) / 10.0).clamp(6.0, 10.0)
}

/// Round to cents, halves away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a float amount to money rounded to cents.
pub fn to_money(amount: f64) -> Result<Decimal, EconError> {
    Decimal::from_f64(amount)
        .map(round_money)
        .ok_or(EconError::NonFinite(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sim_core::{enhancement_catalogue, SimulationSettings};

    fn default_table() -> PriceTable {
        SimulationSettings::default().price_table().unwrap()
    }

    #[test]
    fn breakpoint_quality_returns_its_stop() {
        let t = default_table();
        assert_eq!(price_for_quality(30.0, &t), Decimal::from(13));
        assert_eq!(price_for_quality(10.0, &t), Decimal::from(10));
        assert_eq!(price_for_quality(60.0, &t), Decimal::from(25));
    }

    #[test]
    fn off_table_quality_clamps_and_snaps() {
        let t = default_table();
        assert_eq!(price_for_quality(-5.0, &t), Decimal::from(10));
        assert_eq!(price_for_quality(500.0, &t), Decimal::from(25));
        assert_eq!(price_for_quality(44.0, &t), Decimal::from(16));
        assert_eq!(price_for_quality(46.0, &t), Decimal::from(20));
        assert_eq!(price_for_quality(f64::NAN, &t), Decimal::from(10));
    }

    #[test]
    fn single_stop_table_always_returns_it() {
        let t = PriceTable::new(10.0, 10.0, vec![Decimal::from(7)]).unwrap();
        assert_eq!(price_for_quality(90.0, &t), Decimal::from(7));
    }

    #[test]
    fn warehouse_scenario_4500_units_quality_50() {
        let t = default_table();
        assert_eq!(price_for_quality(50.0, &t), Decimal::from(20));
        let s = cost_breakdown(4500);
        assert_eq!(s.warehouse_cost, Decimal::from(196_785));
        assert_eq!(s.factory_cost, Decimal::from(90_135));
        assert_eq!(s.showroom_cost, Decimal::from(6_300));
        assert_eq!(s.total_spending, Decimal::from(293_220));
        assert_eq!(s.labour_cost, Decimal::ZERO);
        let revenue = potential_revenue(4500, Decimal::from(20), QUALITY_ZONE_BASELINE).unwrap();
        assert_eq!(revenue, Decimal::from(90_000));
        assert_eq!(profit(revenue, &s), Decimal::from(-203_220));
    }

    #[test]
    fn selling_price_tiers_do_not_meet_at_seventy() {
        assert!((basic_tier_price(70.0) - 45.0).abs() < 1e-9);
        assert!((premium_tier_price(70.0) - 80.0).abs() < 1e-9);
        assert_eq!(selling_price(70.0).unwrap(), Decimal::from(80));
        assert_eq!(selling_price(69.99).unwrap(), Decimal::new(4500, 2));
        assert_eq!(selling_price(10.0).unwrap(), Decimal::from(25));
        assert_eq!(selling_price(100.0).unwrap(), Decimal::from(100));
        assert_eq!(selling_price(3.0).unwrap(), Decimal::from(25));
        assert!(selling_price(f64::INFINITY).is_err());
    }

    #[test]
    fn effective_quality_scales_by_crew_average() {
        assert_eq!(effective_quality(80, None), 80.0);
        assert!((effective_quality(80, Some(90.0)) - 72.0).abs() < 1e-9);
        assert_eq!(effective_quality(80, Some(f64::NAN)), 80.0);
    }

    #[test]
    fn add_ons_raise_price_and_cost() {
        let catalogue = enhancement_catalogue();
        let picked = &catalogue[..2]; // 2% + 5%
        assert_eq!(price_multiplier(picked), Decimal::new(107, 2));
        assert_eq!(price_multiplier(&[]), Decimal::ONE);
        assert_eq!(enhancement_cost(100, picked).unwrap(), Decimal::from(275));
    }

    #[test]
    fn huge_prices_overflow_into_errors() {
        let huge = Decimal::MAX / Decimal::from(10);
        assert_eq!(
            potential_revenue(u64::MAX, huge, QUALITY_ZONE_BASELINE),
            Err(EconError::Overflow("potential revenue"))
        );
        assert_eq!(actual_revenue(u64::MAX, huge), Err(EconError::Overflow("actual revenue")));
        let pricey = Enhancement {
            id: "gold".into(),
            name: "Gold".into(),
            cost_per_unit: huge,
            price_uplift_pct: 1,
        };
        assert_eq!(
            enhancement_cost(1000, &[pricey]),
            Err(EconError::Overflow("enhancement cost"))
        );
        assert_eq!(actual_revenue(0, huge), Ok(Decimal::ZERO));
    }

    #[test]
    fn margin_handles_zero_revenue() {
        assert_eq!(margin_percent(Decimal::from(10), Decimal::ZERO), None);
        assert_eq!(
            margin_percent(Decimal::from(25), Decimal::from(100)),
            Some(Decimal::from(25))
        );
    }

    #[test]
    fn production_time_is_bounded() {
        assert_eq!(time_to_produce_weeks(50), 10.0);
        assert_eq!(time_to_produce_weeks(80), 8.0);
        assert_eq!(time_to_produce_weeks(90), 7.0);
        assert_eq!(time_to_produce_weeks(100), 6.0);
    }

    #[test]
    fn money_rounds_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2));
        assert_eq!(round_money(Decimal::new(-12345, 3)), Decimal::new(-1235, 2));
        assert_eq!(to_money(0.125).unwrap(), Decimal::new(13, 2));
    }

    proptest! {
        #[test]
        fn total_spending_is_linear_in_quantity(q in 0u64..10_000_000) {
            let s = cost_breakdown(q);
            prop_assert_eq!(s.total_spending, Decimal::from(q) * CostRates::default().per_unit());
            prop_assert_eq!(CostRates::default().per_unit(), Decimal::new(6516, 2));
        }

        #[test]
        fn pricing_is_pure(q in -50.0f64..150.0) {
            let t = default_table();
            prop_assert_eq!(price_for_quality(q, &t), price_for_quality(q, &t));
            prop_assert_eq!(cost_breakdown(1234), cost_breakdown(1234));
        }

        #[test]
        fn price_is_always_a_configured_stop(q in -50.0f64..150.0) {
            let t = default_table();
            let p = price_for_quality(q, &t);
            prop_assert!(t.stops().contains(&p));
        }

        #[test]
        fn selling_price_is_monotonic_within_tiers(a in 10.0f64..69.0, b in 70.0f64..100.0) {
            let pa = selling_price(a).unwrap();
            let pa2 = selling_price(a + 0.5).unwrap();
            let pb = selling_price(b).unwrap();
            prop_assert!(pa2 >= pa);
            prop_assert!(pb >= Decimal::from(80));
        }
    }
}
