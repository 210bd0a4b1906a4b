#![deny(warnings)]

//! Persistence layer: SQLite schema and records for settings, simulations
//! and submitted orders.
//!
//! Records serialize with the document shape the web client expects: the
//! row id as `_id` and `createdAt` / `updatedAt` timestamps.

use anyhow::{anyhow, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sim_core::{
    validate_settings, validate_snapshot, OutcomeSnapshot, SimulationSettings, SimulationUpdate,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Returns the default SQLite URL used for local saves.
pub fn default_sqlite_url() -> &'static str {
    "sqlite://./saves/main.db"
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Make sure the directory of a file-backed SQLite URL exists.
pub fn prepare_sqlite_path(url: &str) -> Result<()> {
    if is_memory_url(url) {
        return Ok(());
    }
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .map(|p| p.split('?').next().unwrap_or(p));
    if let Some(path) = path {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}

/// Open a pool and run migrations.
///
/// In-memory databases live as long as their connection, so they get a
/// single connection that is never recycled.
pub async fn init_db(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = if is_memory_url(url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?
    };
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!(url, "database ready");
    Ok(pool)
}

/// Convert money to integer cents, rounding half away from zero.
pub fn decimal_to_cents_i64(amount: Decimal) -> Result<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|c| c.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|c| c.to_i64())
        .ok_or_else(|| anyhow!("amount {amount} does not fit in i64 cents"))
}

pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(text)?.with_timezone(&Utc))
}

fn to_json<T: Serialize>(value: &Option<T>) -> Result<Option<String>> {
    Ok(value.as_ref().map(serde_json::to_string).transpose()?)
}

fn from_json<T: DeserializeOwned>(text: Option<String>) -> Result<Option<T>> {
    Ok(text.as_deref().map(|t| serde_json::from_str(t)).transpose()?)
}

/// Stored settings document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(flatten)]
    pub settings: SimulationSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored simulation document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRecord {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(flatten)]
    pub data: SimulationUpdate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored order document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(flatten)]
    pub snapshot: OutcomeSnapshot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct SettingsRow {
    id: i64,
    quantity_min: i64,
    quantity_max: i64,
    quality_min: i64,
    quality_max: i64,
    price_stops_cents: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<SettingsRow> for SettingsRecord {
    type Error = anyhow::Error;

    fn try_from(row: SettingsRow) -> Result<Self> {
        let cents: Vec<i64> = serde_json::from_str(&row.price_stops_cents)?;
        Ok(Self {
            id: row.id,
            settings: SimulationSettings {
                quantity_range: [u64::try_from(row.quantity_min)?, u64::try_from(row.quantity_max)?],
                quality_range: [u32::try_from(row.quality_min)?, u32::try_from(row.quality_max)?],
                price_stops: cents.into_iter().map(cents_to_decimal).collect(),
            },
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[derive(FromRow)]
struct SimulationRow {
    id: i64,
    warehouse_data: Option<String>,
    factory_data: Option<String>,
    extra_additions: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<SimulationRow> for SimulationRecord {
    type Error = anyhow::Error;

    fn try_from(row: SimulationRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            data: SimulationUpdate {
                warehouse_data: from_json(row.warehouse_data)?,
                factory_data: from_json(row.factory_data)?,
                extra_additions: from_json(row.extra_additions)?,
            },
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[derive(FromRow)]
struct OrderRow {
    id: i64,
    snapshot: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<OrderRow> for OrderRecord {
    type Error = anyhow::Error;

    fn try_from(row: OrderRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            snapshot: serde_json::from_str(&row.snapshot)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

const SETTINGS_COLUMNS: &str = "SELECT id, quantity_min, quantity_max, quality_min, quality_max, \
     price_stops_cents, created_at, updated_at FROM settings";

/// The first settings document stored, if any.
pub async fn get_settings(pool: &SqlitePool) -> Result<Option<SettingsRecord>> {
    let row = sqlx::query_as::<_, SettingsRow>(&format!("{SETTINGS_COLUMNS} ORDER BY id ASC LIMIT 1"))
        .fetch_optional(pool)
        .await?;
    row.map(SettingsRecord::try_from).transpose()
}

async fn get_settings_by_id(pool: &SqlitePool, id: i64) -> Result<Option<SettingsRecord>> {
    let row = sqlx::query_as::<_, SettingsRow>(&format!("{SETTINGS_COLUMNS} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(SettingsRecord::try_from).transpose()
}

/// Validate and store a new settings document.
pub async fn save_settings(pool: &SqlitePool, settings: &SimulationSettings) -> Result<SettingsRecord> {
    validate_settings(settings)?;
    let cents = settings
        .price_stops
        .iter()
        .map(|s| decimal_to_cents_i64(*s))
        .collect::<Result<Vec<_>>>()?;
    let now = now_rfc3339();
    let id = sqlx::query(
        "INSERT INTO settings (quantity_min, quantity_max, quality_min, quality_max, \
         price_stops_cents, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(i64::try_from(settings.quantity_range[0])?)
    .bind(i64::try_from(settings.quantity_range[1])?)
    .bind(i64::from(settings.quality_range[0]))
    .bind(i64::from(settings.quality_range[1]))
    .bind(serde_json::to_string(&cents)?)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?
    .last_insert_rowid();
    info!(id, "settings saved");
    get_settings_by_id(pool, id)
        .await?
        .ok_or_else(|| anyhow!("settings {id} missing after insert"))
}

/// Store `settings` only when no settings exist yet. Returns whether a row was written.
pub async fn seed_settings(pool: &SqlitePool, settings: &SimulationSettings) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM settings")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        debug!(count, "settings already present");
        return Ok(false);
    }
    save_settings(pool, settings).await?;
    Ok(true)
}

pub async fn seed_default_settings(pool: &SqlitePool) -> Result<bool> {
    seed_settings(pool, &SimulationSettings::default()).await
}

// ---------------------------------------------------------------------------
// Simulations
// ---------------------------------------------------------------------------

pub async fn get_simulation(pool: &SqlitePool, id: i64) -> Result<Option<SimulationRecord>> {
    let row = sqlx::query_as::<_, SimulationRow>(
        "SELECT id, warehouse_data, factory_data, extra_additions, created_at, updated_at \
         FROM simulations WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(SimulationRecord::try_from).transpose()
}

pub async fn create_simulation(pool: &SqlitePool, data: &SimulationUpdate) -> Result<SimulationRecord> {
    let now = now_rfc3339();
    let id = sqlx::query(
        "INSERT INTO simulations (warehouse_data, factory_data, extra_additions, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(to_json(&data.warehouse_data)?)
    .bind(to_json(&data.factory_data)?)
    .bind(to_json(&data.extra_additions)?)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?
    .last_insert_rowid();
    info!(id, "simulation created");
    get_simulation(pool, id)
        .await?
        .ok_or_else(|| anyhow!("simulation {id} missing after insert"))
}

/// Replace the sections present in `update`. `None` when `id` is unknown.
///
/// Absent sections are bound as NULL and kept by `COALESCE`, so concurrent
/// updates of different sections never overwrite each other.
pub async fn update_simulation(
    pool: &SqlitePool,
    id: i64,
    update: &SimulationUpdate,
) -> Result<Option<SimulationRecord>> {
    let affected = sqlx::query(
        "UPDATE simulations SET \
         warehouse_data = COALESCE(?, warehouse_data), \
         factory_data = COALESCE(?, factory_data), \
         extra_additions = COALESCE(?, extra_additions), \
         updated_at = ? WHERE id = ?",
    )
    .bind(to_json(&update.warehouse_data)?)
    .bind(to_json(&update.factory_data)?)
    .bind(to_json(&update.extra_additions)?)
    .bind(now_rfc3339())
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();
    if affected == 0 {
        return Ok(None);
    }
    debug!(id, "simulation updated");
    get_simulation(pool, id).await
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

pub async fn get_order(pool: &SqlitePool, id: i64) -> Result<Option<OrderRecord>> {
    let row = sqlx::query_as::<_, OrderRow>(
        "SELECT id, snapshot, created_at, updated_at FROM orders WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(OrderRecord::try_from).transpose()
}

/// Validate and store an order snapshot.
pub async fn create_order(pool: &SqlitePool, snapshot: &OutcomeSnapshot) -> Result<OrderRecord> {
    validate_snapshot(snapshot)?;
    let actual_revenue_cents = snapshot.actual_revenue.map(decimal_to_cents_i64).transpose()?;
    let defective = snapshot.defective_units.map(i64::try_from).transpose()?;
    let final_quantity = snapshot.final_quantity.map(i64::try_from).transpose()?;
    let now = now_rfc3339();
    let id = sqlx::query(
        "INSERT INTO orders (simulation_id, quantity, quality_rating, price_per_unit_cents, \
         total_spending_cents, potential_revenue_cents, actual_revenue_cents, defective_units, \
         final_quantity, snapshot, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(snapshot.simulation_id)
    .bind(i64::try_from(snapshot.quantity)?)
    .bind(i64::from(snapshot.quality_rating))
    .bind(decimal_to_cents_i64(snapshot.price_per_unit)?)
    .bind(decimal_to_cents_i64(snapshot.spending_forecast.total_spending)?)
    .bind(decimal_to_cents_i64(snapshot.potential_revenue)?)
    .bind(actual_revenue_cents)
    .bind(defective)
    .bind(final_quantity)
    .bind(serde_json::to_string(snapshot)?)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?
    .last_insert_rowid();
    info!(id, quantity = snapshot.quantity, "order created");
    get_order(pool, id)
        .await?
        .ok_or_else(|| anyhow!("order {id} missing after insert"))
}
