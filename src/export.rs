//! Health-store export for logged nutrition.
//!
//! The platform health store is modeled as an injected [`HealthStore`]
//! capability; the shipped implementation journals samples into the local
//! `health_samples` table. Export is best effort: a grouped meal record is
//! tried first, then one record per entry, and total failure only leaves the
//! entries unstamped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::FoodEntry;
use crate::nutrition::{self, entry_totals};
use crate::stats::MacroTotals;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum HealthError {
  #[error("Health store rejected the write: {0}")]
  Store(String),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
}

/// ---------------------------------------------------------------------------
/// Samples
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutrientKind {
  Protein,
  Carbohydrate,
  Fat,
  Energy,
}

impl NutrientKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      NutrientKind::Protein => "protein",
      NutrientKind::Carbohydrate => "carbohydrate",
      NutrientKind::Fat => "fat",
      NutrientKind::Energy => "energy",
    }
  }

  pub fn unit(&self) -> &'static str {
    match self {
      NutrientKind::Energy => "kcal",
      _ => "g",
    }
  }
}

/// One nutrient quantity tagged with the sync id of the entry or meal it
/// came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientSample {
  pub sync_id: String,
  pub kind: NutrientKind,
  pub amount: f64,
  pub logged_at: DateTime<Utc>,
}

fn samples_for(totals: &MacroTotals, sync_id: &str, logged_at: DateTime<Utc>) -> Vec<NutrientSample> {
  [
    (NutrientKind::Protein, totals.protein_g),
    (NutrientKind::Carbohydrate, totals.carbs_g),
    (NutrientKind::Fat, totals.fat_g),
    (NutrientKind::Energy, totals.kcal),
  ]
  .into_iter()
  .map(|(kind, amount)| NutrientSample {
    sync_id: sync_id.to_string(),
    kind,
    amount,
    logged_at,
  })
  .collect()
}

pub fn meal_sync_id(meal_id: i64) -> String {
  format!("trackgym-meal-{}", meal_id)
}

/// ---------------------------------------------------------------------------
/// Capability trait
/// ---------------------------------------------------------------------------

#[allow(async_fn_in_trait)]
pub trait HealthStore {
  /// Write samples as one grouped meal record.
  async fn save_group(&self, group_sync_id: &str, samples: &[NutrientSample]) -> Result<(), HealthError>;

  /// Write samples as individual records.
  async fn save_samples(&self, samples: &[NutrientSample]) -> Result<(), HealthError>;

  /// Delete every record tagged with the given sync id.
  async fn delete_by_sync_id(&self, sync_id: &str) -> Result<(), HealthError>;
}

/// ---------------------------------------------------------------------------
/// Local journal implementation
/// ---------------------------------------------------------------------------

pub struct SqliteHealthStore {
  pool: SqlitePool,
}

impl SqliteHealthStore {
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  async fn insert(&self, sample: &NutrientSample, group: Option<&str>) -> Result<(), HealthError> {
    sqlx::query(
      r#"
      INSERT INTO health_samples (sync_id, group_sync_id, nutrient, amount, unit, logged_at)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6)
      "#,
    )
    .bind(&sample.sync_id)
    .bind(group)
    .bind(sample.kind.as_str())
    .bind(sample.amount)
    .bind(sample.kind.unit())
    .bind(sample.logged_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }
}

impl HealthStore for SqliteHealthStore {
  async fn save_group(&self, group_sync_id: &str, samples: &[NutrientSample]) -> Result<(), HealthError> {
    for sample in samples {
      self.insert(sample, Some(group_sync_id)).await?;
    }
    Ok(())
  }

  async fn save_samples(&self, samples: &[NutrientSample]) -> Result<(), HealthError> {
    for sample in samples {
      self.insert(sample, None).await?;
    }
    Ok(())
  }

  async fn delete_by_sync_id(&self, sync_id: &str) -> Result<(), HealthError> {
    sqlx::query("DELETE FROM health_samples WHERE sync_id = ?1 OR group_sync_id = ?1")
      .bind(sync_id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }
}

/// ---------------------------------------------------------------------------
/// Export flow
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportOutcome {
  /// One grouped meal record.
  Grouped,
  /// Fallback path: individual records per entry.
  Individual,
  /// Meal had no entries; nothing written.
  Empty,
  /// Both strategies failed; entries left unstamped.
  Failed,
}

/// Push one meal's macros to the health store. Re-exporting first removes
/// the records from any earlier export.
pub async fn export_meal<S: HealthStore>(
  pool: &SqlitePool,
  store: &S,
  meal_id: i64,
) -> Result<ExportOutcome, sqlx::Error> {
  let meal = nutrition::get_meal(pool, meal_id).await?;
  let entries = nutrition::list_entries(pool, meal_id).await?;
  if entries.is_empty() {
    return Ok(ExportOutcome::Empty);
  }

  remove_prior_records(store, &meal_sync_id(meal_id), &entries).await;

  let totals = MacroTotals::sum(entries.iter().map(entry_totals));
  let grouped = samples_for(&totals, &meal_sync_id(meal_id), meal.eaten_at);

  let outcome = match store.save_group(&meal_sync_id(meal_id), &grouped).await {
    Ok(()) => ExportOutcome::Grouped,
    Err(e) => {
      warn!(error = %e, meal_id, "grouped export failed, writing individual records");
      match export_individually(store, &meal, &entries).await {
        Ok(()) => ExportOutcome::Individual,
        Err(e) => {
          warn!(error = %e, meal_id, "individual export failed as well");
          return Ok(ExportOutcome::Failed);
        }
      }
    }
  };

  stamp_exported(pool, &entries).await?;
  info!(meal_id, ?outcome, "meal exported to health store");
  Ok(outcome)
}

async fn export_individually<S: HealthStore>(
  store: &S,
  meal: &crate::models::Meal,
  entries: &[FoodEntry],
) -> Result<(), HealthError> {
  for entry in entries {
    let Some(sync_id) = entry.sync_id.as_deref() else {
      continue;
    };
    let samples = samples_for(&entry_totals(entry), sync_id, meal.eaten_at);
    store.save_samples(&samples).await?;
  }
  Ok(())
}

/// Best effort; a missing prior record is not an error.
async fn remove_prior_records<S: HealthStore>(store: &S, meal_sync: &str, entries: &[FoodEntry]) {
  if let Err(e) = store.delete_by_sync_id(meal_sync).await {
    warn!(error = %e, "failed to delete prior grouped record");
  }
  for entry in entries {
    if let Some(sync_id) = entry.sync_id.as_deref() {
      if let Err(e) = store.delete_by_sync_id(sync_id).await {
        warn!(error = %e, sync_id, "failed to delete prior entry record");
      }
    }
  }
}

async fn stamp_exported(pool: &SqlitePool, entries: &[FoodEntry]) -> Result<(), sqlx::Error> {
  let now = Utc::now();
  for entry in entries {
    sqlx::query("UPDATE food_entries SET exported_at = ?1 WHERE id = ?2")
      .bind(now)
      .bind(entry.id)
      .execute(pool)
      .await?;
  }
  Ok(())
}

/// Remove an exported entry's health records before the entry itself goes
/// away. Failures are logged and swallowed; local deletion must not block.
pub async fn forget_entry<S: HealthStore>(store: &S, entry: &FoodEntry) {
  if let Some(sync_id) = entry.sync_id.as_deref() {
    if let Err(e) = store.delete_by_sync_id(sync_id).await {
      warn!(error = %e, sync_id, "failed to delete health records for entry");
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
