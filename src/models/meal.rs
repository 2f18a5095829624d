use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One eating occasion aggregating food log entries.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Meal {
  pub id: i64,
  pub eaten_at: DateTime<Utc>,
  pub kind: String,
  pub created_at: Option<DateTime<Utc>>,
}

pub const MEAL_KINDS: &[&str] = &["breakfast", "lunch", "dinner", "snack"];

/// One quantified food item within a meal. `exported_at` marks whether the
/// entry has been pushed to the health store; `sync_id` tags the records
/// written there so they can be deleted later.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FoodEntry {
  pub id: i64,
  pub meal_id: i64,
  pub food_slug: String,
  pub grams: f64,
  pub notes: Option<String>,
  pub sync_id: Option<String>,
  pub exported_at: Option<DateTime<Utc>>,
  pub created_at: Option<DateTime<Utc>>,
}

impl FoodEntry {
  pub fn is_exported(&self) -> bool {
    self.exported_at.is_some()
  }
}
