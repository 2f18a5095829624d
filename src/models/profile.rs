use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Single-row anthropometric and goal data. The goal is free text; the
/// suggestion engine classifies it by keyword.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
  pub id: i64,
  pub age: Option<i64>,
  pub weight_kg: Option<f64>,
  pub height_cm: Option<f64>,
  pub chest_cm: Option<f64>,
  pub waist_cm: Option<f64>,
  pub hip_cm: Option<f64>,
  pub activity_level: String,
  pub goal: String,
  pub dietary_restrictions: Option<String>,
  pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Profile {
  fn default() -> Self {
    Self {
      id: 1,
      age: None,
      weight_kg: None,
      height_cm: None,
      chest_cm: None,
      waist_cm: None,
      hip_cm: None,
      activity_level: "moderate".to_string(),
      goal: "hypertrophy".to_string(),
      dietary_restrictions: None,
      updated_at: None,
    }
  }
}
