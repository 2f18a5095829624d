use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One workout occasion. `started_at` is nil until the user actually begins
/// and `ended_at` is nil while the session is in progress.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
  pub id: i64,
  pub started_at: Option<DateTime<Utc>>,
  pub ended_at: Option<DateTime<Utc>>,
  pub summary: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
}

impl Session {
  pub fn duration_seconds(&self) -> Option<i64> {
    match (self.started_at, self.ended_at) {
      (Some(start), Some(end)) => Some((end - start).num_seconds().max(0)),
      _ => None,
    }
  }
}

/// One catalog exercise instance within a session, in display order.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SessionExercise {
  pub id: i64,
  pub session_id: i64,
  pub exercise_slug: String,
  pub position: i64,
  pub created_at: Option<DateTime<Utc>>,
}

/// One recorded effort within a performed exercise.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExerciseSet {
  pub id: i64,
  pub session_exercise_id: i64,
  pub reps: i64,
  pub weight_kg: f64,
  pub duration_seconds: Option<i64>,
  pub position: i64,
  pub created_at: Option<DateTime<Utc>>,
}
