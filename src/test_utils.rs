//! Test utilities: in-memory database setup and seed helpers.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use crate::workouts;

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  sqlx::query("PRAGMA foreign_keys = ON")
    .execute(&pool)
    .await
    .expect("Failed to enable foreign keys");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Seed one finished session (started an hour ago, ended now).
pub async fn seed_test_session(pool: &SqlitePool) -> i64 {
  let result = sqlx::query("INSERT INTO sessions (started_at, ended_at) VALUES (?1, ?2)")
    .bind(Utc::now() - Duration::hours(1))
    .bind(Utc::now())
    .execute(pool)
    .await
    .expect("Failed to insert test session");

  result.last_insert_rowid()
}

/// Add an exercise to a session with the given (reps, weight) sets.
/// Returns the session_exercise id.
pub async fn seed_test_sets(
  pool: &SqlitePool,
  session_id: i64,
  exercise_slug: &str,
  sets: &[(i64, f64)],
) -> i64 {
  let exercise = workouts::add_exercise(pool, session_id, exercise_slug)
    .await
    .expect("Failed to insert test exercise");

  for &(reps, weight_kg) in sets {
    workouts::add_set(pool, exercise.id, reps, weight_kg, None)
      .await
      .expect("Failed to insert test set");
  }

  exercise.id
}
