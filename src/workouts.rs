//! Workout session storage: sessions, performed exercises and sets.
//!
//! Position values within a parent are kept contiguous from 0; every
//! reorder or delete re-packs them.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::models::{ExerciseSet, Session, SessionExercise};

/// ---------------------------------------------------------------------------
/// Sessions
/// ---------------------------------------------------------------------------

/// Create a session and mark it started now.
pub async fn start_session(pool: &SqlitePool) -> Result<Session, sqlx::Error> {
  let result = sqlx::query("INSERT INTO sessions (started_at) VALUES (?1)")
    .bind(Utc::now())
    .execute(pool)
    .await?;

  get_session(pool, result.last_insert_rowid()).await
}

/// Stamp the end time. Finishing an already-finished session keeps the
/// original end time.
pub async fn finish_session(pool: &SqlitePool, session_id: i64) -> Result<Session, sqlx::Error> {
  sqlx::query("UPDATE sessions SET ended_at = COALESCE(ended_at, ?1) WHERE id = ?2")
    .bind(Utc::now())
    .bind(session_id)
    .execute(pool)
    .await?;

  get_session(pool, session_id).await
}

pub async fn get_session(pool: &SqlitePool, session_id: i64) -> Result<Session, sqlx::Error> {
  sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = ?1")
    .bind(session_id)
    .fetch_one(pool)
    .await
}

pub async fn list_sessions(pool: &SqlitePool, limit: i64) -> Result<Vec<Session>, sqlx::Error> {
  sqlx::query_as::<_, Session>(
    "SELECT * FROM sessions ORDER BY COALESCE(started_at, created_at) DESC LIMIT ?1",
  )
  .bind(limit)
  .fetch_all(pool)
  .await
}

/// Delete a session; exercises and sets cascade.
pub async fn delete_session(pool: &SqlitePool, session_id: i64) -> Result<(), sqlx::Error> {
  sqlx::query("DELETE FROM sessions WHERE id = ?1")
    .bind(session_id)
    .execute(pool)
    .await?;
  Ok(())
}

pub async fn save_summary(
  pool: &SqlitePool,
  session_id: i64,
  summary: &str,
) -> Result<(), sqlx::Error> {
  sqlx::query("UPDATE sessions SET summary = ?1 WHERE id = ?2")
    .bind(summary)
    .bind(session_id)
    .execute(pool)
    .await?;
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Performed exercises
/// ---------------------------------------------------------------------------

/// Append an exercise at the end of the session's display order.
pub async fn add_exercise(
  pool: &SqlitePool,
  session_id: i64,
  exercise_slug: &str,
) -> Result<SessionExercise, sqlx::Error> {
  let (next_position,): (i64,) = sqlx::query_as(
    "SELECT COUNT(*) FROM session_exercises WHERE session_id = ?1",
  )
  .bind(session_id)
  .fetch_one(pool)
  .await?;

  let result = sqlx::query(
    "INSERT INTO session_exercises (session_id, exercise_slug, position) VALUES (?1, ?2, ?3)",
  )
  .bind(session_id)
  .bind(exercise_slug)
  .bind(next_position)
  .execute(pool)
  .await?;

  sqlx::query_as::<_, SessionExercise>("SELECT * FROM session_exercises WHERE id = ?1")
    .bind(result.last_insert_rowid())
    .fetch_one(pool)
    .await
}

pub async fn list_exercises(
  pool: &SqlitePool,
  session_id: i64,
) -> Result<Vec<SessionExercise>, sqlx::Error> {
  sqlx::query_as::<_, SessionExercise>(
    "SELECT * FROM session_exercises WHERE session_id = ?1 ORDER BY position",
  )
  .bind(session_id)
  .fetch_all(pool)
  .await
}

/// Move an exercise to a new position and re-pack the order.
pub async fn move_exercise(
  pool: &SqlitePool,
  session_id: i64,
  exercise_id: i64,
  new_position: i64,
) -> Result<(), sqlx::Error> {
  let mut exercises = list_exercises(pool, session_id).await?;

  let Some(from) = exercises.iter().position(|e| e.id == exercise_id) else {
    return Err(sqlx::Error::RowNotFound);
  };
  let moved = exercises.remove(from);
  let to = (new_position.max(0) as usize).min(exercises.len());
  exercises.insert(to, moved);

  repack_exercises(pool, &exercises).await
}

/// Delete an exercise (sets cascade) and re-pack the remaining order.
pub async fn delete_exercise(
  pool: &SqlitePool,
  session_id: i64,
  exercise_id: i64,
) -> Result<(), sqlx::Error> {
  sqlx::query("DELETE FROM session_exercises WHERE id = ?1 AND session_id = ?2")
    .bind(exercise_id)
    .bind(session_id)
    .execute(pool)
    .await?;

  let remaining = list_exercises(pool, session_id).await?;
  repack_exercises(pool, &remaining).await
}

async fn repack_exercises(
  pool: &SqlitePool,
  ordered: &[SessionExercise],
) -> Result<(), sqlx::Error> {
  for (position, exercise) in ordered.iter().enumerate() {
    sqlx::query("UPDATE session_exercises SET position = ?1 WHERE id = ?2")
      .bind(position as i64)
      .bind(exercise.id)
      .execute(pool)
      .await?;
  }
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Sets
/// ---------------------------------------------------------------------------

pub async fn add_set(
  pool: &SqlitePool,
  session_exercise_id: i64,
  reps: i64,
  weight_kg: f64,
  duration_seconds: Option<i64>,
) -> Result<ExerciseSet, sqlx::Error> {
  let (next_position,): (i64,) = sqlx::query_as(
    "SELECT COUNT(*) FROM exercise_sets WHERE session_exercise_id = ?1",
  )
  .bind(session_exercise_id)
  .fetch_one(pool)
  .await?;

  let result = sqlx::query(
    r#"
    INSERT INTO exercise_sets (session_exercise_id, reps, weight_kg, duration_seconds, position, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
  )
  .bind(session_exercise_id)
  .bind(reps)
  .bind(weight_kg)
  .bind(duration_seconds)
  .bind(next_position)
  .bind(Utc::now())
  .execute(pool)
  .await?;

  sqlx::query_as::<_, ExerciseSet>("SELECT * FROM exercise_sets WHERE id = ?1")
    .bind(result.last_insert_rowid())
    .fetch_one(pool)
    .await
}

pub async fn list_sets(
  pool: &SqlitePool,
  session_exercise_id: i64,
) -> Result<Vec<ExerciseSet>, sqlx::Error> {
  sqlx::query_as::<_, ExerciseSet>(
    "SELECT * FROM exercise_sets WHERE session_exercise_id = ?1 ORDER BY position",
  )
  .bind(session_exercise_id)
  .fetch_all(pool)
  .await
}

pub async fn delete_set(pool: &SqlitePool, set_id: i64) -> Result<(), sqlx::Error> {
  let row: Option<(i64,)> =
    sqlx::query_as("SELECT session_exercise_id FROM exercise_sets WHERE id = ?1")
      .bind(set_id)
      .fetch_optional(pool)
      .await?;

  sqlx::query("DELETE FROM exercise_sets WHERE id = ?1")
    .bind(set_id)
    .execute(pool)
    .await?;

  if let Some((parent,)) = row {
    let remaining = list_sets(pool, parent).await?;
    for (position, set) in remaining.iter().enumerate() {
      sqlx::query("UPDATE exercise_sets SET position = ?1 WHERE id = ?2")
        .bind(position as i64)
        .bind(set.id)
        .execute(pool)
        .await?;
    }
  }
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Session detail
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SessionDetail {
  pub session: Session,
  pub exercises: Vec<ExerciseDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExerciseDetail {
  pub exercise: SessionExercise,
  pub sets: Vec<ExerciseSet>,
}

pub async fn session_detail(pool: &SqlitePool, session_id: i64) -> Result<SessionDetail, sqlx::Error> {
  let session = get_session(pool, session_id).await?;
  let mut exercises = Vec::new();

  for exercise in list_exercises(pool, session_id).await? {
    let sets = list_sets(pool, exercise.id).await?;
    exercises.push(ExerciseDetail { exercise, sets });
  }

  Ok(SessionDetail { session, exercises })
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
