//! Live session surface: a single-row mirror of the active session used by
//! external presentation surfaces. At most one instance exists; starting a
//! new one replaces whatever was there.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// A surface older than this past its session start is considered stale and
/// no longer shown.
pub const STALENESS_HORIZON_HOURS: i64 = 8;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LiveActivity {
  pub session_id: i64,
  pub started_at: DateTime<Utc>,
  pub ended_at: Option<DateTime<Utc>>,
  pub stale_at: DateTime<Utc>,
}

impl LiveActivity {
  pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
    now >= self.stale_at
  }
}

/// Start the surface for a session, replacing any prior instance.
pub async fn start(
  pool: &SqlitePool,
  session_id: i64,
  started_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
  let stale_at = started_at + Duration::hours(STALENESS_HORIZON_HOURS);
  sqlx::query(
    r#"
    INSERT INTO live_activity (id, session_id, started_at, ended_at, stale_at, updated_at)
    VALUES (1, ?1, ?2, NULL, ?3, ?4)
    ON CONFLICT(id) DO UPDATE SET
      session_id = excluded.session_id,
      started_at = excluded.started_at,
      ended_at = NULL,
      stale_at = excluded.stale_at,
      updated_at = excluded.updated_at
    "#,
  )
  .bind(session_id)
  .bind(started_at)
  .bind(stale_at)
  .bind(Utc::now())
  .execute(pool)
  .await?;
  Ok(())
}

/// Stamp the end time on the active surface, if it belongs to this session.
pub async fn end(
  pool: &SqlitePool,
  session_id: i64,
  ended_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
  sqlx::query(
    "UPDATE live_activity SET ended_at = ?1, updated_at = ?2 WHERE id = 1 AND session_id = ?3",
  )
  .bind(ended_at)
  .bind(Utc::now())
  .bind(session_id)
  .execute(pool)
  .await?;
  Ok(())
}

/// The active surface, or `None` when absent or past its staleness horizon.
pub async fn current(
  pool: &SqlitePool,
  now: DateTime<Utc>,
) -> Result<Option<LiveActivity>, sqlx::Error> {
  let row = sqlx::query_as::<_, LiveActivity>(
    "SELECT session_id, started_at, ended_at, stale_at FROM live_activity WHERE id = 1",
  )
  .fetch_optional(pool)
  .await?;

  Ok(row.filter(|activity| !activity.is_stale(now)))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{setup_test_db, teardown_test_db};

  #[tokio::test]
  async fn test_start_replaces_prior_instance() {
    let pool = setup_test_db().await;
    let now = Utc::now();

    start(&pool, 1, now).await.unwrap();
    start(&pool, 2, now).await.unwrap();

    let active = current(&pool, now).await.unwrap().expect("should be active");
    assert_eq!(active.session_id, 2);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM live_activity")
      .fetch_one(&pool)
      .await
      .unwrap();
    assert_eq!(count, 1);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_end_stamps_only_matching_session() {
    let pool = setup_test_db().await;
    let now = Utc::now();

    start(&pool, 7, now).await.unwrap();
    end(&pool, 99, now).await.unwrap();
    assert!(current(&pool, now).await.unwrap().unwrap().ended_at.is_none());

    end(&pool, 7, now).await.unwrap();
    assert!(current(&pool, now).await.unwrap().unwrap().ended_at.is_some());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_stale_surface_is_hidden() {
    let pool = setup_test_db().await;
    let started = Utc::now() - Duration::hours(STALENESS_HORIZON_HOURS + 1);

    start(&pool, 3, started).await.unwrap();
    assert!(current(&pool, Utc::now()).await.unwrap().is_none());

    // Just before the horizon it is still visible.
    let peek_at = started + Duration::hours(STALENESS_HORIZON_HOURS) - Duration::minutes(1);
    assert!(current(&pool, peek_at).await.unwrap().is_some());

    teardown_test_db(pool).await;
  }
}
