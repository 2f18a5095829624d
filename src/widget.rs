//! Widget snapshot: a small JSON file in the shared data directory holding
//! today's macro totals and the historical daily average. Readers fall back
//! to sample values when the file is absent or unreadable; a refresh rewrites
//! it from the database.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::nutrition;
use crate::stats::{self, MacroTotals};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WidgetSnapshot {
  pub today: MacroTotals,
  pub daily_average: MacroTotals,
  pub refreshed_at: DateTime<Utc>,
}

/// Shown when no snapshot has ever been written.
pub fn sample_snapshot() -> WidgetSnapshot {
  WidgetSnapshot {
    today: MacroTotals {
      protein_g: 92.0,
      carbs_g: 180.0,
      fat_g: 54.0,
      kcal: 1574.0,
    },
    daily_average: MacroTotals {
      protein_g: 120.0,
      carbs_g: 210.0,
      fat_g: 60.0,
      kcal: 1860.0,
    },
    refreshed_at: Utc::now(),
  }
}

pub fn default_snapshot_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
  let dirs = directories::ProjectDirs::from("", "", "trackgym")
    .ok_or("Failed to resolve data directory")?;
  std::fs::create_dir_all(dirs.data_dir())?;
  Ok(dirs.data_dir().join("widget.json"))
}

/// Read the snapshot, falling back to sample values on any failure.
pub fn read_snapshot(path: &Path) -> WidgetSnapshot {
  match std::fs::read_to_string(path) {
    Ok(raw) => match serde_json::from_str(&raw) {
      Ok(snapshot) => snapshot,
      Err(e) => {
        warn!(error = %e, "widget snapshot unreadable, using sample values");
        sample_snapshot()
      }
    },
    Err(_) => sample_snapshot(),
  }
}

/// Recompute the snapshot from the database and rewrite the file. A write
/// failure is logged and the computed snapshot still returned.
pub async fn refresh_snapshot(pool: &SqlitePool, path: &Path) -> Result<WidgetSnapshot, sqlx::Error> {
  let days = nutrition::daily_totals(pool).await?;
  let today = Local::now().date_naive();

  let snapshot = WidgetSnapshot {
    today: days
      .iter()
      .find(|(d, _)| *d == today)
      .map(|(_, t)| *t)
      .unwrap_or_default(),
    daily_average: stats::daily_average(&days).unwrap_or_default(),
    refreshed_at: Utc::now(),
  };

  match serde_json::to_string_pretty(&snapshot) {
    Ok(json) => {
      if let Err(e) = std::fs::write(path, json) {
        warn!(error = %e, path = %path.display(), "failed to write widget snapshot");
      }
    }
    Err(e) => warn!(error = %e, "failed to serialize widget snapshot"),
  }

  Ok(snapshot)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{setup_test_db, teardown_test_db};

  #[test]
  fn test_missing_file_falls_back_to_samples() {
    let snapshot = read_snapshot(Path::new("/nonexistent/widget.json"));
    assert_eq!(snapshot.today, sample_snapshot().today);
  }

  #[test]
  fn test_corrupt_file_falls_back_to_samples() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("widget.json");
    std::fs::write(&path, "not json at all").unwrap();

    let snapshot = read_snapshot(&path);
    assert_eq!(snapshot.daily_average, sample_snapshot().daily_average);
  }

  #[tokio::test]
  async fn test_refresh_writes_readable_snapshot() {
    let pool = setup_test_db().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("widget.json");

    let meal = nutrition::log_meal(&pool, Utc::now(), "lunch").await.unwrap();
    nutrition::add_entry(&pool, meal.id, "hake", 200.0, None).await.unwrap();

    let written = refresh_snapshot(&pool, &path).await.unwrap();
    assert!((written.today.protein_g - 45.0).abs() < 1e-9);

    let read_back = read_snapshot(&path);
    assert_eq!(read_back.today, written.today);
    assert_eq!(read_back.daily_average, written.daily_average);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_refresh_with_empty_db_writes_zeroes() {
    let pool = setup_test_db().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("widget.json");

    let written = refresh_snapshot(&pool, &path).await.unwrap();
    assert!(written.today.is_empty());
    assert!(written.daily_average.is_empty());

    teardown_test_db(pool).await;
  }
}
