//! Meal and food-entry storage, plus the single-row profile.
//!
//! Macro math is delegated to `stats`; this module only moves rows. Entries
//! referencing a slug missing from the catalog contribute zero macros rather
//! than failing a whole listing.

use chrono::{DateTime, Local, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::warn;

use crate::catalog;
use crate::models::{FoodEntry, Meal, Profile};
use crate::stats::{self, MacroTotals};

/// ---------------------------------------------------------------------------
/// Meals
/// ---------------------------------------------------------------------------

pub async fn log_meal(
  pool: &SqlitePool,
  eaten_at: DateTime<Utc>,
  kind: &str,
) -> Result<Meal, sqlx::Error> {
  let result = sqlx::query("INSERT INTO meals (eaten_at, kind) VALUES (?1, ?2)")
    .bind(eaten_at)
    .bind(kind)
    .execute(pool)
    .await?;

  get_meal(pool, result.last_insert_rowid()).await
}

pub async fn get_meal(pool: &SqlitePool, meal_id: i64) -> Result<Meal, sqlx::Error> {
  sqlx::query_as::<_, Meal>("SELECT * FROM meals WHERE id = ?1")
    .bind(meal_id)
    .fetch_one(pool)
    .await
}

pub async fn list_meals(pool: &SqlitePool, limit: i64) -> Result<Vec<Meal>, sqlx::Error> {
  sqlx::query_as::<_, Meal>("SELECT * FROM meals ORDER BY eaten_at DESC LIMIT ?1")
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn delete_meal(pool: &SqlitePool, meal_id: i64) -> Result<(), sqlx::Error> {
  sqlx::query("DELETE FROM meals WHERE id = ?1")
    .bind(meal_id)
    .execute(pool)
    .await?;
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Food entries
/// ---------------------------------------------------------------------------

/// Insert an entry and assign its stable sync id (used to tag health-store
/// records belonging to this entry).
pub async fn add_entry(
  pool: &SqlitePool,
  meal_id: i64,
  food_slug: &str,
  grams: f64,
  notes: Option<&str>,
) -> Result<FoodEntry, sqlx::Error> {
  let result = sqlx::query(
    "INSERT INTO food_entries (meal_id, food_slug, grams, notes) VALUES (?1, ?2, ?3, ?4)",
  )
  .bind(meal_id)
  .bind(food_slug)
  .bind(grams)
  .bind(notes)
  .execute(pool)
  .await?;

  let id = result.last_insert_rowid();
  sqlx::query("UPDATE food_entries SET sync_id = ?1 WHERE id = ?2")
    .bind(format!("trackgym-entry-{}", id))
    .bind(id)
    .execute(pool)
    .await?;

  get_entry(pool, id).await
}

pub async fn get_entry(pool: &SqlitePool, entry_id: i64) -> Result<FoodEntry, sqlx::Error> {
  sqlx::query_as::<_, FoodEntry>("SELECT * FROM food_entries WHERE id = ?1")
    .bind(entry_id)
    .fetch_one(pool)
    .await
}

pub async fn list_entries(pool: &SqlitePool, meal_id: i64) -> Result<Vec<FoodEntry>, sqlx::Error> {
  sqlx::query_as::<_, FoodEntry>(
    "SELECT * FROM food_entries WHERE meal_id = ?1 ORDER BY created_at, id",
  )
  .bind(meal_id)
  .fetch_all(pool)
  .await
}

pub async fn delete_entry(pool: &SqlitePool, entry_id: i64) -> Result<(), sqlx::Error> {
  sqlx::query("DELETE FROM food_entries WHERE id = ?1")
    .bind(entry_id)
    .execute(pool)
    .await?;
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Totals
/// ---------------------------------------------------------------------------

pub fn entry_totals(entry: &FoodEntry) -> MacroTotals {
  slug_totals(&entry.food_slug, entry.grams)
}

fn slug_totals(food_slug: &str, grams: f64) -> MacroTotals {
  match catalog::food(food_slug) {
    Some(food) => MacroTotals::from_food(food, grams),
    None => {
      warn!(slug = %food_slug, "food entry references unknown catalog slug");
      MacroTotals::default()
    }
  }
}

pub async fn meal_totals(pool: &SqlitePool, meal_id: i64) -> Result<MacroTotals, sqlx::Error> {
  let entries = list_entries(pool, meal_id).await?;
  Ok(MacroTotals::sum(entries.iter().map(entry_totals)))
}

/// Per-day totals over every logged entry, newest day first. Days use the
/// local calendar.
pub async fn daily_totals(pool: &SqlitePool) -> Result<Vec<(NaiveDate, MacroTotals)>, sqlx::Error> {
  let rows: Vec<(DateTime<Utc>, String, f64)> = sqlx::query_as(
    r#"
    SELECT m.eaten_at, e.food_slug, e.grams
    FROM food_entries e
    JOIN meals m ON e.meal_id = m.id
    ORDER BY m.eaten_at
    "#,
  )
  .fetch_all(pool)
  .await?;

  Ok(stats::group_by_day(rows.iter().map(|(eaten_at, slug, grams)| {
    (
      eaten_at.with_timezone(&Local).date_naive(),
      slug_totals(slug, *grams),
    )
  })))
}

/// Totals for one local calendar day.
pub async fn totals_for_day(pool: &SqlitePool, day: NaiveDate) -> Result<MacroTotals, sqlx::Error> {
  let days = daily_totals(pool).await?;
  Ok(days
    .into_iter()
    .find(|(d, _)| *d == day)
    .map(|(_, totals)| totals)
    .unwrap_or_default())
}

/// ---------------------------------------------------------------------------
/// Profile
/// ---------------------------------------------------------------------------

pub async fn get_profile(pool: &SqlitePool) -> Result<Profile, sqlx::Error> {
  let row = sqlx::query_as::<_, Profile>("SELECT * FROM profile WHERE id = 1")
    .fetch_optional(pool)
    .await?;
  Ok(row.unwrap_or_default())
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
  pub age: Option<i64>,
  pub weight_kg: Option<f64>,
  pub height_cm: Option<f64>,
  pub chest_cm: Option<f64>,
  pub waist_cm: Option<f64>,
  pub hip_cm: Option<f64>,
  pub activity_level: Option<String>,
  pub goal: Option<String>,
  pub dietary_restrictions: Option<String>,
}

/// Update only the provided fields.
pub async fn update_profile(pool: &SqlitePool, update: &ProfileUpdate) -> Result<Profile, sqlx::Error> {
  sqlx::query(
    r#"
    UPDATE profile SET
      age = COALESCE(?1, age),
      weight_kg = COALESCE(?2, weight_kg),
      height_cm = COALESCE(?3, height_cm),
      chest_cm = COALESCE(?4, chest_cm),
      waist_cm = COALESCE(?5, waist_cm),
      hip_cm = COALESCE(?6, hip_cm),
      activity_level = COALESCE(?7, activity_level),
      goal = COALESCE(?8, goal),
      dietary_restrictions = COALESCE(?9, dietary_restrictions),
      updated_at = ?10
    WHERE id = 1
    "#,
  )
  .bind(update.age)
  .bind(update.weight_kg)
  .bind(update.height_cm)
  .bind(update.chest_cm)
  .bind(update.waist_cm)
  .bind(update.hip_cm)
  .bind(update.activity_level.as_deref())
  .bind(update.goal.as_deref())
  .bind(update.dietary_restrictions.as_deref())
  .bind(Utc::now())
  .execute(pool)
  .await?;

  get_profile(pool).await
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{setup_test_db, teardown_test_db};

  #[tokio::test]
  async fn test_log_meal_with_entries_and_totals() {
    let pool = setup_test_db().await;

    let meal = log_meal(&pool, Utc::now(), "lunch").await.unwrap();
    let entry = add_entry(&pool, meal.id, "hake", 200.0, None).await.unwrap();
    add_entry(&pool, meal.id, "white-rice", 150.0, Some("al dente")).await.unwrap();

    assert_eq!(entry.sync_id.as_deref(), Some(format!("trackgym-entry-{}", entry.id).as_str()));
    assert!(!entry.is_exported());

    let totals = meal_totals(&pool, meal.id).await.unwrap();
    // 200 g hake = 45P/0C/3F/208kcal; 150 g rice adds 4.05P/42C/0.45F/195kcal.
    assert!((totals.protein_g - 49.05).abs() < 1e-9);
    assert!((totals.kcal - 403.0).abs() < 1e-9);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_unknown_slug_contributes_zero() {
    let pool = setup_test_db().await;
    let meal = log_meal(&pool, Utc::now(), "snack").await.unwrap();
    add_entry(&pool, meal.id, "mystery-food", 500.0, None).await.unwrap();

    let totals = meal_totals(&pool, meal.id).await.unwrap();
    assert!(totals.is_empty());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_daily_totals_group_by_local_day() {
    let pool = setup_test_db().await;

    let today = Utc::now();
    let meal1 = log_meal(&pool, today, "breakfast").await.unwrap();
    let meal2 = log_meal(&pool, today, "dinner").await.unwrap();
    add_entry(&pool, meal1.id, "hake", 100.0, None).await.unwrap();
    add_entry(&pool, meal2.id, "hake", 100.0, None).await.unwrap();

    let days = daily_totals(&pool).await.unwrap();
    assert_eq!(days.len(), 1);
    assert!((days[0].1.protein_g - 45.0).abs() < 1e-9);

    let day_totals = totals_for_day(&pool, days[0].0).await.unwrap();
    assert!((day_totals.kcal - 208.0).abs() < 1e-9);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_delete_meal_cascades_entries() {
    let pool = setup_test_db().await;
    let meal = log_meal(&pool, Utc::now(), "lunch").await.unwrap();
    add_entry(&pool, meal.id, "banana", 120.0, None).await.unwrap();

    delete_meal(&pool, meal.id).await.unwrap();

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM food_entries")
      .fetch_one(&pool)
      .await
      .unwrap();
    assert_eq!(count, 0);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_profile_partial_update() {
    let pool = setup_test_db().await;

    let before = get_profile(&pool).await.unwrap();
    assert_eq!(before.goal, "hypertrophy");

    let after = update_profile(
      &pool,
      &ProfileUpdate {
        goal: Some("fuerza".to_string()),
        weight_kg: Some(81.5),
        ..Default::default()
      },
    )
    .await
    .unwrap();

    assert_eq!(after.goal, "fuerza");
    assert_eq!(after.weight_kg, Some(81.5));
    // Untouched fields keep their values.
    assert_eq!(after.activity_level, before.activity_level);

    teardown_test_db(pool).await;
  }
}
