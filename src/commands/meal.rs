use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use tracing::warn;

use crate::catalog;
use crate::db::AppState;
use crate::export::{self, ExportOutcome, SqliteHealthStore};
use crate::models::meal::MEAL_KINDS;
use crate::nutrition;
use crate::widget;

#[derive(Subcommand)]
pub enum MealCommand {
  /// Create a meal (breakfast, lunch, dinner or snack)
  Log {
    kind: String,
    /// RFC 3339 timestamp; defaults to now
    #[arg(long)]
    at: Option<String>,
  },

  /// Add a catalog food to a meal, in grams
  Add {
    meal_id: i64,
    slug: String,
    grams: f64,
    #[arg(long)]
    notes: Option<String>,
  },

  /// List recent meals with their macro totals, grouped by day
  List {
    #[arg(long, default_value_t = 50)]
    limit: i64,
  },

  /// Delete a food entry (and its health-store records, if exported)
  DeleteEntry { entry_id: i64 },

  /// Push a meal's macros to the health store
  Export { meal_id: i64 },
}

impl MealCommand {
  pub async fn execute(self, state: &AppState) -> Result<()> {
    match self {
      MealCommand::Log { kind, at } => {
        if !MEAL_KINDS.contains(&kind.as_str()) {
          bail!("Meal kind must be one of: {}", MEAL_KINDS.join(", "));
        }
        let eaten_at = match at {
          Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .context("Timestamp must be RFC 3339")?
            .with_timezone(&Utc),
          None => Utc::now(),
        };
        let meal = nutrition::log_meal(&state.db, eaten_at, &kind).await?;
        println!("Logged {} as meal {}", meal.kind, meal.id);
        Ok(())
      }

      MealCommand::Add {
        meal_id,
        slug,
        grams,
        notes,
      } => {
        let Some(seed) = catalog::food(&slug) else {
          bail!("Unknown food slug: {}", slug);
        };
        if grams <= 0.0 {
          bail!("Grams must be positive");
        }
        let entry = nutrition::add_entry(&state.db, meal_id, &slug, grams, notes.as_deref())
          .await
          .context("No such meal")?;
        let totals = nutrition::entry_totals(&entry);
        println!(
          "Added {:.0} g {} ({:.1}P / {:.1}C / {:.1}F, {:.0} kcal)",
          grams, seed.name_en, totals.protein_g, totals.carbs_g, totals.fat_g, totals.kcal
        );
        Ok(())
      }

      MealCommand::List { limit } => {
        for meal in nutrition::list_meals(&state.db, limit).await? {
          let totals = nutrition::meal_totals(&state.db, meal.id).await?;
          println!(
            "#{:<5} {}  {:<9} {:.1}P / {:.1}C / {:.1}F, {:.0} kcal",
            meal.id,
            meal.eaten_at.format("%Y-%m-%d %H:%M"),
            meal.kind,
            totals.protein_g,
            totals.carbs_g,
            totals.fat_g,
            totals.kcal
          );
        }

        println!();
        for (day, totals) in nutrition::daily_totals(&state.db).await? {
          println!(
            "{}  {:.1}P / {:.1}C / {:.1}F, {:.0} kcal",
            day, totals.protein_g, totals.carbs_g, totals.fat_g, totals.kcal
          );
        }
        Ok(())
      }

      MealCommand::DeleteEntry { entry_id } => {
        let entry = nutrition::get_entry(&state.db, entry_id)
          .await
          .context("No such entry")?;
        if entry.is_exported() {
          let store = SqliteHealthStore::new(state.db.clone());
          export::forget_entry(&store, &entry).await;
        }
        nutrition::delete_entry(&state.db, entry_id).await?;
        println!("Deleted entry {}", entry_id);
        Ok(())
      }

      MealCommand::Export { meal_id } => {
        let store = SqliteHealthStore::new(state.db.clone());
        let outcome = export::export_meal(&state.db, &store, meal_id)
          .await
          .context("No such meal")?;
        match outcome {
          ExportOutcome::Grouped => println!("Exported meal {} as one grouped record", meal_id),
          ExportOutcome::Individual => {
            println!("Exported meal {} as individual records", meal_id)
          }
          ExportOutcome::Empty => println!("Meal {} has no entries; nothing exported", meal_id),
          ExportOutcome::Failed => println!("Export failed; meal {} left unmarked", meal_id),
        }

        if let Ok(path) = widget::default_snapshot_path() {
          if let Err(e) = widget::refresh_snapshot(&state.db, &path).await {
            warn!(error = %e, "widget refresh skipped");
          }
        }
        Ok(())
      }
    }
  }
}
