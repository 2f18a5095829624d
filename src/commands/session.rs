use anyhow::{bail, Context, Result};
use clap::Subcommand;
use tracing::warn;

use crate::catalog;
use crate::db::AppState;
use crate::deeplink;
use crate::live;
use crate::llm::TextGenerator;
use crate::stats::format_duration;
use crate::suggestion::{self, Goal, SuggestionSource};
use crate::summary;
use crate::widget;
use crate::workouts;

#[derive(Subcommand)]
pub enum SessionCommand {
  /// Start a new session (replaces the live surface)
  Start,

  /// Finish a session: ends the live surface and generates the summary
  Finish { id: i64 },

  /// List recent sessions
  List {
    #[arg(long, default_value_t = 20)]
    limit: i64,
  },

  /// Show one session with its exercises and sets
  Show { id: i64 },

  /// Delete a session and everything in it
  Delete { id: i64 },

  /// Append an exercise to a session
  AddExercise { session_id: i64, slug: String },

  /// Move an exercise to a new position in the session
  MoveExercise {
    session_id: i64,
    exercise_id: i64,
    position: i64,
  },

  /// Record a set for a performed exercise
  AddSet {
    exercise_id: i64,
    reps: i64,
    weight_kg: f64,
    #[arg(long)]
    duration_seconds: Option<i64>,
  },

  /// Suggest the next set for an exercise
  Suggest { slug: String },

  /// Regenerate the AI summary for a session
  Summarize { id: i64 },
}

impl SessionCommand {
  pub async fn execute<G: TextGenerator>(self, state: &AppState, generator: &G) -> Result<()> {
    match self {
      SessionCommand::Start => {
        let session = workouts::start_session(&state.db).await?;
        if let Some(started_at) = session.started_at {
          live::start(&state.db, session.id, started_at).await?;
        }
        println!("Started session {}", session.id);
        println!("Deep link: {}", deeplink::session_link(session.id));
        Ok(())
      }

      SessionCommand::Finish { id } => {
        let session = workouts::finish_session(&state.db, id)
          .await
          .context("No such session")?;
        if let Some(ended_at) = session.ended_at {
          live::end(&state.db, id, ended_at).await?;
        }

        // Summary and widget refresh are best effort; a finished session
        // must never fail because of them.
        match summary::generate_session_summary(&state.db, id, generator).await {
          Ok(text) => println!("{}", text),
          Err(e) => warn!(error = %e, "summary generation skipped"),
        }
        if let Ok(path) = widget::default_snapshot_path() {
          if let Err(e) = widget::refresh_snapshot(&state.db, &path).await {
            warn!(error = %e, "widget refresh skipped");
          }
        }

        if let Some(duration) = session.duration_seconds() {
          println!("Session {} finished ({})", id, format_duration(duration));
        }
        Ok(())
      }

      SessionCommand::List { limit } => {
        for session in workouts::list_sessions(&state.db, limit).await? {
          let when = session
            .started_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "not started".to_string());
          let status = match (session.started_at, session.ended_at) {
            (Some(_), None) => "in progress",
            (Some(_), Some(_)) => "finished",
            _ => "empty",
          };
          println!("#{:<5} {}  {}", session.id, when, status);
        }
        Ok(())
      }

      SessionCommand::Show { id } => show(state, id).await,

      SessionCommand::Delete { id } => {
        workouts::delete_session(&state.db, id).await?;
        println!("Deleted session {}", id);
        Ok(())
      }

      SessionCommand::AddExercise { session_id, slug } => {
        let Some(seed) = catalog::exercise(&slug) else {
          bail!("Unknown exercise slug: {}", slug);
        };
        let exercise = workouts::add_exercise(&state.db, session_id, &slug).await?;
        println!(
          "Added {} ({}) as exercise {} at position {}",
          seed.name_en, seed.muscle_group, exercise.id, exercise.position
        );
        Ok(())
      }

      SessionCommand::MoveExercise {
        session_id,
        exercise_id,
        position,
      } => {
        workouts::move_exercise(&state.db, session_id, exercise_id, position)
          .await
          .context("No such exercise in that session")?;
        println!("Moved exercise {} to position {}", exercise_id, position);
        Ok(())
      }

      SessionCommand::AddSet {
        exercise_id,
        reps,
        weight_kg,
        duration_seconds,
      } => {
        if reps <= 0 {
          bail!("Reps must be positive");
        }
        if weight_kg < 0.0 {
          bail!("Weight cannot be negative");
        }
        let set = workouts::add_set(&state.db, exercise_id, reps, weight_kg, duration_seconds)
          .await
          .context("No such exercise")?;
        println!("Set {}: {} x {:.1} kg", set.position + 1, set.reps, set.weight_kg);
        Ok(())
      }

      SessionCommand::Suggest { slug } => {
        let Some(seed) = catalog::exercise(&slug) else {
          bail!("Unknown exercise slug: {}", slug);
        };
        let profile = crate::nutrition::get_profile(&state.db).await?;
        let goal = Goal::from_keywords(&profile.goal);
        let isolation = suggestion::is_isolation(seed.muscle_group);
        let history = suggestion::load_history(&state.db, &slug).await?;

        let proposal = suggestion::suggest_next_set(&history, goal, isolation, generator).await;
        let source = match proposal.source {
          SuggestionSource::Model => "model",
          SuggestionSource::Rule => "rule",
        };
        println!(
          "{}: {} reps at {:.1} kg ({})",
          seed.name_en, proposal.reps, proposal.weight_kg, source
        );
        Ok(())
      }

      SessionCommand::Summarize { id } => {
        let text = summary::generate_session_summary(&state.db, id, generator)
          .await
          .context("No such session")?;
        println!("{}", text);
        Ok(())
      }
    }
  }
}

pub async fn show(state: &AppState, session_id: i64) -> Result<()> {
  let detail = workouts::session_detail(&state.db, session_id)
    .await
    .context("No such session")?;

  println!("Session {}", detail.session.id);
  if let Some(duration) = detail.session.duration_seconds() {
    println!("Duration: {}", format_duration(duration));
  }
  for item in &detail.exercises {
    let name = catalog::exercise(&item.exercise.exercise_slug)
      .map(|e| e.name_en)
      .unwrap_or(item.exercise.exercise_slug.as_str());
    println!("  {}. {}", item.exercise.position + 1, name);
    for set in &item.sets {
      match set.duration_seconds {
        Some(secs) => println!(
          "     {} x {:.1} kg ({})",
          set.reps,
          set.weight_kg,
          format_duration(secs)
        ),
        None => println!("     {} x {:.1} kg", set.reps, set.weight_kg),
      }
    }
  }
  if let Some(text) = &detail.session.summary {
    println!("\n{}", summary::reformat(text));
  }
  Ok(())
}
