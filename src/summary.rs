//! Session summary generation and model-output text cleanup.
//!
//! `flatten` turns whatever the model returned into one plain paragraph;
//! `reformat` is the richer variant that keeps paragraph breaks and
//! normalizes bullet lists. Both are deterministic rewriting passes.

use tracing::warn;

use crate::catalog;
use crate::llm::TextGenerator;
use crate::stats::format_duration;
use crate::workouts::{self, SessionDetail};
use sqlx::SqlitePool;

const COACH_SYSTEM_PROMPT: &str = include_str!("prompts/coach_system.txt");

/// Stored when the service is unavailable or fails.
pub const SUMMARY_PLACEHOLDER: &str = "Could not generate a summary for this session.";

/// ---------------------------------------------------------------------------
/// Text flattening
/// ---------------------------------------------------------------------------

/// Collapse model output into a single plain paragraph: normalized line
/// endings, no emphasis markers, no bullets, single spaces. Idempotent.
pub fn flatten(text: &str) -> String {
  let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

  let cleaned: Vec<String> = normalized
    .lines()
    .map(|line| strip_emphasis(strip_bullet(line.trim())))
    .filter(|line| !line.is_empty())
    .collect();

  cleaned
    .join(" ")
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

/// Richer variant for display surfaces: keeps blank-line paragraph breaks
/// and normalizes bullet lines to a uniform marker.
pub fn reformat(text: &str) -> String {
  let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

  let mut paragraphs: Vec<String> = Vec::new();
  for block in normalized.split("\n\n") {
    let mut lines: Vec<String> = Vec::new();
    for line in block.lines() {
      let trimmed = line.trim();
      if trimmed.is_empty() {
        continue;
      }
      if is_bullet(trimmed) {
        let content = strip_emphasis(strip_bullet(trimmed));
        lines.push(format!("• {}", collapse_spaces(&content)));
      } else {
        let content = strip_emphasis(trimmed);
        match lines.last_mut() {
          // Continuation of a plain line; bullets stay on their own line.
          Some(last) if !last.starts_with("• ") => {
            last.push(' ');
            last.push_str(&collapse_spaces(&content));
          }
          _ => lines.push(collapse_spaces(&content)),
        }
      }
    }
    if !lines.is_empty() {
      paragraphs.push(lines.join("\n"));
    }
  }

  paragraphs.join("\n\n")
}

fn is_bullet(line: &str) -> bool {
  if let Some(rest) = line
    .strip_prefix("- ")
    .or_else(|| line.strip_prefix("* "))
    .or_else(|| line.strip_prefix("• "))
    .or_else(|| line.strip_prefix("· "))
  {
    return !rest.is_empty();
  }
  numbered_bullet_len(line).is_some()
}

fn strip_bullet(line: &str) -> String {
  if let Some(rest) = line
    .strip_prefix("- ")
    .or_else(|| line.strip_prefix("* "))
    .or_else(|| line.strip_prefix("• "))
    .or_else(|| line.strip_prefix("· "))
  {
    return rest.trim_start().to_string();
  }
  if let Some(len) = numbered_bullet_len(line) {
    return line[len..].trim_start().to_string();
  }
  line.to_string()
}

/// Length of a leading "12. " style marker, if present.
fn numbered_bullet_len(line: &str) -> Option<usize> {
  let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
  if digits == 0 {
    return None;
  }
  let rest = &line[digits..];
  if rest.starts_with(". ") || rest.starts_with(") ") {
    Some(digits + 2)
  } else {
    None
  }
}

/// Remove markdown emphasis markers.
fn strip_emphasis(text: impl AsRef<str>) -> String {
  text
    .as_ref()
    .replace("**", "")
    .replace("__", "")
    .replace(['*', '_'], "")
}

fn collapse_spaces(text: &str) -> String {
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// ---------------------------------------------------------------------------
/// Session summary generation
/// ---------------------------------------------------------------------------

/// Render the facts the coach prompt works from.
fn session_facts(detail: &SessionDetail) -> String {
  let mut lines = Vec::new();

  if let Some(duration) = detail.session.duration_seconds() {
    lines.push(format!("Duration: {}", format_duration(duration)));
  }
  for item in &detail.exercises {
    let name = catalog::exercise(&item.exercise.exercise_slug)
      .map(|e| e.name_en)
      .unwrap_or(item.exercise.exercise_slug.as_str());
    let top_weight = item
      .sets
      .iter()
      .map(|s| s.weight_kg)
      .fold(0.0_f64, f64::max);
    lines.push(format!(
      "{}: {} sets, top weight {:.1} kg",
      name,
      item.sets.len(),
      top_weight
    ));
  }

  lines.join("\n")
}

/// Generate, flatten and store a summary for the session. Failures are
/// absorbed: the placeholder is stored and returned instead.
pub async fn generate_session_summary<G: TextGenerator>(
  pool: &SqlitePool,
  session_id: i64,
  generator: &G,
) -> Result<String, sqlx::Error> {
  let detail = workouts::session_detail(pool, session_id).await?;

  let summary = if generator.is_available() && !detail.exercises.is_empty() {
    let prompt = format!(
      "Write the recap for this session:\n{}",
      session_facts(&detail)
    );
    match generator.generate(COACH_SYSTEM_PROMPT, &prompt).await {
      Ok(reply) => {
        let flat = flatten(&reply);
        if flat.is_empty() {
          SUMMARY_PLACEHOLDER.to_string()
        } else {
          flat
        }
      }
      Err(e) => {
        warn!(error = %e, session_id, "summary generation failed");
        SUMMARY_PLACEHOLDER.to_string()
      }
    }
  } else {
    SUMMARY_PLACEHOLDER.to_string()
  };

  workouts::save_summary(pool, session_id, &summary).await?;
  Ok(summary)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::llm::{LlmError, NullGenerator};
  use crate::test_utils::{setup_test_db, teardown_test_db};

  struct ScriptedGenerator(&'static str);

  impl TextGenerator for ScriptedGenerator {
    fn is_available(&self) -> bool {
      true
    }

    async fn generate(&self, _: &str, _: &str) -> Result<String, LlmError> {
      Ok(self.0.to_string())
    }
  }

  #[test]
  fn test_flatten_strips_markup_and_bullets() {
    let input = "**Great session!**\r\n- Bench press went up\n* Squats felt _heavy_\n\n1. Rest well";
    let flat = flatten(input);

    assert_eq!(
      flat,
      "Great session! Bench press went up Squats felt heavy Rest well"
    );
    assert!(!flat.contains('*'));
    assert!(!flat.contains('_'));
    assert!(!flat.contains('-'));
    assert!(!flat.contains('\n'));
  }

  #[test]
  fn test_flatten_is_idempotent() {
    let input = "**Bold** start\n- a bullet\n\n\nlots   of   space";
    let once = flatten(input);
    assert_eq!(flatten(&once), once);
  }

  #[test]
  fn test_flatten_collapses_whitespace_runs() {
    assert_eq!(flatten("a   b\t\tc\n\n\nd"), "a b c d");
  }

  #[test]
  fn test_reformat_keeps_paragraphs_and_normalizes_bullets() {
    let input = "**Summary**\nA strong day.\n\n- bench up\n* squats steady";
    let rich = reformat(input);

    assert_eq!(rich, "Summary A strong day.\n\n• bench up\n• squats steady");
    // Markers are normalized, not preserved.
    assert!(!rich.contains("- "));
    assert!(!rich.contains('*'));
  }

  #[test]
  fn test_reformat_is_idempotent() {
    let input = "Intro text\n\n- one\n- two";
    let once = reformat(input);
    assert_eq!(reformat(&once), once);
  }

  #[tokio::test]
  async fn test_summary_is_flattened_and_stored() {
    let pool = setup_test_db().await;
    let session_id = crate::test_utils::seed_test_session(&pool).await;
    crate::test_utils::seed_test_sets(&pool, session_id, "bench-press", &[(10, 80.0)]).await;

    let summary = generate_session_summary(
      &pool,
      session_id,
      &ScriptedGenerator("**Nice work!**\n- Bench is moving"),
    )
    .await
    .unwrap();

    assert_eq!(summary, "Nice work! Bench is moving");

    let session = workouts::get_session(&pool, session_id).await.unwrap();
    assert_eq!(session.summary.as_deref(), Some("Nice work! Bench is moving"));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_unavailable_service_stores_placeholder() {
    let pool = setup_test_db().await;
    let session_id = crate::test_utils::seed_test_session(&pool).await;
    crate::test_utils::seed_test_sets(&pool, session_id, "squat", &[(5, 120.0)]).await;

    let summary = generate_session_summary(&pool, session_id, &NullGenerator)
      .await
      .unwrap();

    assert_eq!(summary, SUMMARY_PLACEHOLDER);

    teardown_test_db(pool).await;
  }
}
