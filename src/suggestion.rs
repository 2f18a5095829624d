//! Next-set suggestion engine
//!
//! Proposes reps and weight for the next set of an exercise from its
//! historical sets, the profile goal and the movement classification:
//! - goal keyword match picks the target rep range
//! - isolation vs. compound picks the rep/weight step caps
//! - the allowed weight window is bounded by the step cap and a hard ceiling
//! - an optional text-generation override is clamped into the same windows
//!
//! The model call is strictly optional: any failure falls back to the
//! deterministic rule, silently.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::llm::TextGenerator;

const SUGGESTION_SYSTEM_PROMPT: &str = include_str!("prompts/suggestion_system.txt");

/// Smallest meaningful plate increment, in kg.
const MIN_PLATE_STEP_KG: f64 = 2.5;
/// Hard cap on any suggested weight.
const MAX_WEIGHT_KG: f64 = 200.0;
/// Suggested weight never exceeds this multiple of the historical max.
const MAX_OVER_HISTORICAL: f64 = 1.2;

/// Defaults when the exercise has no history at all.
pub const DEFAULT_REPS: i64 = 12;
pub const DEFAULT_WEIGHT_KG: f64 = 50.0;

// ---------------------------------------------------------------------------
/// Goal classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
  Strength,
  Endurance,
  Hypertrophy,
}

impl Goal {
  /// Classify a free-text goal by keyword (English or Spanish).
  /// Anything unrecognized is treated as hypertrophy.
  pub fn from_keywords(text: &str) -> Self {
    let lower = text.to_lowercase();
    if lower.contains("strength") || lower.contains("fuerza") {
      Goal::Strength
    } else if lower.contains("endurance")
      || lower.contains("resistencia")
      || lower.contains("cardio")
    {
      Goal::Endurance
    } else {
      Goal::Hypertrophy
    }
  }

  pub fn rep_range(&self) -> RepRange {
    match self {
      Goal::Strength => RepRange { min: 3, max: 6 },
      Goal::Endurance => RepRange { min: 12, max: 20 },
      Goal::Hypertrophy => RepRange { min: 8, max: 15 },
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepRange {
  pub min: i64,
  pub max: i64,
}

impl RepRange {
  pub fn contains(&self, reps: i64) -> bool {
    reps >= self.min && reps <= self.max
  }
}

/// Classify a movement as isolation by keyword match on its muscle group.
pub fn is_isolation(muscle_group: &str) -> bool {
  const ISOLATION_GROUPS: &[&str] = &[
    "biceps", "bíceps", "triceps", "tríceps", "calves", "gemelos", "forearms",
    "antebrazos", "shoulders", "hombros",
  ];
  let lower = muscle_group.to_lowercase();
  ISOLATION_GROUPS.iter().any(|g| lower.contains(g))
}

fn rep_step(isolation: bool) -> i64 {
  if isolation {
    1
  } else {
    2
  }
}

// ---------------------------------------------------------------------------
/// Allowed windows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightWindow {
  pub min: f64,
  pub max: f64,
}

impl WeightWindow {
  /// Window around the last recorded weight: step cap is a percentage of
  /// that weight (with a plate-step floor), bounded above by
  /// 1.2 x historical max and the hard ceiling.
  pub fn around(last_kg: f64, historical_max_kg: f64, isolation: bool) -> Self {
    let pct = if isolation { 0.05 } else { 0.10 };
    let step = (last_kg * pct).max(MIN_PLATE_STEP_KG);
    let ceiling = (historical_max_kg * MAX_OVER_HISTORICAL).min(MAX_WEIGHT_KG);

    let min = (last_kg - step).max(0.0);
    let max = (last_kg + step).min(ceiling).max(min);
    Self { min, max }
  }

  pub fn clamp(&self, value: f64) -> f64 {
    value.clamp(self.min, self.max)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepWindow {
  pub min: i64,
  pub max: i64,
}

impl RepWindow {
  /// Window of one rep step around the last recorded reps, capped by the
  /// goal ceiling.
  pub fn around(last_reps: i64, range: RepRange, isolation: bool) -> Self {
    let step = rep_step(isolation);
    let min = (last_reps - step).max(1);
    let max = (last_reps + step).min(range.max).max(min);
    Self { min, max }
  }

  pub fn clamp(&self, value: i64) -> i64 {
    value.clamp(self.min, self.max)
  }
}

// ---------------------------------------------------------------------------
/// Deterministic rule
// ---------------------------------------------------------------------------

/// One historical set, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistorySet {
  pub reps: i64,
  pub weight_kg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
  Rule,
  Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetSuggestion {
  pub reps: i64,
  pub weight_kg: f64,
  pub source: SuggestionSource,
}

/// The rule table:
/// - no history: goal default
/// - last reps at/above the range ceiling: hold reps at the ceiling, move
///   weight up to the top of its window
/// - last reps below the range floor: add one rep step (never past the
///   floor), weight holds
/// - inside the range: repeat the last set
pub fn rule_based(history: &[HistorySet], goal: Goal, isolation: bool) -> SetSuggestion {
  let Some(last) = history.last() else {
    return SetSuggestion {
      reps: DEFAULT_REPS,
      weight_kg: DEFAULT_WEIGHT_KG,
      source: SuggestionSource::Rule,
    };
  };

  let range = goal.rep_range();
  let historical_max = history
    .iter()
    .map(|s| s.weight_kg)
    .fold(0.0_f64, f64::max);
  let window = WeightWindow::around(last.weight_kg, historical_max, isolation);

  let (reps, weight_kg) = if last.reps >= range.max {
    (last.reps.min(range.max), window.max)
  } else if last.reps < range.min {
    ((last.reps + rep_step(isolation)).min(range.min), last.weight_kg)
  } else {
    (last.reps, last.weight_kg)
  };

  SetSuggestion {
    reps,
    weight_kg,
    source: SuggestionSource::Rule,
  }
}

// ---------------------------------------------------------------------------
/// Model override
// ---------------------------------------------------------------------------

/// Ask the text-generation service for a proposal inside the allowed
/// windows, clamp whatever comes back, and fall back to the rule on any
/// failure. The reply grammar is strict: the first two whitespace-delimited
/// tokens must be the reps and the weight, each a bare numeric literal
/// (dot or comma decimal separator).
pub async fn suggest_next_set<G: TextGenerator>(
  history: &[HistorySet],
  goal: Goal,
  isolation: bool,
  generator: &G,
) -> SetSuggestion {
  let rule = rule_based(history, goal, isolation);

  if !generator.is_available() {
    return rule;
  }
  let Some(last) = history.last() else {
    return rule;
  };

  let range = goal.rep_range();
  let historical_max = history
    .iter()
    .map(|s| s.weight_kg)
    .fold(0.0_f64, f64::max);
  let rep_window = RepWindow::around(last.reps, range, isolation);
  let weight_window = WeightWindow::around(last.weight_kg, historical_max, isolation);

  let prompt = format!(
    "Goal rep range: {}-{}. Last set: {} reps at {:.1} kg.\n\
     Allowed reps: {} to {}. Allowed weight: {:.1} to {:.1} kg.\n\
     Recent sets (oldest first): {}.\n\
     Propose the next set.",
    range.min,
    range.max,
    last.reps,
    last.weight_kg,
    rep_window.min,
    rep_window.max,
    weight_window.min,
    weight_window.max,
    history
      .iter()
      .rev()
      .take(5)
      .rev()
      .map(|s| format!("{}x{:.1}", s.reps, s.weight_kg))
      .collect::<Vec<_>>()
      .join(", "),
  );

  match generator.generate(SUGGESTION_SYSTEM_PROMPT, &prompt).await {
    Ok(reply) => match parse_set_reply(&reply) {
      Some((reps, weight)) => {
        debug!(reply = %reply.trim(), "model proposed next set");
        SetSuggestion {
          reps: rep_window.clamp(reps),
          weight_kg: weight_window.clamp(weight),
          source: SuggestionSource::Model,
        }
      }
      None => {
        warn!(reply = %reply.trim(), "unparseable suggestion reply, using rule");
        rule
      }
    },
    Err(e) => {
      warn!(error = %e, "suggestion request failed, using rule");
      rule
    }
  }
}

/// Parse "reps weight" from a reply. Both tokens must be bare numeric
/// literals; a comma decimal separator parses identically to a dot.
fn parse_set_reply(reply: &str) -> Option<(i64, f64)> {
  let mut tokens = reply.split_whitespace();
  let reps = parse_numeric_token(tokens.next()?)?;
  let weight = parse_numeric_token(tokens.next()?)?;
  if reps < 0.0 || weight < 0.0 {
    return None;
  }
  Some((reps.round() as i64, weight))
}

/// Accept only a whole numeric token ("12", "102.5", "102,5"); anything
/// with trailing units or prose is rejected.
fn parse_numeric_token(token: &str) -> Option<f64> {
  token.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Database Operations
// ---------------------------------------------------------------------------

/// Load all historical sets for an exercise across every session,
/// chronological order.
pub async fn load_history(pool: &SqlitePool, exercise_slug: &str) -> Result<Vec<HistorySet>, sqlx::Error> {
  let rows: Vec<(i64, f64)> = sqlx::query_as(
    r#"
    SELECT s.reps, s.weight_kg
    FROM exercise_sets s
    JOIN session_exercises e ON s.session_exercise_id = e.id
    WHERE e.exercise_slug = ?1
    ORDER BY s.created_at, s.id
    "#,
  )
  .bind(exercise_slug)
  .fetch_all(pool)
  .await?;

  Ok(rows
    .into_iter()
    .map(|(reps, weight_kg)| HistorySet { reps, weight_kg })
    .collect())
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::llm::{LlmError, NullGenerator};

  /// Generator returning a fixed reply, for exercising the override path.
  struct ScriptedGenerator(&'static str);

  impl TextGenerator for ScriptedGenerator {
    fn is_available(&self) -> bool {
      true
    }

    async fn generate(&self, _: &str, _: &str) -> Result<String, LlmError> {
      Ok(self.0.to_string())
    }
  }

  struct FailingGenerator;

  impl TextGenerator for FailingGenerator {
    fn is_available(&self) -> bool {
      true
    }

    async fn generate(&self, _: &str, _: &str) -> Result<String, LlmError> {
      Err(LlmError::Api("boom".to_string()))
    }
  }

  fn sets(pairs: &[(i64, f64)]) -> Vec<HistorySet> {
    pairs
      .iter()
      .map(|&(reps, weight_kg)| HistorySet { reps, weight_kg })
      .collect()
  }

  #[test]
  fn test_goal_keyword_classification() {
    assert_eq!(Goal::from_keywords("build strength"), Goal::Strength);
    assert_eq!(Goal::from_keywords("ganar fuerza"), Goal::Strength);
    assert_eq!(Goal::from_keywords("endurance base"), Goal::Endurance);
    assert_eq!(Goal::from_keywords("más resistencia"), Goal::Endurance);
    assert_eq!(Goal::from_keywords("get big"), Goal::Hypertrophy);
    assert_eq!(Goal::from_keywords(""), Goal::Hypertrophy);
  }

  #[test]
  fn test_goal_rep_ranges() {
    assert_eq!(Goal::Strength.rep_range(), RepRange { min: 3, max: 6 });
    assert_eq!(Goal::Endurance.rep_range(), RepRange { min: 12, max: 20 });
    assert_eq!(Goal::Hypertrophy.rep_range(), RepRange { min: 8, max: 15 });
  }

  #[test]
  fn test_isolation_classification() {
    assert!(is_isolation("biceps"));
    assert!(is_isolation("Bíceps"));
    assert!(is_isolation("shoulders"));
    assert!(!is_isolation("chest"));
    assert!(!is_isolation("back"));
    assert!(!is_isolation("quads"));
  }

  #[test]
  fn test_no_history_falls_back_to_goal_default() {
    let s = rule_based(&[], Goal::Hypertrophy, false);
    assert_eq!(s.reps, 12);
    assert_eq!(s.weight_kg, 50.0);
    assert_eq!(s.source, SuggestionSource::Rule);
  }

  #[test]
  fn test_at_ceiling_holds_reps_and_raises_weight() {
    // Last set 15 x 100 kg, hypertrophy range 8-15, compound.
    let history = sets(&[(12, 90.0), (14, 95.0), (15, 100.0)]);
    let s = rule_based(&history, Goal::Hypertrophy, false);

    assert!(s.reps <= 15);
    // Compound step cap is 10% of 100 kg; at least one plate step up.
    assert!(s.weight_kg >= 100.0 + MIN_PLATE_STEP_KG);
    assert!(s.weight_kg <= 110.0);
    // Never past 1.2 x historical max.
    assert!(s.weight_kg <= 120.0);
  }

  #[test]
  fn test_reps_at_or_above_ceiling_stay_in_window() {
    for last_reps in 15..=17 {
      let history = sets(&[(last_reps, 80.0)]);
      let s = rule_based(&history, Goal::Hypertrophy, false);
      assert!(s.reps <= 15, "reps {} escaped the range", s.reps);
      assert!((s.reps - last_reps).abs() <= 2);
    }
  }

  #[test]
  fn test_below_floor_steps_reps_up_and_holds_weight() {
    // Last set 6 x 30 kg on an isolation movement, range 8-15.
    let history = sets(&[(6, 30.0)]);
    let s = rule_based(&history, Goal::Hypertrophy, true);

    assert_eq!(s.reps, 7, "isolation rep step is 1");
    assert_eq!(s.weight_kg, 30.0, "weight must not increase below the floor");
  }

  #[test]
  fn test_below_floor_compound_caps_at_floor() {
    let history = sets(&[(7, 60.0)]);
    let s = rule_based(&history, Goal::Hypertrophy, false);
    // Step of 2 would be 9; capped at the floor.
    assert_eq!(s.reps, 8);
    assert_eq!(s.weight_kg, 60.0);
  }

  #[test]
  fn test_inside_range_repeats_last_set() {
    let history = sets(&[(10, 70.0)]);
    let s = rule_based(&history, Goal::Hypertrophy, false);
    assert_eq!(s.reps, 10);
    assert_eq!(s.weight_kg, 70.0);
  }

  #[test]
  fn test_weight_window_bounds() {
    // Isolation: 5% of 40 kg is below the plate floor, so step is 2.5.
    let w = WeightWindow::around(40.0, 40.0, true);
    assert_eq!(w.min, 37.5);
    assert_eq!(w.max, 42.5);

    // Compound at 100 kg: step 10 kg.
    let w = WeightWindow::around(100.0, 100.0, false);
    assert_eq!(w.min, 90.0);
    assert_eq!(w.max, 110.0);

    // Upper bound never exceeds 1.2 x historical max...
    let w = WeightWindow::around(100.0, 85.0, false);
    assert!(w.max <= 85.0 * 1.2);

    // ...nor the hard ceiling.
    let w = WeightWindow::around(195.0, 195.0, false);
    assert!(w.max <= 200.0);

    // Lower bound never goes negative.
    let w = WeightWindow::around(1.0, 1.0, true);
    assert_eq!(w.min, 0.0);
  }

  #[test]
  fn test_rep_window_is_anchored_on_last_reps() {
    // Below the floor the window stays one step around the last value,
    // never around the rule's already-stepped output.
    let range = Goal::Hypertrophy.rep_range();
    let w = RepWindow::around(6, range, false);
    assert_eq!(w.min, 4);
    assert_eq!(w.max, 8);

    // At the ceiling the goal range still caps the top.
    let w = RepWindow::around(15, range, false);
    assert_eq!(w.max, 15);
  }

  #[test]
  fn test_comma_and_dot_decimal_parse_identically() {
    assert_eq!(parse_numeric_token("102,5"), parse_numeric_token("102.5"));
    assert_eq!(parse_numeric_token("102,5"), Some(102.5));
  }

  #[test]
  fn test_reply_grammar_is_strict() {
    // Valid: two bare numbers.
    assert_eq!(parse_set_reply("12 62.5"), Some((12, 62.5)));
    assert_eq!(parse_set_reply("12 62,5"), Some((12, 62.5)));

    // Units glued to the number are rejected, not trimmed.
    assert_eq!(parse_set_reply("12 62.5kg"), None);
    // Prose before the numbers is rejected; the first token must be
    // the number itself.
    assert_eq!(parse_set_reply("I suggest 12 62.5"), None);
    assert_eq!(parse_set_reply(""), None);
    assert_eq!(parse_set_reply("-5 60"), None);
  }

  #[tokio::test]
  async fn test_model_override_is_clamped_into_windows() {
    // Model proposes something absurd; both axes get clamped.
    let history = sets(&[(10, 100.0)]);
    let s = suggest_next_set(&history, Goal::Hypertrophy, false, &ScriptedGenerator("30 500"))
      .await;

    assert_eq!(s.source, SuggestionSource::Model);
    assert!(s.reps <= 12, "reps clamped to last reps + step");
    assert!(s.weight_kg <= 110.0, "weight clamped into the window");
  }

  #[tokio::test]
  async fn test_below_floor_override_caps_at_floor() {
    // Last set 6 reps on a compound lift, range 8-15. A model reply of 10
    // must clamp to the floor; the window sits around the last value, not
    // around the rule's stepped-up proposal.
    let history = sets(&[(6, 60.0)]);
    let s = suggest_next_set(&history, Goal::Hypertrophy, false, &ScriptedGenerator("10 60"))
      .await;

    assert_eq!(s.source, SuggestionSource::Model);
    assert_eq!(s.reps, 8, "reps capped at last + step = floor");
    assert_eq!(s.weight_kg, 60.0);
  }

  #[tokio::test]
  async fn test_model_failure_falls_back_to_rule() {
    let history = sets(&[(10, 70.0)]);
    let s = suggest_next_set(&history, Goal::Hypertrophy, false, &FailingGenerator).await;
    assert_eq!(s.source, SuggestionSource::Rule);
    assert_eq!(s.reps, 10);
    assert_eq!(s.weight_kg, 70.0);
  }

  #[tokio::test]
  async fn test_unparseable_reply_falls_back_to_rule() {
    let history = sets(&[(10, 70.0)]);
    let s = suggest_next_set(
      &history,
      Goal::Hypertrophy,
      false,
      &ScriptedGenerator("Try twelve reps at the same weight!"),
    )
    .await;
    assert_eq!(s.source, SuggestionSource::Rule);
  }

  #[tokio::test]
  async fn test_unavailable_generator_uses_rule_without_calling() {
    let history = sets(&[(15, 100.0)]);
    let s = suggest_next_set(&history, Goal::Hypertrophy, false, &NullGenerator).await;
    assert_eq!(s.source, SuggestionSource::Rule);
  }

  #[tokio::test]
  async fn test_load_history_orders_chronologically() {
    let pool = crate::test_utils::setup_test_db().await;
    let session_id = crate::test_utils::seed_test_session(&pool).await;
    crate::test_utils::seed_test_sets(&pool, session_id, "bench-press", &[(10, 80.0), (9, 82.5)])
      .await;

    let history = load_history(&pool, "bench-press")
      .await
      .expect("history should load");

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].reps, 10);
    assert_eq!(history[1].weight_kg, 82.5);

    // Unknown exercise: empty history, not an error.
    let empty = load_history(&pool, "squat").await.expect("should load");
    assert!(empty.is_empty());

    crate::test_utils::teardown_test_db(pool).await;
  }
}
