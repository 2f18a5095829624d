//! Deterministic nutrition and session math.
//!
//! Everything here is computed from plain values; the text-generation layer
//! interprets these numbers rather than doing arithmetic itself.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::FoodSeed;

/// ---------------------------------------------------------------------------
/// Macro totals
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTotals {
  pub protein_g: f64,
  pub carbs_g: f64,
  pub fat_g: f64,
  pub kcal: f64,
}

impl MacroTotals {
  /// Totals for `grams` of a catalog food (density is per 100 g).
  pub fn from_food(food: &FoodSeed, grams: f64) -> Self {
    let factor = grams / 100.0;
    Self {
      protein_g: food.protein_g * factor,
      carbs_g: food.carbs_g * factor,
      fat_g: food.fat_g * factor,
      kcal: food.kcal * factor,
    }
  }

  pub fn add(&mut self, other: MacroTotals) {
    self.protein_g += other.protein_g;
    self.carbs_g += other.carbs_g;
    self.fat_g += other.fat_g;
    self.kcal += other.kcal;
  }

  pub fn sum(items: impl IntoIterator<Item = MacroTotals>) -> Self {
    let mut total = Self::default();
    for item in items {
      total.add(item);
    }
    total
  }

  pub fn is_empty(&self) -> bool {
    self.kcal == 0.0 && self.protein_g == 0.0 && self.carbs_g == 0.0 && self.fat_g == 0.0
  }
}

/// ---------------------------------------------------------------------------
/// Day grouping
/// ---------------------------------------------------------------------------

/// Group (date, totals) pairs into per-day sums, newest day first.
pub fn group_by_day(items: impl IntoIterator<Item = (NaiveDate, MacroTotals)>) -> Vec<(NaiveDate, MacroTotals)> {
  let mut days: Vec<(NaiveDate, MacroTotals)> = Vec::new();
  for (date, totals) in items {
    match days.iter_mut().find(|(d, _)| *d == date) {
      Some((_, existing)) => existing.add(totals),
      None => days.push((date, totals)),
    }
  }
  days.sort_by(|a, b| b.0.cmp(&a.0));
  days
}

/// Average daily totals over the days that have entries.
pub fn daily_average(days: &[(NaiveDate, MacroTotals)]) -> Option<MacroTotals> {
  if days.is_empty() {
    return None;
  }
  let mut total = MacroTotals::sum(days.iter().map(|(_, t)| *t));
  let n = days.len() as f64;
  total.protein_g /= n;
  total.carbs_g /= n;
  total.fat_g /= n;
  total.kcal /= n;
  Some(total)
}

/// ---------------------------------------------------------------------------
/// Duration formatting
/// ---------------------------------------------------------------------------

pub fn format_duration(seconds: i64) -> String {
  if seconds < 60 {
    return format!("{}s", seconds.max(0));
  }
  let minutes = seconds / 60;
  if minutes < 60 {
    return format!("{}m", minutes);
  }
  format!("{}h {}m", minutes / 60, minutes % 60)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog;

  #[test]
  fn test_macro_totals_from_food_hand_computed() {
    // 200 g of hake (22.5P/0C/1.5F/104kcal per 100 g)
    let hake = catalog::food("hake").unwrap();
    let totals = MacroTotals::from_food(hake, 200.0);
    assert_eq!(totals.protein_g, 45.0);
    assert_eq!(totals.carbs_g, 0.0);
    assert_eq!(totals.fat_g, 3.0);
    assert_eq!(totals.kcal, 208.0);
  }

  #[test]
  fn test_day_total_is_sum_of_entries() {
    let hake = catalog::food("hake").unwrap();
    let rice = catalog::food("white-rice").unwrap();
    let total = MacroTotals::sum([
      MacroTotals::from_food(hake, 200.0),
      MacroTotals::from_food(rice, 150.0),
    ]);
    assert!((total.protein_g - (45.0 + 4.05)).abs() < 1e-9);
    assert!((total.kcal - (208.0 + 195.0)).abs() < 1e-9);
  }

  #[test]
  fn test_group_by_day_merges_and_sorts() {
    let d1 = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let d2 = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
    let one = MacroTotals { protein_g: 10.0, carbs_g: 0.0, fat_g: 0.0, kcal: 40.0 };

    let days = group_by_day([(d1, one), (d2, one), (d1, one)]);
    assert_eq!(days.len(), 2);
    // Newest first
    assert_eq!(days[0].0, d2);
    assert_eq!(days[1].1.protein_g, 20.0);
  }

  #[test]
  fn test_daily_average() {
    let d1 = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let d2 = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
    let days = vec![
      (d1, MacroTotals { protein_g: 100.0, carbs_g: 200.0, fat_g: 50.0, kcal: 1650.0 }),
      (d2, MacroTotals { protein_g: 140.0, carbs_g: 100.0, fat_g: 70.0, kcal: 1590.0 }),
    ];
    let avg = daily_average(&days).unwrap();
    assert_eq!(avg.protein_g, 120.0);
    assert_eq!(avg.kcal, 1620.0);
    assert!(daily_average(&[]).is_none());
  }

  #[test]
  fn test_format_duration() {
    assert_eq!(format_duration(30), "30s");
    assert_eq!(format_duration(45 * 60), "45m");
    assert_eq!(format_duration(83 * 60), "1h 23m");
  }
}
