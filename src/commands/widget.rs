use anyhow::{anyhow, Result};
use clap::Subcommand;

use crate::db::AppState;
use crate::widget;

#[derive(Subcommand)]
pub enum WidgetCommand {
  /// Recompute the snapshot from the database and rewrite the file
  Refresh,

  /// Print the snapshot a widget would read (sample values if absent)
  Show,
}

impl WidgetCommand {
  pub async fn execute(self, state: &AppState) -> Result<()> {
    let path = widget::default_snapshot_path().map_err(|e| anyhow!(e.to_string()))?;

    match self {
      WidgetCommand::Refresh => {
        let snapshot = widget::refresh_snapshot(&state.db, &path).await?;
        println!("Snapshot written to {}", path.display());
        print_snapshot(&snapshot);
        Ok(())
      }
      WidgetCommand::Show => {
        print_snapshot(&widget::read_snapshot(&path));
        Ok(())
      }
    }
  }
}

fn print_snapshot(snapshot: &widget::WidgetSnapshot) {
  println!(
    "Today:   {:.1}P / {:.1}C / {:.1}F, {:.0} kcal",
    snapshot.today.protein_g,
    snapshot.today.carbs_g,
    snapshot.today.fat_g,
    snapshot.today.kcal
  );
  println!(
    "Average: {:.1}P / {:.1}C / {:.1}F, {:.0} kcal",
    snapshot.daily_average.protein_g,
    snapshot.daily_average.carbs_g,
    snapshot.daily_average.fat_g,
    snapshot.daily_average.kcal
  );
}
