use anyhow::Result;
use clap::Subcommand;

use crate::db::AppState;
use crate::nutrition::{self, ProfileUpdate};
use crate::suggestion::Goal;

#[derive(Subcommand)]
pub enum ProfileCommand {
  /// Show the profile
  Show,

  /// Update profile fields (only the flags you pass change)
  Set {
    #[arg(long)]
    age: Option<i64>,
    #[arg(long)]
    weight_kg: Option<f64>,
    #[arg(long)]
    height_cm: Option<f64>,
    #[arg(long)]
    chest_cm: Option<f64>,
    #[arg(long)]
    waist_cm: Option<f64>,
    #[arg(long)]
    hip_cm: Option<f64>,
    #[arg(long)]
    activity_level: Option<String>,
    #[arg(long)]
    goal: Option<String>,
    #[arg(long)]
    dietary_restrictions: Option<String>,
  },
}

impl ProfileCommand {
  pub async fn execute(self, state: &AppState) -> Result<()> {
    match self {
      ProfileCommand::Show => {
        let profile = nutrition::get_profile(&state.db).await?;
        print_field("Age", profile.age.map(|v| v.to_string()));
        print_field("Weight", profile.weight_kg.map(|v| format!("{:.1} kg", v)));
        print_field("Height", profile.height_cm.map(|v| format!("{:.0} cm", v)));
        print_field("Chest", profile.chest_cm.map(|v| format!("{:.0} cm", v)));
        print_field("Waist", profile.waist_cm.map(|v| format!("{:.0} cm", v)));
        print_field("Hip", profile.hip_cm.map(|v| format!("{:.0} cm", v)));
        println!("Activity:     {}", profile.activity_level);
        println!(
          "Goal:         {} (training as {:?})",
          profile.goal,
          Goal::from_keywords(&profile.goal)
        );
        print_field("Restrictions", profile.dietary_restrictions);
        Ok(())
      }

      ProfileCommand::Set {
        age,
        weight_kg,
        height_cm,
        chest_cm,
        waist_cm,
        hip_cm,
        activity_level,
        goal,
        dietary_restrictions,
      } => {
        let profile = nutrition::update_profile(
          &state.db,
          &ProfileUpdate {
            age,
            weight_kg,
            height_cm,
            chest_cm,
            waist_cm,
            hip_cm,
            activity_level,
            goal,
            dietary_restrictions,
          },
        )
        .await?;
        println!(
          "Profile updated (goal: {}, training as {:?})",
          profile.goal,
          Goal::from_keywords(&profile.goal)
        );
        Ok(())
      }
    }
  }
}

fn print_field(label: &str, value: Option<String>) {
  println!("{:<13} {}", format!("{}:", label), value.unwrap_or_else(|| "-".to_string()));
}
