mod meal;
mod profile;
mod session;
mod widget;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::db::{self, AppState};
use crate::deeplink;
use crate::llm::{ClaudeGenerator, NullGenerator};

pub use meal::MealCommand;
pub use profile::ProfileCommand;
pub use session::SessionCommand;
pub use widget::WidgetCommand;

#[derive(Parser)]
#[command(name = "trackgym")]
#[command(about = "Local-first gym and nutrition tracker", long_about = None)]
#[command(version)]
pub struct Cli {
  #[command(subcommand)]
  command: Commands,

  /// Path to the sqlite database (defaults to the platform data dir)
  #[arg(long, global = true, env = "TRACKGYM_DB")]
  db: Option<PathBuf>,

  /// Skip the text-generation service and use rule-based fallbacks only
  #[arg(long, global = true)]
  offline: bool,
}

#[derive(Subcommand)]
enum Commands {
  /// Manage workout sessions
  #[command(subcommand)]
  Session(SessionCommand),

  /// Log meals and export them to the health store
  #[command(subcommand)]
  Meal(MealCommand),

  /// Show or edit the profile
  #[command(subcommand)]
  Profile(ProfileCommand),

  /// Inspect or refresh the widget snapshot
  #[command(subcommand)]
  Widget(WidgetCommand),

  /// Resolve a trackgym:// deep link and show its session
  Open { url: String },
}

impl Cli {
  pub async fn execute(self) -> Result<()> {
    let db_path = match self.db {
      Some(path) => path,
      None => db::default_db_path().map_err(|e| anyhow!(e.to_string()))?,
    };
    let pool = db::initialize_db(&db_path)
      .await
      .map_err(|e| anyhow!("Failed to open database: {}", e))?;
    let state = AppState { db: pool };

    // Offline mode swaps the generator for one that is never available, so
    // every caller takes its deterministic fallback path.
    match self.command {
      Commands::Session(cmd) => {
        if self.offline {
          cmd.execute(&state, &NullGenerator).await
        } else {
          cmd.execute(&state, &ClaudeGenerator::from_env()).await
        }
      }
      Commands::Meal(cmd) => cmd.execute(&state).await,
      Commands::Profile(cmd) => cmd.execute(&state).await,
      Commands::Widget(cmd) => cmd.execute(&state).await,
      Commands::Open { url } => match deeplink::parse_session_link(&url) {
        Some(session_id) => session::show(&state, session_id).await,
        None => {
          println!("Not a trackgym session link: {}", url);
          Ok(())
        }
      },
    }
  }
}
