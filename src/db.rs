use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub type DbPool = SqlitePool;

/// Application state holding the database connection pool
pub struct AppState {
  pub db: DbPool,
}

/// Get the path to the database file
/// Stored in the platform data dir, e.g. ~/.local/share/trackgym/trackgym.db
pub fn default_db_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
  let dirs = directories::ProjectDirs::from("", "", "trackgym")
    .ok_or("Failed to resolve data directory")?;

  let data_dir = dirs.data_dir().to_path_buf();
  fs::create_dir_all(&data_dir)?;

  Ok(data_dir.join("trackgym.db"))
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(db_path: &Path) -> Result<DbPool, Box<dyn std::error::Error>> {
  info!("Initializing database at: {}", db_path.display());

  let options = SqliteConnectOptions::new()
    .filename(db_path)
    .create_if_missing(true)
    .foreign_keys(true);

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect_with(options)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Database ready");

  Ok(pool)
}
