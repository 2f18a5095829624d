use clap::Parser;
use tracing_subscriber::EnvFilter;

use trackgym::commands::Cli;

fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .with_target(false)
    .init();

  let cli = Cli::parse();

  tokio::runtime::Builder::new_multi_thread()
    .enable_all()
    .build()?
    .block_on(cli.execute())
}
