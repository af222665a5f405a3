use anyhow::Context;
use clap::Parser;
use trivia_api::db::{establish_connection, run_migrations};
use trivia_api::server::app::run_server;
use trivia_api::settings::Settings;
use trivia_api::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Overrides TRIVIA_DATABASE_URL
    #[clap(long)]
    database_url: Option<String>,
    /// Overrides TRIVIA_PORT
    #[clap(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(database_url) = cli.database_url {
        settings.database_url = database_url;
    }
    if let Some(port) = cli.port {
        settings.port = port;
    }

    let pool = establish_connection(&settings.database_url)
        .await
        .with_context(|| format!("Cannot connect to {}", settings.database_url))?;

    tracing::info!("Running db migrations...");
    run_migrations(&pool).await?;

    run_server(pool, settings.addr()?).await
}
