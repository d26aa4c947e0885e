mod application;
mod cli;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;
#[cfg(test)]
mod test_support;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use cli::{Cli, Command};
use infrastructure::config::AppConfig;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::logging::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let pool = create_pool(&config.database_url)
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("failed to run migrations")?;
    info!("database ready");

    cli::run(cli.command.unwrap_or(Command::Serve), config, pool).await
}
