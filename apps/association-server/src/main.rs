//! Association server
//!
//! Serves the REST API and runs the explicit maintenance operations
//! (migrations, monthly fee generation, overdue sweep).

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use enrollment_service::AssociationApi;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod server;

use config::{AppConfig, LoggingConfig};

#[derive(Parser)]
#[command(name = "association-server")]
#[command(about = "Community association records: activities, enrollments, attendance and fees", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/association.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Create the missing monthly fees of a period
    GenerateFees {
        #[arg(long)]
        month: u32,
        #[arg(long)]
        year: i32,
    },
    /// Mark pending fees due before a date as overdue
    SweepOverdue {
        /// Defaults to today (UTC)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    init_tracing(&config.logging);

    let db = server::connect(&config.database).await?;

    match cli.command {
        Command::Serve => server::serve(config, db).await,
        Command::Migrate => enrollment_service::EnrollmentServiceModule::migrate(&db).await,
        Command::GenerateFees { month, year } => {
            let module = server::init_module(&config, db)?;
            let fees = module.client()?.generate_monthly_fees(month, year).await?;
            println!("created {} fee(s) for {:02}/{}", fees.len(), month, year);
            Ok(())
        }
        Command::SweepOverdue { as_of } => {
            let module = server::init_module(&config, db)?;
            let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
            let swept = module.service()?.fees.sweep_overdue(as_of).await?;
            println!("marked {} fee(s) overdue as of {}", swept, as_of);
            Ok(())
        }
    }
}

fn init_tracing(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
