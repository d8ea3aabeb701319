//! Point d'entrée CLI pour metsainfo

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod config;
mod fetch;
mod ingest;
mod report;
mod session;

use cli::Commands;

/// Statistiques forestières par parcelle cadastrale
#[derive(Parser)]
#[command(name = "metsainfo")]
#[command(author, version)]
#[command(about = "Statistiques forestières par parcelle cadastrale (données ouvertes finlandaises)")]
#[command(
    long_about = "Apparie les peuplements forestiers Metsäkeskus aux parcelles cadastrales MML et en calcule des statistiques de synthèse : surfaces, volumes, essences, recommandations de coupe."
)]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Summary {
            stands,
            parcels,
            reference,
            json,
            config,
        } => {
            info!(stands = %stands.display(), reference = ?reference, "Computing summary");
            cli::cmd_summary(
                &stands,
                parcels.as_deref(),
                reference.as_deref(),
                json.as_deref(),
                config.as_deref(),
            )
            .await?;
        }
        Commands::CheckReference { reference } => {
            cli::cmd_check_reference(&reference)?;
        }
        Commands::WfsUrls {
            point,
            reference,
            config,
        } => {
            cli::cmd_wfs_urls(point.as_deref(), reference.as_deref(), config.as_deref())?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
