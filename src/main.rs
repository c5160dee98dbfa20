mod alert;
mod chart;
mod config;
mod error;
mod indicator;
mod model;
mod notifier;
mod pipeline;
mod provider;
mod strategy;

use std::path::PathBuf;

use clap::Parser;
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

use chart::PngChartRenderer;
use config::{AppConfig, MailCredentials};
use notifier::Notifier;
use notifier::email::EmailNotifier;
use notifier::terminal::TerminalNotifier;
use provider::yahoo::YahooFinance;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("price provider error")]
    Provider,
    #[display("mail transport error")]
    Mail,
    #[display("runtime error")]
    Runtime,
}

#[derive(Parser)]
#[command(
    name = "swing-notifier",
    about = "Daily RSI(5)/SMA(50) swing-entry alert for a single equity"
)]
struct Cli {
    /// Path to the TOML configuration file (optional when left at the default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log the alert instead of sending email; no SMTP credentials needed
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let (path, required) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };
    let config = config::load(&path, required).change_context(AppError::Config)?;

    init_tracing(&config);

    let notifier = build_notifier(&config, cli.dry_run)?;
    let provider = YahooFinance::new(&config.market.base_url).change_context(AppError::Provider)?;
    let renderer = PngChartRenderer::new(&config.general.chart_dir);

    let outcome = pipeline::check_symbol(
        &config.market.symbol,
        &config.market.range,
        &provider,
        &renderer,
        notifier.as_ref(),
    )
    .await
    .change_context(AppError::Runtime)?;

    info!(symbol = %config.market.symbol, outcome = ?outcome, "run complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}

fn build_notifier(
    config: &AppConfig,
    dry_run: bool,
) -> Result<Box<dyn Notifier>, Report<AppError>> {
    if dry_run {
        info!("dry run: alerts are logged, not emailed");
        return Ok(Box::new(TerminalNotifier));
    }

    config::validate_delivery(config).change_context(AppError::Config)?;
    let credentials = MailCredentials::from_env().change_context(AppError::Config)?;
    let email = EmailNotifier::new(&config.mail, credentials).change_context(AppError::Mail)?;
    Ok(Box::new(email))
}
