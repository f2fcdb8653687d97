use anyhow::{Context, Result};
use sqlc_gen_queries::{catalog::load_catalog, cli::Cli, config::load_config, Generator};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse_args();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = format!("{:#}", err);
            error!(error = %message, "The generator has encountered a fatal error");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let start = Instant::now();

    let config = load_config(&cli.config_file)
        .with_context(|| format!("Failed to load config {:?}", cli.config_file))?;
    let catalog = load_catalog(&cli.catalog_file)
        .with_context(|| format!("Failed to load catalog {:?}", cli.catalog_file))?;

    let generator = Generator::new(config, catalog);
    let written = generator.generate().context("Failed to generate queries")?;

    info!(
        files = written.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Generated query files"
    );

    Ok(())
}
