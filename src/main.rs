use anyhow::Result;
use clap::Parser;
use colored::*;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use portprobe::cli::Cli;
use portprobe::config::Config;
use portprobe::output::OutputWriter;
use portprobe::PortScanner;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.debug);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Could not load configuration ({e}), using defaults");
            Config::default()
        }),
    };
    cli.apply_to(&mut config);
    config.validate()?;

    if !config.output.color_enabled {
        colored::control::set_override(false);
    }

    let scanner = PortScanner::from_config(&config);

    let summary = match scanner.run(&cli.target, &cli.port_range()).await {
        Ok(summary) => summary,
        Err(e) => {
            println!("{}", e.to_string().red().bold());
            std::process::exit(1);
        }
    };

    let output_writer = OutputWriter::new(
        cli.output_format,
        cli.output_file.clone(),
        config.output.color_enabled,
    );
    output_writer.write(&summary, cli.verbose, scanner.services())?;

    Ok(())
}

/// Log to stderr so stdout only carries scan results.
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
