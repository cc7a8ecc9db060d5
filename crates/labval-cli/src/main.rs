//! labval CLI
//!
//! Serves the labval API and drives it from the command line.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use labval_cli::cli::{Cli, Command};
use labval_cli::config::LabvalConfig;
use labval_cli::{commands, config_handlers, logging};
use labval_core::Outcome;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config_path = cli.config.as_deref();
    if let Command::Config(action) = cli.command {
        config_handlers::handle_config_command(config_path, action)?;
        return Ok(());
    }

    let config = LabvalConfig::load(config_path)?;
    let client = commands::client(&config, cli.url.as_deref())?;

    match cli.command {
        Command::Serve(args) => commands::serve(&config, args).await?,
        Command::Health => commands::health(&client).await?,
        Command::Algorithms(action) => commands::algorithms(&client, action).await?,
        Command::Workflows(action) => commands::workflows(&client, action).await?,
        Command::Templates(action) => commands::templates(&client, action).await?,
        Command::Catalog(args) => commands::catalog(&client, args).await?,
        Command::Run(args) => {
            let status = commands::run(&client, args).await?;
            let outcome = status.report.map(|r| r.outcome);
            if outcome == Some(Outcome::ExpertRequired) {
                std::process::exit(2);
            }
        }
        Command::Scraper(args) => commands::scraper(&client, args).await?,
        Command::Config(_) => {}
    }
    Ok(())
}
