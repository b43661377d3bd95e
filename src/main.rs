mod cli;
mod dispatcher;

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use houston_tools::config::Config;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "HOUSTON_TOOLS_LOG";

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    init_logging(&config, cli.verbose);

    if cli.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let json_output = cli.json || config.output.json;
    dispatcher::dispatch_command(cli.command, &config, json_output)
}

/// Log to stderr so table/JSON output on stdout stays clean
fn init_logging(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(&config.log.filter))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
