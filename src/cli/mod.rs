use clap::{Parser, Subcommand};

pub mod formatters;

#[derive(Parser)]
#[command(name = "houston-tools")]
#[command(
    version,
    about = "Date-range segmentation and Pnl CSV reshaping for houston"
)]
#[command(
    long_about = "Split long date intervals into period-aligned requests and reshape pivoted Pnl CSV exports (aggregate or per-security) into typed tables."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split a date range into period-aligned sub-ranges
    Segment {
        /// Start date (YYYY-MM-DD)
        start: String,

        /// End date (YYYY-MM-DD), inclusive
        end: String,

        /// Period code: A (annual), Q, M, W or D (default from config, else A)
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Read a Pnl CSV (Field,Date,Time,<entities...>) and show it reshaped
    Pnl {
        /// Path to the Pnl CSV file
        file: String,

        /// Only show this field (e.g. Pnl, Return, NetLiquidation)
        #[arg(short, long)]
        field: Option<String>,

        /// Only show this entity (strategy code or SYMBOL(conid))
        #[arg(short, long)]
        entity: Option<String>,

        /// Write the (filtered) table back out as CSV instead of printing it
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show the effective configuration and where it was loaded from
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_segment_with_period() {
        let cli = Cli::parse_from([
            "houston-tools",
            "segment",
            "2019-01-01",
            "2019-06-30",
            "-p",
            "Q",
        ]);
        match cli.command {
            Commands::Segment { start, end, period } => {
                assert_eq!(start, "2019-01-01");
                assert_eq!(end, "2019-06-30");
                assert_eq!(period.as_deref(), Some("Q"));
            }
            _ => panic!("expected segment command"),
        }
    }

    #[test]
    fn parse_pnl_with_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "houston-tools",
            "pnl",
            "results.csv",
            "--field",
            "Pnl",
            "--json",
            "--no-color",
        ]);
        assert!(cli.json);
        assert!(cli.no_color);
        match cli.command {
            Commands::Pnl {
                file,
                field,
                entity,
                output,
            } => {
                assert_eq!(file, "results.csv");
                assert_eq!(field.as_deref(), Some("Pnl"));
                assert!(entity.is_none());
                assert!(output.is_none());
            }
            _ => panic!("expected pnl command"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
