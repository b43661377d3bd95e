//! Command dispatcher that routes parsed clap commands to the library and
//! prints their results.

use std::fs::File;
use std::io::BufWriter;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use houston_tools::config::{self, Config};
use houston_tools::dates::{parse_date, segment, PeriodCode};
use houston_tools::pnl::{read_pnl_csv, write_pnl_csv};
use tracing::info;

use crate::cli::{formatters, Commands};

/// Route a parsed command to its handler
pub fn dispatch_command(command: Commands, config: &Config, json_output: bool) -> Result<()> {
    match command {
        Commands::Segment { start, end, period } => {
            dispatch_segment(&start, &end, period.as_deref(), config, json_output)
        }
        Commands::Pnl {
            file,
            field,
            entity,
            output,
        } => dispatch_pnl(
            &file,
            field.as_deref(),
            entity.as_deref(),
            output.as_deref(),
            json_output,
        ),
        Commands::Config => dispatch_config(config, json_output),
    }
}

fn dispatch_segment(
    start: &str,
    end: &str,
    period: Option<&str>,
    config: &Config,
    json_output: bool,
) -> Result<()> {
    let period: PeriodCode = match period {
        Some(code) => code.parse()?,
        None => config.default_period()?,
    };
    let start = parse_date(start).context("Invalid start date")?;
    let end = parse_date(end).context("Invalid end date")?;

    info!("Segmenting {}..={} by {}", start, end, period);
    let ranges = segment(start, end, period)?;

    if json_output {
        println!("{}", formatters::format_segments_json(&ranges));
    } else {
        print!(
            "{}",
            formatters::format_segments_table(&ranges, period.as_str())
        );
    }
    Ok(())
}

fn dispatch_pnl(
    file: &str,
    field: Option<&str>,
    entity: Option<&str>,
    output: Option<&str>,
    json_output: bool,
) -> Result<()> {
    let table = read_pnl_csv(file).with_context(|| format!("Failed to load Pnl CSV {}", file))?;

    if let Some(e) = entity {
        let entities = table.entities();
        if !entities.contains(&e) {
            bail!(
                "Unknown entity '{}'. Available: {}",
                e,
                if entities.is_empty() {
                    "(none)".to_string()
                } else {
                    entities.join(", ")
                }
            );
        }
    }

    let table = table.filter(field, entity);

    if let Some(path) = output {
        let out = File::create(path).with_context(|| format!("Failed to create {}", path))?;
        write_pnl_csv(&table, BufWriter::new(out))
            .with_context(|| format!("Failed to write Pnl CSV {}", path))?;
        if !json_output {
            println!(
                "{} Wrote {} rows to {}",
                "✓".green().bold(),
                table.keys().len(),
                path
            );
        }
        return Ok(());
    }

    if json_output {
        println!("{}", formatters::format_pnl_json(&table));
    } else if table.is_empty() {
        print!("{}", formatters::format_empty_pnl());
    } else {
        print!("{}", formatters::format_pnl_table(&table));
    }
    Ok(())
}

fn dispatch_config(config: &Config, json_output: bool) -> Result<()> {
    let path = config::config_path();

    if json_output {
        let doc = serde_json::json!({
            "path": path.as_ref().map(|p| p.display().to_string()),
            "loaded": path.as_ref().is_some_and(|p| p.exists()),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    match &path {
        Some(p) if p.exists() => println!("{} {}", "Config file:".bold(), p.display()),
        Some(p) => println!(
            "{} {} (not found, using defaults)",
            "Config file:".bold(),
            p.display()
        ),
        None => println!("{} (no config directory, using defaults)", "Config file:".bold()),
    }
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}
