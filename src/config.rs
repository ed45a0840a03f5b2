use crate::error::{Result, StatsError};
use crate::log_reader::{DEFAULT_API_URL, LogId};
use crate::metric_selector::Normalization;
use crate::stat_tables::Metric;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Bar chart markup
    Barchart,
    /// Pretty printed json
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "logs-stats", version)]
#[command(about = "Average per-player stats across logs.tf match logs and chart them")]
pub struct Args {
    /// Log urls or ids (comma-separated)
    #[arg(long, default_value = "")]
    pub urls: String,

    /// Stat to rank players by: kills, dmg, dapm or as
    #[arg(long, default_value = "")]
    pub stat: String,

    /// Base url the log id is appended to
    #[arg(long, env = "LOGS_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Read `<id>.json` files from this directory instead of fetching
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Barchart)]
    pub format: OutputFormat,

    /// Report raw totals instead of per-match averages
    #[arg(long)]
    pub totals: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,
}

pub enum Source {
    Http { api_url: String, timeout: Duration },
    Directory(PathBuf),
}

pub struct Config {
    pub log_ids: Vec<LogId>,
    pub metric: Metric,
    pub source: Source,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub normalization: Normalization,
}

/// Checks the arguments before anything is fetched.
pub fn parse_config(args: Args) -> Result<Config> {
    if args.urls.trim().is_empty() {
        return Err(StatsError::EmptyInput("urls"));
    }
    if args.stat.trim().is_empty() {
        return Err(StatsError::EmptyInput("stat"));
    }
    let metric: Metric = args.stat.parse()?;

    let log_ids = args
        .urls
        .split(',')
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(str::parse::<LogId>)
        .collect::<Result<Vec<_>>>()?;
    if log_ids.is_empty() {
        return Err(StatsError::EmptyInput("urls"));
    }

    let source = match args.dir {
        Some(dir) => Source::Directory(dir),
        None => Source::Http {
            api_url: args.api_url,
            timeout: Duration::from_secs(args.timeout_secs),
        },
    };
    let normalization = if args.totals {
        Normalization::Total
    } else {
        Normalization::Average
    };

    Ok(Config {
        log_ids,
        metric,
        source,
        output: args.output,
        format: args.format,
        normalization,
    })
}
