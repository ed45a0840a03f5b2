use crate::aggregator::Aggregator;
use crate::analysis_types::Category;
use crate::config::{Config, OutputFormat, Source};
use crate::error::{Result, StatsError};
use crate::log_reader::{FileLogSource, HttpLogSource, LogId, LogSource, fetch_all};
use crate::match_processor::process_match;
use crate::metric_selector::{Normalization, select};
use crate::report::{BarChartRenderer, JsonRenderer, Renderer};
use crate::stat_tables::{Metric, StatTables};
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Fetches every log, then folds and ranks them. Nothing is aggregated until
/// all logs have been fetched successfully.
pub fn build_report<S: LogSource + ?Sized>(
    source: &S,
    log_ids: &[LogId],
    metric: Metric,
    normalization: Normalization,
    tables: &StatTables,
) -> Result<Vec<Category>> {
    let match_logs = fetch_all(source, log_ids)?;
    info!("Aggregating {} over {} logs", metric.key(), match_logs.len());

    let mut aggregator = Aggregator::new(metric);
    for (_log_id, match_log) in match_logs.iter() {
        aggregator.add_match(&process_match(match_log, metric, tables));
    }
    Ok(select(&aggregator, tables, normalization))
}

pub fn renderer(format: OutputFormat) -> Box<dyn Renderer> {
    match format {
        OutputFormat::Barchart => Box::new(BarChartRenderer),
        OutputFormat::Json => Box::new(JsonRenderer),
    }
}

/// Runs the whole report for a parsed config and writes it out.
pub fn run(config: &Config) -> Result<()> {
    let tables = StatTables::new();
    let source: Box<dyn LogSource> = match &config.source {
        Source::Http { api_url, timeout } => {
            Box::new(HttpLogSource::new(api_url.clone(), *timeout)?)
        }
        Source::Directory(dir) => Box::new(FileLogSource::new(dir.clone())),
    };

    let categories = build_report(
        source.as_ref(),
        &config.log_ids,
        config.metric,
        config.normalization,
        &tables,
    )?;

    let renderer = renderer(config.format);
    match &config.output {
        Some(path) => {
            let io_err = |source| StatsError::Io {
                path: path.display().to_string(),
                source,
            };
            let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
            renderer
                .render(&categories, &mut writer)
                .and_then(|_| writer.flush())
                .map_err(io_err)
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            renderer.render(&categories, &mut handle).map_err(|source| StatsError::Io {
                path: "stdout".to_string(),
                source,
            })
        }
    }
}
