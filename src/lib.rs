pub mod error;
pub mod config;
pub mod stat_tables;
pub mod log_reader;
pub mod analysis_types;
pub mod match_processor;
pub mod aggregator;
pub mod metric_selector;
pub mod ranker;
pub mod report;
pub mod pipeline;
