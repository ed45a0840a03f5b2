use anyhow::{Context, Result};
use clap::Parser;
use logs_stats::config::{Args, parse_config};
use logs_stats::pipeline::run;

fn main() -> Result<()> {
    env_logger::init();
    let config = parse_config(Args::parse()).context("invalid arguments")?;
    run(&config).context("could not build report")
}
