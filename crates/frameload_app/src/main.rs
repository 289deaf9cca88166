mod cli;
mod config;
mod report;
mod session;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use frameload_core::{FrameLoader, OpenOptions, Outcome};
use frameload_engine::EngineHandle;
use frameload_logging::loader_info;

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::session::Session;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    frameload_logging::initialize(cli.log, cli.log_level);

    let mut config = match &cli.config {
        Some(path) => config::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(limit) = cli.limit {
        config.request_limit = limit;
    }

    let loader = FrameLoader::new(config.loader_config());
    let engine = EngineHandle::new(config.fetch_settings());
    let options = if cli.reload {
        OpenOptions::reload()
    } else {
        OpenOptions::default()
    };

    let mut session = Session::new(loader, engine, std::io::stdout().lock());
    let outcome = session
        .run(&cli.url, options, Duration::from_secs(cli.timeout))
        .with_context(|| format!("loading {}", cli.url))?;
    loader_info!("{} finished: {:?}", cli.url, outcome);

    Ok(match outcome {
        Outcome::Completed => ExitCode::SUCCESS,
        Outcome::Canceled => ExitCode::from(2),
    })
}
