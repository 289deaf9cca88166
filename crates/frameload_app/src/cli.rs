use std::path::PathBuf;

use clap::Parser;
use frameload_logging::LogDestination;
use log::LevelFilter;

/// Loads a page with all of its frames and inline images, printing progress.
#[derive(Parser, Debug)]
#[command(name = "frameload")]
#[command(version)]
pub(crate) struct Cli {
    /// Absolute URL of the page to load
    pub url: String,

    /// RON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Concurrent secondary requests per frame (overrides the configuration)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Bypass caches
    #[arg(long)]
    pub reload: bool,

    /// Where log output goes: terminal, file or both
    #[arg(long, default_value = "terminal")]
    pub log: LogDestination,

    /// Most verbose level logged: off, error, warn, info, debug or trace
    #[arg(long, default_value = "warn", value_parser = parse_level)]
    pub log_level: LevelFilter,

    /// Give up and stop the load after this many seconds
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,
}

fn parse_level(value: &str) -> Result<LevelFilter, String> {
    value
        .parse()
        .map_err(|_| format!("unknown log level `{value}`"))
}
