use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use super::logging::LogDestination;

/// Page through a JSON list endpoint and print every item as a JSON line.
#[derive(Parser, Debug)]
#[command(name = "listkit")]
#[command(version)]
pub struct Args {
    /// Path to the RON configuration file
    #[arg(short, long, default_value = "listkit.ron")]
    pub config: PathBuf,

    /// Search for this keyword instead of listing everything
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Stop after this many pages
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_pages: Option<u32>,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogArg::Terminal)]
    pub log: LogArg,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogArg {
    Terminal,
    File,
    Both,
}

impl From<LogArg> for LogDestination {
    fn from(arg: LogArg) -> Self {
        match arg {
            LogArg::Terminal => LogDestination::Terminal,
            LogArg::File => LogDestination::File,
            LogArg::Both => LogDestination::Both,
        }
    }
}
