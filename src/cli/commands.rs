use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "tasknc",
    about = concat!("tasknc v", env!("CARGO_PKG_VERSION"), " - a terminal viewer for taskwarrior"),
    version
)]
pub struct Cli {
    /// Log level, 0 (warnings only) to 3 (trace)
    #[arg(short = 'l', long = "loglevel", value_parser = clap::value_parser!(u8).range(0..=3))]
    pub loglvl: Option<u8>,

    /// Load the task list, print the task count and exit
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Read configuration from this file instead of the default location
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
}
