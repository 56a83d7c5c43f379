use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "inmet-pipeline")]
#[command(about = "Historical weather-station archive acquisition and consolidation")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short,
        long,
        global = true,
        help = "Settings file [default: pipeline.toml in the working directory]"
    )]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download station archives and extract both archive families
    Acquire,

    /// Consolidate extracted station files into per-year tables
    Consolidate {
        #[arg(
            long,
            value_delimiter = ',',
            help = "Years to process [default: every pending year in the configured range]"
        )]
        years: Option<Vec<u16>>,

        #[arg(
            short = 'y',
            long,
            default_value = "false",
            help = "Process pending years without asking per year"
        )]
        assume_yes: bool,
    },
}
