use clap::Parser;
use std::path::PathBuf;

/// Documentation-page clip player demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Clip files to embed in the demo page (gif, webp, apng, png, jpeg)
    #[arg(value_name = "CLIP")]
    pub clips: Vec<PathBuf>,

    /// Load page manifest from JSON file (array of {source, poster?, lazy_load?})
    #[arg(short = 'p', long = "page", value_name = "MANIFEST")]
    pub page: Option<PathBuf>,

    /// Disable lazy loading for all clips (attach everything at startup)
    #[arg(long = "eager")]
    pub eager: bool,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}
