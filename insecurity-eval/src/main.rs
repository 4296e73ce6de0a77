use anyhow::{Context, Result};
use insecurity_eval::config::Config;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, Clone, StructOpt)]
/// Evaluate insecurity maps of a classifier on its hardest test images
struct Args {
    #[structopt(long, default_value = "insecurity-eval.json5")]
    /// configuration file
    pub config_file: PathBuf,
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    // parse arguments
    let Args { config_file } = Args::from_args();
    let config = Config::open(&config_file)
        .with_context(|| format!("failed to load config file '{}'", config_file.display()))?;

    // start evaluation
    insecurity_eval::start(&config)?;

    Ok(())
}
