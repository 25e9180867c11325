//! The CLI interface for rlds
//!
//! Run without flags to normalize the monitors and patch the game settings, and with
//! `--revert` to undo both.
use color_eyre::eyre::Result;
use rlds::{Config, SyncOptions, SystemRunner, sync};
use structopt::StructOpt;

/// CLI arguments
#[derive(StructOpt, Debug)]
#[structopt(
    name = "rlds",
    about = "Matches both monitors to the smaller resolution and sets up the game for borderless play."
)]
struct Opts {
    /// Restore the original screen modes and game settings
    #[structopt(short, long)]
    revert: bool,
    /// Overwrite backups left behind by a previous run
    #[structopt(short, long)]
    force: bool,
    /// Output debug info
    #[structopt(short, long)]
    verbose: bool,
}

/// Entry point for `rlds`.
fn main() -> Result<()> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    let log_level = if opts.verbose {
        log::LevelFilter::Trace
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.as_str()),
    )
    .init();

    log::debug!("Parsed Opts:\n{:#?}", opts);

    let config = Config::from_env();
    log::debug!("Configuration:\n{:#?}", config);

    let options = SyncOptions {
        revert: opts.revert,
        force: opts.force,
    };

    match sync(&config, SystemRunner, options)? {
        Some(width) => log::info!("Game settings patched for a monitor width of {}", width),
        None => log::info!("Screen modes and game settings restored"),
    }

    Ok(())
}
