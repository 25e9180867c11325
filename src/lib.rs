//! Matches two monitors to a common resolution and switches a game's display settings
//! to borderless windowed mode spanning both of them.
//!
//! The monitors are driven through `kscreen-doctor`, the settings file is located with
//! `find`. Both steps keep a backup in the working directory so a later revert can put
//! everything back.

mod command;
mod config;
mod display;
mod kscreen;
mod patch;
mod settings;
mod types;

use thiserror::Error;

pub use command::*;
pub use config::*;
pub use display::*;
pub use kscreen::*;
pub use patch::*;
pub use settings::*;
pub use types::*;

/// Error type for a whole run
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Error normalizing the screen resolution")]
    Display(#[from] DisplayError),
    #[error("Error patching the game settings")]
    Settings(#[from] SettingsError),
    #[error("Reverting failed for both the screen modes and the game settings")]
    Revert {
        #[source]
        display: DisplayError,
        settings: SettingsError,
    },
}

/// Formats an error together with all of its sources
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// How a run should behave
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Restore monitors and settings from the backups
    pub revert: bool,
    /// Let a forward run replace backups left behind by an earlier one
    pub force: bool,
}

/// Normalizes the monitors and patches the settings file, or reverts both.
///
/// When reverting, both steps run even if one of them fails, and each keeps its
/// backup until its own restore succeeded.
///
/// Returns the common monitor width after a forward run.
pub fn sync<R: CommandRunner>(
    config: &Config,
    runner: R,
    options: SyncOptions,
) -> Result<Option<u32>, SyncError> {
    let normalizer = DisplayNormalizer::new(
        &runner,
        config.display_tool.as_str(),
        config.screen_mode_backup(),
    )
    .overwrite_backup(options.force);
    let patcher = SettingsPatcher::new(
        &runner,
        config.search_tool.as_str(),
        config.search_base.as_path(),
        config.settings_filename.as_str(),
        config.settings_backup(),
    )
    .overwrite_backup(options.force);

    if options.revert {
        revert(&normalizer, &patcher)?;
        return Ok(None);
    }

    // Neither subsystem may be touched if either backup would be lost
    normalizer.check_backup()?;
    patcher.check_backup()?;

    let width = normalizer.normalize(false)?;
    patcher.patch(width, false)?;

    Ok(width)
}

/// Reverts both subsystems independently of each other.
///
/// A step whose backup is gone was already restored by an earlier revert and is
/// skipped; the run only fails on a missing backup if neither step had one.
fn revert<R: CommandRunner>(
    normalizer: &DisplayNormalizer<R>,
    patcher: &SettingsPatcher<R>,
) -> Result<(), SyncError> {
    let display = normalizer.normalize(true).map(|_| ());
    let settings = patcher.patch(None, true).map(|_| ());

    let nothing_to_revert = matches!(display, Err(DisplayError::BackupMissing(_)))
        && matches!(settings, Err(SettingsError::BackupMissing(_)));

    let display = match display {
        Err(DisplayError::BackupMissing(path)) if !nothing_to_revert => {
            log::warn!("No screen mode backup at {}, skipping", path.display());
            Ok(())
        }
        other => other,
    };
    let settings = match settings {
        Err(SettingsError::BackupMissing(path)) if !nothing_to_revert => {
            log::warn!("No settings backup at {}, skipping", path.display());
            Ok(())
        }
        other => other,
    };

    match (display, settings) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(display), Ok(())) => Err(display.into()),
        (Ok(()), Err(settings)) => Err(settings.into()),
        (Err(display), Err(settings)) => {
            log::error!("Reverting the screen modes failed: {}", error_chain(&display));
            log::error!("Reverting the game settings failed: {}", error_chain(&settings));
            Err(SyncError::Revert { display, settings })
        }
    }
}
