use core::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::command::{CommandError, CommandRunner};
use crate::kscreen::{self, Mode, Monitor, ParseMonitorError};

/// File name of the screen mode backup
pub const SCREEN_MODE_BACKUP: &str = "screen_mode.bkp";

/// Error type for the display module
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Error when running the display tool")]
    Command(#[from] CommandError),
    #[error("Error parsing the display tool output")]
    Parse(#[from] ParseMonitorError),
    #[error("Found {found} monitors. Please have one or two monitors connected.")]
    Topology { found: usize },
    #[error("Output {output} has no active mode")]
    NoActiveMode { output: u32 },
    #[error("Screen mode backup {} already exists; revert first or force the run", .0.display())]
    BackupExists(PathBuf),
    #[error("No screen mode backup found at {}", .0.display())]
    BackupMissing(PathBuf),
    #[error("Invalid screen mode backup line {line}: `{content}`")]
    InvalidBackup { line: usize, content: String },
    #[error("Error accessing the screen mode backup {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

type Result<T = ()> = std::result::Result<T, DisplayError>;

/// The output id and mode id every monitor had before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenModeBackup {
    pub entries: Vec<(u32, u32)>,
}

impl ScreenModeBackup {
    /// Reads a backup written by [`ScreenModeBackup::write`]
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                DisplayError::BackupMissing(path.to_path_buf())
            } else {
                DisplayError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        content.parse()
    }

    /// Writes one `<output>,<mode>` line per monitor
    pub fn write(&self, path: &Path) -> Result {
        fs::write(path, self.to_string()).map_err(|source| DisplayError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Arguments that put every output back into its recorded mode in one call
    pub fn restore_args(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(output, mode)| format!("output.{}.mode.{}", output, mode))
            .collect()
    }
}

impl fmt::Display for ScreenModeBackup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (output, mode) in &self.entries {
            writeln!(f, "{},{}", output, mode)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for ScreenModeBackup {
    type Err = DisplayError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut entries = Vec::new();
        for (index, line) in s.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let invalid = || DisplayError::InvalidBackup {
                line: index + 1,
                content: line.to_string(),
            };
            let (output, mode) = line.split_once(',').ok_or_else(invalid)?;
            let output: u32 = output.trim().parse().map_err(|_| invalid())?;
            let mode: u32 = mode.trim().parse().map_err(|_| invalid())?;
            entries.push((output, mode));
        }
        Ok(Self { entries })
    }
}

/// A mode change the normalizer decided on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeChange {
    /// The output that gets resized
    pub output: u32,
    /// The mode it is switched to, named as the smaller monitor lists it
    pub mode: Mode,
}

impl ModeChange {
    pub fn arg(&self) -> String {
        format!("output.{}.mode.{}", self.output, self.mode)
    }
}

/// Outcome of reconciling the active modes of the connected monitors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Width both monitors end up with
    pub width: u32,
    /// The change to issue, if the monitors differ
    pub change: Option<ModeChange>,
}

/// Picks the common resolution for one or two monitors.
///
/// The monitor with the larger pixel area is switched to the exact mode of the
/// smaller one; neither monitor ever grows. On equal areas the second monitor is
/// resized to match the first.
pub fn reconcile(monitors: &[Monitor]) -> Result<Reconciliation> {
    let active = monitors
        .iter()
        .map(|m| {
            m.active_mode()
                .map(|mode| (m.output, mode))
                .ok_or(DisplayError::NoActiveMode { output: m.output })
        })
        .collect::<Result<Vec<_>>>()?;

    match active.as_slice() {
        [(_, only)] => Ok(Reconciliation {
            width: only.descriptor.width(),
            change: None,
        }),
        [(first_output, first), (second_output, second)] => {
            if first.descriptor.resolution == second.descriptor.resolution {
                return Ok(Reconciliation {
                    width: first.descriptor.width(),
                    change: None,
                });
            }

            let (target, smaller) = if second.descriptor.resolution.area()
                < first.descriptor.resolution.area()
            {
                (*first_output, second)
            } else {
                (*second_output, first)
            };

            Ok(Reconciliation {
                width: smaller.descriptor.width(),
                change: Some(ModeChange {
                    output: target,
                    mode: (*smaller).clone(),
                }),
            })
        }
        _ => Err(DisplayError::Topology {
            found: monitors.len(),
        }),
    }
}

/// Brings the connected monitors to a common resolution using `kscreen-doctor`
pub struct DisplayNormalizer<R> {
    runner: R,
    tool: String,
    backup_path: PathBuf,
    overwrite_backup: bool,
}

impl<R: CommandRunner> DisplayNormalizer<R> {
    pub fn new(runner: R, tool: impl Into<String>, backup_path: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            tool: tool.into(),
            backup_path: backup_path.into(),
            overwrite_backup: false,
        }
    }

    /// Allows a forward run to replace an existing backup
    pub fn overwrite_backup(mut self, overwrite: bool) -> Self {
        self.overwrite_backup = overwrite;
        self
    }

    /// Fails if a forward run would replace the backup of an earlier run.
    ///
    /// [`DisplayNormalizer::normalize`] enforces this on its own, so the normalizer is
    /// safe to use without a preceding check.
    pub fn check_backup(&self) -> Result {
        if !self.overwrite_backup && self.backup_path.exists() {
            return Err(DisplayError::BackupExists(self.backup_path.clone()));
        }
        Ok(())
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Normalizes the monitors, or restores the modes from the backup if `revert` is set.
    ///
    /// Returns the common width after a forward run and `None` after a revert.
    pub fn normalize(&self, revert: bool) -> Result<Option<u32>> {
        if revert {
            self.revert()?;
            return Ok(None);
        }
        self.apply().map(Some)
    }

    /// Queries the connected monitors
    pub fn query_monitors(&self) -> Result<Vec<Monitor>> {
        let raw = self.runner.run(&self.tool, &["--outputs".to_string()])?;
        let text = kscreen::strip_ansi(&raw);

        let sections = kscreen::split_outputs(&text);
        if sections.is_empty() || sections.len() > 2 {
            return Err(DisplayError::Topology {
                found: sections.len(),
            });
        }

        let monitors = sections
            .iter()
            .map(|section| kscreen::parse_monitor(section))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for monitor in &monitors {
            log::debug!("Discovered {}", monitor);
        }
        Ok(monitors)
    }

    fn apply(&self) -> Result<u32> {
        self.check_backup()?;
        let monitors = self.query_monitors()?;

        // Fails on a missing active mode before anything is written
        let reconciliation = reconcile(&monitors)?;

        let backup = ScreenModeBackup {
            entries: monitors
                .iter()
                .filter_map(|m| m.selected_mode.map(|mode| (m.output, mode)))
                .collect(),
        };
        backup.write(&self.backup_path)?;
        log::info!("Saved current screen modes to {}", self.backup_path.display());

        match reconciliation.change {
            None => {
                log::info!(
                    "Monitors already share a resolution, width {}",
                    reconciliation.width
                );
            }
            Some(change) => {
                log::info!("Switching output {} to {}", change.output, change.mode);
                self.runner.run(&self.tool, &[change.arg()])?;
            }
        }

        Ok(reconciliation.width)
    }

    /// Restores the recorded modes; the backup is only removed once the display tool
    /// accepted them
    fn revert(&self) -> Result {
        log::info!("Reverting monitors to original modes");
        let backup = ScreenModeBackup::read(&self.backup_path)?;
        let args = backup.restore_args();
        if args.is_empty() {
            log::warn!("Screen mode backup {} is empty", self.backup_path.display());
        } else {
            self.runner.run(&self.tool, &args)?;
        }

        fs::remove_file(&self.backup_path).map_err(|source| DisplayError::Io {
            path: self.backup_path.clone(),
            source,
        })?;
        Ok(())
    }
}
