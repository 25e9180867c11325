use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::command::{CommandError, CommandRunner};
use crate::patch::{self, LineChange};

/// Error type for the settings module
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Error when running the search tool")]
    Command(#[from] CommandError),
    #[error("{filename} not found in {}", .base.display())]
    NotFound { filename: String, base: PathBuf },
    #[error("Settings backup {} already exists; revert first or force the run", .0.display())]
    BackupExists(PathBuf),
    #[error("No settings backup found at {}", .0.display())]
    BackupMissing(PathBuf),
    #[error("A resolution width is required to patch the settings")]
    MissingWidth,
    #[error("Error accessing {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

type Result<T = ()> = std::result::Result<T, SettingsError>;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SettingsError + '_ {
    move |source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Finds the game's settings file and switches it to borderless windowed mode
pub struct SettingsPatcher<R> {
    runner: R,
    search_tool: String,
    search_base: PathBuf,
    filename: String,
    backup_path: PathBuf,
    overwrite_backup: bool,
}

impl<R: CommandRunner> SettingsPatcher<R> {
    pub fn new(
        runner: R,
        search_tool: impl Into<String>,
        search_base: impl Into<PathBuf>,
        filename: impl Into<String>,
        backup_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            search_tool: search_tool.into(),
            search_base: search_base.into(),
            filename: filename.into(),
            backup_path: backup_path.into(),
            overwrite_backup: false,
        }
    }

    /// Allows a forward run to replace an existing backup
    pub fn overwrite_backup(mut self, overwrite: bool) -> Self {
        self.overwrite_backup = overwrite;
        self
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Fails if a forward run would replace the backup of an earlier run.
    ///
    /// [`SettingsPatcher::patch`] enforces this on its own, so the patcher is safe to use
    /// without a preceding check.
    pub fn check_backup(&self) -> Result {
        if !self.overwrite_backup && self.backup_path.exists() {
            return Err(SettingsError::BackupExists(self.backup_path.clone()));
        }
        Ok(())
    }

    /// Searches the search base recursively for the settings file
    pub fn locate(&self) -> Result<PathBuf> {
        log::info!(
            "Searching for {} in {}",
            self.filename,
            self.search_base.display()
        );

        let not_found = || SettingsError::NotFound {
            filename: self.filename.clone(),
            base: self.search_base.clone(),
        };

        if !self.search_base.is_dir() {
            return Err(not_found());
        }

        let args = [
            self.search_base.to_string_lossy().into_owned(),
            "-name".to_string(),
            self.filename.clone(),
            "-type".to_string(),
            "f".to_string(),
        ];
        let found = self.runner.run(&self.search_tool, &args)?;

        let mut hits = found.lines().map(str::trim).filter(|l| !l.is_empty());
        let path = PathBuf::from(hits.next().ok_or_else(not_found)?);
        for extra in hits {
            log::warn!("Ignoring additional match {}", extra);
        }

        log::info!("Found {} at {}", self.filename, path.display());
        Ok(path)
    }

    /// Patches the settings file for `resolution_width`, or restores it from the
    /// backup if `revert` is set. The width is ignored when reverting.
    ///
    /// Returns the lines that were changed.
    pub fn patch(&self, resolution_width: Option<u32>, revert: bool) -> Result<Vec<LineChange>> {
        if revert {
            self.restore()?;
            return Ok(Vec::new());
        }

        let width = resolution_width.ok_or(SettingsError::MissingWidth)?;
        self.check_backup()?;
        let path = self.locate()?;

        fs::copy(&path, &self.backup_path).map_err(io_error(&self.backup_path))?;
        log::info!("Saved {} to {}", path.display(), self.backup_path.display());

        let original = fs::read_to_string(&path).map_err(io_error(&path))?;
        let (patched, changes) = patch::apply_rules(&original, &patch::settings_rules(width));

        if changes.is_empty() {
            log::info!("{} is already up to date", self.filename);
            return Ok(changes);
        }

        for change in &changes {
            log::debug!("Patched {}", change);
        }
        fs::write(&path, patched).map_err(io_error(&path))?;
        log::info!("Patched {} line(s) in {}", changes.len(), path.display());

        Ok(changes)
    }

    /// Copies the backup over the settings file; the backup is only removed once the
    /// copy succeeded
    fn restore(&self) -> Result {
        log::info!("Reverting {} to original settings", self.filename);

        if !self.backup_path.is_file() {
            return Err(SettingsError::BackupMissing(self.backup_path.clone()));
        }
        let path = self.locate()?;
        fs::copy(&self.backup_path, &path).map_err(io_error(&path))?;
        fs::remove_file(&self.backup_path).map_err(io_error(&self.backup_path))?;
        Ok(())
    }
}
