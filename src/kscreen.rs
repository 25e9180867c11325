//! Parsing of `kscreen-doctor --outputs`.
//!
//! The tool prints one section per output, starting with an `Output:` label and
//! carrying a `Modes:` list such as
//!
//! ```text
//! Output: 1 DP-1 enabled connected priority 1 DisplayPort Modes: 0:2560x1440@144*! 1:1920x1080@60 Geometry: 0,0 2560x1440 Scale: 1 Rotation: 1
//! ```
//!
//! where `*` marks the mode currently in effect. Sections may also be spread over
//! several lines, with `Modes:` on a line of its own.
use core::fmt;
use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::types::ModeDescriptor;

lazy_static! {
    static ref ANSI_ESCAPE: Regex = Regex::new(r"\x1B\[[0-?]*[ -/]*[@-~]").unwrap();
    static ref OUTPUT_ID: Regex = Regex::new(r"Output:\s*(\d+)").unwrap();
    static ref MODES_SECTION: Regex =
        Regex::new(r"(?s)Modes:(.*?)(?:Geometry|Scale|Rotation)").unwrap();
    static ref MODE: Regex = Regex::new(r"(\d+):(\d+x\d+@\d+(?:\.\d+)?)([*!]*)").unwrap();
}

/// Errors that occur while parsing a single output section
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseMonitorError {
    #[error("No output id found in section: {0}")]
    MissingOutput(String),
    #[error("Output {0} lists no modes")]
    MissingModes(u32),
}

type Result<T = ()> = std::result::Result<T, ParseMonitorError>;

/// A mode as listed by the tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mode {
    /// The mode name exactly as printed, e.g. `1920x1080@59.94`
    pub name: String,
    pub descriptor: ModeDescriptor,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A connected output and the modes it supports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monitor {
    /// The id kscreen-doctor uses for the output
    pub output: u32,
    /// Supported modes, keyed by mode id
    pub modes: BTreeMap<u32, Mode>,
    /// The mode marked as active, if any
    pub selected_mode: Option<u32>,
}

impl Monitor {
    /// Returns the active mode
    pub fn active_mode(&self) -> Option<&Mode> {
        self.selected_mode.and_then(|id| self.modes.get(&id))
    }
}

impl fmt::Display for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.selected_mode, self.active_mode()) {
            (Some(id), Some(mode)) => write!(
                f,
                "Output {{ id: {}, modes: {}, active: {}:{} }}",
                self.output,
                self.modes.len(),
                id,
                mode
            ),
            _ => write!(
                f,
                "Output {{ id: {}, modes: {}, active: none }}",
                self.output,
                self.modes.len()
            ),
        }
    }
}

/// Removes terminal color sequences from tool output
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// Splits the tool output into one section per output.
///
/// A section starts at every line beginning with `Output:`; anything printed before
/// the first such line is dropped.
pub fn split_outputs(text: &str) -> Vec<String> {
    let mut sections: Vec<String> = Vec::new();

    for line in text.lines() {
        if line.trim_start().starts_with("Output:") {
            sections.push(line.to_string());
        } else if let Some(current) = sections.last_mut() {
            current.push('\n');
            current.push_str(line);
        }
    }

    sections
}

/// Parses one output section into a [`Monitor`]
pub fn parse_monitor(section: &str) -> Result<Monitor> {
    let output = OUTPUT_ID
        .captures(section)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .ok_or_else(|| ParseMonitorError::MissingOutput(section.trim().to_string()))?;

    // An unterminated list runs to the end of the section
    let modes_text = match MODES_SECTION.captures(section) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => section
            .split_once("Modes:")
            .map(|(_, rest)| rest)
            .ok_or(ParseMonitorError::MissingModes(output))?,
    };

    let mut modes = BTreeMap::new();
    let mut selected_mode = None;

    for caps in MODE.captures_iter(modes_text) {
        let Ok(id) = caps[1].parse::<u32>() else {
            log::warn!("Skipping mode with unusable id on output {}: {}", output, &caps[0]);
            continue;
        };
        let descriptor = match caps[2].parse::<ModeDescriptor>() {
            Ok(descriptor) => descriptor,
            Err(err) => {
                log::warn!("Skipping mode {} on output {}: {}", &caps[0], output, err);
                continue;
            }
        };

        if caps[3].contains('*') {
            selected_mode = Some(id);
        }
        modes.insert(
            id,
            Mode {
                name: caps[2].to_string(),
                descriptor,
            },
        );
    }

    if modes.is_empty() {
        return Err(ParseMonitorError::MissingModes(output));
    }

    Ok(Monitor {
        output,
        modes,
        selected_mode,
    })
}
