use core::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Contains the resolution of a display
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Creates a new resolution
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered by this resolution
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Errors that occur while parsing a resolution from a string
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseResolutionError {
    #[error("Error parsing integer")]
    IntError(#[from] std::num::ParseIntError),
    #[error("First integer missing")]
    FirstPart,
    #[error("Second integer missing. Expected format: <width>x<height>")]
    SecondPart,
}

impl FromStr for Resolution {
    type Err = ParseResolutionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.split('x');
        let width = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or(ParseResolutionError::FirstPart)?
            .parse()?;
        let height = parts
            .next()
            .ok_or(ParseResolutionError::SecondPart)?
            .parse()?;
        Ok(Self::new(width, height))
    }
}

/// Refresh rate in whole Hz
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Frequency(pub u32);

impl Frequency {
    pub fn new(v: u32) -> Self {
        Self(v)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseFrequencyError {
    #[error("Error parsing integer")]
    IntError(#[from] std::num::ParseIntError),
}

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    /// Accepts `60` as well as `59.95`; the fractional part is dropped.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let whole = s.split_once('.').map_or(s, |(whole, _)| whole);
        Ok(Frequency(whole.parse::<u32>()?))
    }
}

/// A display mode: resolution and refresh rate, written `<width>x<height>@<refresh>`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ModeDescriptor {
    pub resolution: Resolution,
    pub refresh: Frequency,
}

impl ModeDescriptor {
    pub fn new(width: u32, height: u32, refresh: u32) -> Self {
        Self {
            resolution: Resolution::new(width, height),
            refresh: Frequency::new(refresh),
        }
    }

    pub fn width(&self) -> u32 {
        self.resolution.width
    }

    pub fn height(&self) -> u32 {
        self.resolution.height
    }
}

impl fmt::Display for ModeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.resolution, self.refresh)
    }
}

/// Errors that occur while parsing a mode descriptor from a string
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseModeError {
    #[error("Invalid resolution: {0}")]
    Resolution(#[from] ParseResolutionError),
    #[error("Invalid refresh rate: {0}")]
    Frequency(#[from] ParseFrequencyError),
    #[error("Refresh rate missing. Expected format: <width>x<height>@<refresh>")]
    MissingRefresh,
}

impl FromStr for ModeDescriptor {
    type Err = ParseModeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (resolution, refresh) = s.split_once('@').ok_or(ParseModeError::MissingRefresh)?;
        Ok(Self {
            resolution: resolution.parse()?,
            refresh: refresh.parse()?,
        })
    }
}
