//! Default panel rotation.
//!
//! Rotation is applied by the controller's address mode, so all four
//! quarter turns are hardware native. Odd rotations swap width and height.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Panel rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rotation {
    /// Native portrait (rotation 0).
    #[default]
    Portrait,
    /// Landscape (rotation 1).
    Landscape,
    /// Portrait turned 180° (rotation 2).
    PortraitInverted,
    /// Landscape turned 180° (rotation 3).
    LandscapeInverted,
}

impl Rotation {
    /// Returns the controller rotation index (0-3).
    pub fn index(&self) -> u8 {
        match self {
            Rotation::Portrait => 0,
            Rotation::Landscape => 1,
            Rotation::PortraitInverted => 2,
            Rotation::LandscapeInverted => 3,
        }
    }

    /// Returns the rotation for a controller index, wrapping like the driver does.
    pub fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Rotation::Portrait,
            1 => Rotation::Landscape,
            2 => Rotation::PortraitInverted,
            _ => Rotation::LandscapeInverted,
        }
    }

    /// Returns true if width and height are swapped.
    pub fn is_landscape(&self) -> bool {
        matches!(self, Rotation::Landscape | Rotation::LandscapeInverted)
    }

    /// Returns the visible dimensions for a native portrait panel.
    pub fn dimensions(&self, width: u16, height: u16) -> (u16, u16) {
        if self.is_landscape() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

impl FromStr for Rotation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(index @ 0..=3) = s.trim().parse::<u8>() {
            return Ok(Rotation::from_index(index));
        }
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "portrait" => Ok(Rotation::Portrait),
            "landscape" => Ok(Rotation::Landscape),
            "portrait-inverted" => Ok(Rotation::PortraitInverted),
            "landscape-inverted" => Ok(Rotation::LandscapeInverted),
            _ => Err(Error::InvalidRotation(s.to_string())),
        }
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rotation::Portrait => write!(f, "portrait"),
            Rotation::Landscape => write!(f, "landscape"),
            Rotation::PortraitInverted => write!(f, "portrait-inverted"),
            Rotation::LandscapeInverted => write!(f, "landscape-inverted"),
        }
    }
}
