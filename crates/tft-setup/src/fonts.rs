//! Built-in font selection.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Fonts that can be compiled into the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontId {
    /// Font 1, the original 8 pixel Adafruit font.
    Glcd,
    /// Small 16 pixel font, 96 characters.
    Font2,
    /// Medium 26 pixel font, 96 characters.
    Font4,
    /// Large 48 pixel font, digits and `:-.apm`.
    Font6,
    /// 7-segment 48 pixel font, digits and `:-.`.
    Font7,
    /// Large 75 pixel font, digits and `:-.`.
    Font8,
    /// FreeFonts FF1 to FF48 and custom fonts.
    Gfxff,
}

impl FontId {
    pub const ALL: [FontId; 7] = [
        FontId::Glcd,
        FontId::Font2,
        FontId::Font4,
        FontId::Font6,
        FontId::Font7,
        FontId::Font8,
        FontId::Gfxff,
    ];

    /// Approximate flash cost in bytes.
    ///
    /// Free fonts are linked only when referenced, so they count as zero.
    pub fn flash_bytes(&self) -> u32 {
        match self {
            FontId::Glcd => 1820,
            FontId::Font2 => 3534,
            FontId::Font4 => 5848,
            FontId::Font6 => 2666,
            FontId::Font7 => 2438,
            FontId::Font8 => 3256,
            FontId::Gfxff => 0,
        }
    }

    /// Font number used by the drawing API, if it has one.
    pub fn number(&self) -> Option<u8> {
        match self {
            FontId::Glcd => Some(1),
            FontId::Font2 => Some(2),
            FontId::Font4 => Some(4),
            FontId::Font6 => Some(6),
            FontId::Font7 => Some(7),
            FontId::Font8 => Some(8),
            FontId::Gfxff => None,
        }
    }
}

impl FromStr for FontId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        let name = lower.strip_prefix("load_").unwrap_or(&lower);
        match name {
            "glcd" | "font1" | "1" => Ok(FontId::Glcd),
            "font2" | "2" => Ok(FontId::Font2),
            "font4" | "4" => Ok(FontId::Font4),
            "font6" | "6" => Ok(FontId::Font6),
            "font7" | "7" => Ok(FontId::Font7),
            "font8" | "8" => Ok(FontId::Font8),
            "gfxff" | "freefonts" => Ok(FontId::Gfxff),
            _ => Err(Error::InvalidFont(s.to_string())),
        }
    }
}

impl std::fmt::Display for FontId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontId::Glcd => write!(f, "glcd"),
            FontId::Font2 => write!(f, "font2"),
            FontId::Font4 => write!(f, "font4"),
            FontId::Font6 => write!(f, "font6"),
            FontId::Font7 => write!(f, "font7"),
            FontId::Font8 => write!(f, "font8"),
            FontId::Gfxff => write!(f, "gfxff"),
        }
    }
}

/// Selected fonts plus the smoothing flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontSet {
    /// Fonts to load.
    #[serde(default)]
    pub load: BTreeSet<FontId>,

    /// Anti-aliased font support.
    #[serde(default)]
    pub smooth: bool,
}

impl FontSet {
    /// Every built-in font with smoothing enabled.
    pub fn all() -> Self {
        Self {
            load: FontId::ALL.into_iter().collect(),
            smooth: true,
        }
    }

    pub fn new<I: IntoIterator<Item = FontId>>(fonts: I, smooth: bool) -> Self {
        Self {
            load: fonts.into_iter().collect(),
            smooth,
        }
    }

    pub fn contains(&self, font: FontId) -> bool {
        self.load.contains(&font)
    }

    /// Sum of the selected fonts' flash cost.
    pub fn flash_estimate(&self) -> u32 {
        self.load.iter().map(FontId::flash_bytes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("LOAD_GLCD".parse::<FontId>().unwrap(), FontId::Glcd);
        assert_eq!("font4".parse::<FontId>().unwrap(), FontId::Font4);
        assert_eq!("LOAD_GFXFF".parse::<FontId>().unwrap(), FontId::Gfxff);
        assert!("font3".parse::<FontId>().is_err());
    }

    #[test]
    fn test_flash_estimate() {
        let set = FontSet::new([FontId::Font2, FontId::Font4], false);
        assert_eq!(set.flash_estimate(), 3534 + 5848);
        assert_eq!(FontSet::default().flash_estimate(), 0);
        assert_eq!(FontSet::all().flash_estimate(), 19562);
    }

    #[test]
    fn test_set_ignores_duplicates() {
        let set = FontSet::new([FontId::Font7, FontId::Font7], true);
        assert_eq!(set.load.len(), 1);
        assert!(set.contains(FontId::Font7));
    }
}
