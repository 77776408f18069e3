//! Display controller families.
//!
//! A setup names its controller the way the C header did: by "defining"
//! driver flags. Only one may be defined; [`DriverSelection`] keeps every
//! flag that was set so the resolver can report conflicts.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pins::Signal;
use crate::{Error, Result};

/// Supported display controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DriverVariant {
    /// ILI9341, 240x320.
    #[serde(rename = "ili9341")]
    Ili9341,
    /// Alternative ILI9341 init sequence for newer panel revisions.
    #[serde(rename = "ili9341-2")]
    Ili9341Alt,
    /// ILI9163, 128x160.
    #[serde(rename = "ili9163")]
    Ili9163,
    /// ILI9486, 320x480.
    #[serde(rename = "ili9486")]
    Ili9486,
    /// ILI9488, 320x480.
    #[serde(rename = "ili9488")]
    Ili9488,
    /// ST7735, 128x160.
    #[serde(rename = "st7735")]
    St7735,
    /// ST7789, 240x320.
    #[serde(rename = "st7789")]
    St7789,
    /// Minimal ST7789 init sequence.
    #[serde(rename = "st7789-2")]
    St7789Alt,
    /// ST7796, 320x480.
    #[serde(rename = "st7796")]
    St7796,
    /// GC9A01 round panel, 240x240.
    #[serde(rename = "gc9a01")]
    Gc9a01,
    /// HX8357D, 320x480.
    #[serde(rename = "hx8357d")]
    Hx8357d,
    /// SSD1351 OLED, 128x128.
    #[serde(rename = "ssd1351")]
    Ssd1351,
}

/// Signal pairs that may share a pin on controllers with a bidirectional SDA line.
const SDA_SHARED: &[(Signal, Signal)] = &[(Signal::Mosi, Signal::Miso)];

impl DriverVariant {
    /// Every supported controller, in declaration order.
    pub const ALL: [DriverVariant; 12] = [
        DriverVariant::Ili9341,
        DriverVariant::Ili9341Alt,
        DriverVariant::Ili9163,
        DriverVariant::Ili9486,
        DriverVariant::Ili9488,
        DriverVariant::St7735,
        DriverVariant::St7789,
        DriverVariant::St7789Alt,
        DriverVariant::St7796,
        DriverVariant::Gc9a01,
        DriverVariant::Hx8357d,
        DriverVariant::Ssd1351,
    ];

    /// Native panel size in portrait orientation.
    pub fn max_dimensions(&self) -> (u16, u16) {
        match self {
            DriverVariant::Ili9341
            | DriverVariant::Ili9341Alt
            | DriverVariant::St7789
            | DriverVariant::St7789Alt => (240, 320),
            DriverVariant::Ili9163 | DriverVariant::St7735 => (128, 160),
            DriverVariant::Ili9486
            | DriverVariant::Ili9488
            | DriverVariant::St7796
            | DriverVariant::Hx8357d => (320, 480),
            DriverVariant::Gc9a01 => (240, 240),
            DriverVariant::Ssd1351 => (128, 128),
        }
    }

    /// Signal pairs this controller allows on a single pin.
    pub fn shared_pins(&self) -> &'static [(Signal, Signal)] {
        match self {
            DriverVariant::Ili9163
            | DriverVariant::St7735
            | DriverVariant::St7789
            | DriverVariant::St7789Alt
            | DriverVariant::Gc9a01 => SDA_SHARED,
            _ => &[],
        }
    }

    /// Returns true if `a` and `b` may be bound to the same pin.
    pub fn permits_sharing(&self, a: Signal, b: Signal) -> bool {
        self.shared_pins()
            .iter()
            .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    /// Highest SPI write clock the controller is rated for, in Hz.
    pub fn rated_write_frequency(&self) -> u32 {
        match self {
            DriverVariant::St7789 | DriverVariant::St7789Alt | DriverVariant::Gc9a01 => {
                80_000_000
            }
            DriverVariant::Ili9341
            | DriverVariant::Ili9341Alt
            | DriverVariant::Ili9163
            | DriverVariant::Ili9488
            | DriverVariant::St7796 => 40_000_000,
            DriverVariant::St7735 | DriverVariant::Hx8357d => 27_000_000,
            DriverVariant::Ili9486 | DriverVariant::Ssd1351 => 20_000_000,
        }
    }
}

impl FromStr for DriverVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        let normalized = normalized.strip_suffix("-driver").unwrap_or(&normalized);
        DriverVariant::ALL
            .into_iter()
            .find(|d| d.to_string() == normalized)
            .ok_or_else(|| Error::InvalidDriver(s.to_string()))
    }
}

impl std::fmt::Display for DriverVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DriverVariant::Ili9341 => "ili9341",
            DriverVariant::Ili9341Alt => "ili9341-2",
            DriverVariant::Ili9163 => "ili9163",
            DriverVariant::Ili9486 => "ili9486",
            DriverVariant::Ili9488 => "ili9488",
            DriverVariant::St7735 => "st7735",
            DriverVariant::St7789 => "st7789",
            DriverVariant::St7789Alt => "st7789-2",
            DriverVariant::St7796 => "st7796",
            DriverVariant::Gc9a01 => "gc9a01",
            DriverVariant::Hx8357d => "hx8357d",
            DriverVariant::Ssd1351 => "ssd1351",
        };
        write!(f, "{}", name)
    }
}

/// The set of driver flags a raw description defines.
///
/// Accepts either `driver = "st7789"` or `driver = ["st7789", ...]` in TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "SelectionRepr", into = "SelectionRepr")]
pub struct DriverSelection(BTreeSet<DriverVariant>);

impl DriverSelection {
    /// A selection with no flags set.
    pub fn none() -> Self {
        Self::default()
    }

    /// A selection with exactly one flag set.
    pub fn single(variant: DriverVariant) -> Self {
        Self(BTreeSet::from([variant]))
    }

    /// Sets a driver flag.
    pub fn insert(&mut self, variant: DriverVariant) {
        self.0.insert(variant);
    }

    /// Returns the driver if exactly one flag is set.
    pub fn exclusive(&self) -> Option<DriverVariant> {
        match self.0.len() {
            1 => self.0.iter().next().copied(),
            _ => None,
        }
    }

    /// Selected drivers in declaration order.
    pub fn selected(&self) -> Vec<DriverVariant> {
        self.0.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<DriverVariant> for DriverSelection {
    fn from(variant: DriverVariant) -> Self {
        Self::single(variant)
    }
}

impl FromIterator<DriverVariant> for DriverSelection {
    fn from_iter<I: IntoIterator<Item = DriverVariant>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SelectionRepr {
    One(DriverVariant),
    Many(Vec<DriverVariant>),
}

impl From<SelectionRepr> for DriverSelection {
    fn from(repr: SelectionRepr) -> Self {
        match repr {
            SelectionRepr::One(variant) => Self::single(variant),
            SelectionRepr::Many(variants) => variants.into_iter().collect(),
        }
    }
}

impl From<DriverSelection> for SelectionRepr {
    fn from(selection: DriverSelection) -> Self {
        match selection.exclusive() {
            Some(variant) => SelectionRepr::One(variant),
            None => SelectionRepr::Many(selection.selected()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(
            "ili9341-2".parse::<DriverVariant>().unwrap(),
            DriverVariant::Ili9341Alt
        );
        assert_eq!(
            "ILI9341_2_DRIVER".parse::<DriverVariant>().unwrap(),
            DriverVariant::Ili9341Alt
        );
        assert_eq!(
            "st7789".parse::<DriverVariant>().unwrap(),
            DriverVariant::St7789
        );
        assert!("ili9999".parse::<DriverVariant>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for variant in DriverVariant::ALL {
            assert_eq!(variant.to_string().parse::<DriverVariant>().unwrap(), variant);
        }
    }

    #[test]
    fn test_max_dimensions() {
        assert_eq!(DriverVariant::Ili9341Alt.max_dimensions(), (240, 320));
        assert_eq!(DriverVariant::Gc9a01.max_dimensions(), (240, 240));
        assert_eq!(DriverVariant::Ili9488.max_dimensions(), (320, 480));
    }

    #[test]
    fn test_sharing_is_symmetric() {
        let st = DriverVariant::St7789;
        assert!(st.permits_sharing(Signal::Mosi, Signal::Miso));
        assert!(st.permits_sharing(Signal::Miso, Signal::Mosi));
        assert!(!st.permits_sharing(Signal::Dc, Signal::Rst));
        assert!(!DriverVariant::Ili9341Alt.permits_sharing(Signal::Mosi, Signal::Miso));
    }

    #[test]
    fn test_selection_exclusive() {
        assert_eq!(DriverSelection::none().exclusive(), None);
        assert_eq!(
            DriverSelection::single(DriverVariant::St7735).exclusive(),
            Some(DriverVariant::St7735)
        );

        let mut both = DriverSelection::single(DriverVariant::St7735);
        both.insert(DriverVariant::Ili9341);
        assert_eq!(both.exclusive(), None);
        assert_eq!(
            both.selected(),
            vec![DriverVariant::Ili9341, DriverVariant::St7735]
        );
    }

    #[test]
    fn test_selection_defined_twice_is_one_flag() {
        let selection: DriverSelection =
            [DriverVariant::St7789, DriverVariant::St7789].into_iter().collect();
        assert_eq!(selection.exclusive(), Some(DriverVariant::St7789));
    }
}
