//! Baseline descriptions.
//!
//! [`defaults_for`] gives a family baseline that callers tweak before
//! resolving. [`Preset`]s are complete board wirings.

use std::str::FromStr;

use crate::driver::{DriverSelection, DriverVariant};
use crate::fonts::FontSet;
use crate::pins::Level;
use crate::raw::{RawBus, RawDescription, RawPanel, RawPins};
use crate::rotation::Rotation;
use crate::timing::{SpiPort, TOUCH_FREQUENCY_MAX};
use crate::{Error, Result, PIN_UNUSED};

/// Conservative write clock used by baselines.
pub const DEFAULT_WRITE_FREQUENCY: i64 = 27_000_000;

/// Conservative read clock used by baselines.
pub const DEFAULT_READ_FREQUENCY: i64 = 20_000_000;

/// Returns the documented baseline for a controller family.
///
/// Native portrait geometry, the common ESP32 VSPI wiring with backlight and
/// touch left unconnected, conservative clocks and every built-in font.
pub fn defaults_for(variant: DriverVariant) -> RawDescription {
    let (width, height) = variant.max_dimensions();
    RawDescription {
        name: None,
        drivers: DriverSelection::single(variant),
        panel: RawPanel {
            width: i64::from(width),
            height: i64::from(height),
            rotation: Rotation::Portrait,
        },
        pins: RawPins {
            miso: 19,
            mosi: 23,
            sclk: 18,
            cs: 15,
            dc: 2,
            rst: 4,
            bl: PIN_UNUSED,
            touch_cs: PIN_UNUSED,
            backlight_on: Level::High,
        },
        bus: RawBus {
            port: SpiPort::Vspi,
            write_frequency: DEFAULT_WRITE_FREQUENCY,
            read_frequency: DEFAULT_READ_FREQUENCY,
            touch_frequency: i64::from(TOUCH_FREQUENCY_MAX),
        },
        fonts: FontSet::all(),
    }
}

/// Named board wirings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// ILI9341 on HSPI with XPT2046 touch and a GPIO-driven reset.
    HspiTouch,
    /// Same board with the panel reset tied to the board reset.
    HspiTouchBoardReset,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::HspiTouch, Preset::HspiTouchBoardReset];

    /// One-line description for listings.
    pub fn description(&self) -> &'static str {
        match self {
            Preset::HspiTouch => "ILI9341 240x320 on HSPI, touch CS 33, reset on GPIO 4",
            Preset::HspiTouchBoardReset => {
                "ILI9341 240x320 on HSPI, touch CS 33, reset tied to board reset"
            }
        }
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "hspi-touch" => Ok(Preset::HspiTouch),
            "hspi-touch-board-reset" => Ok(Preset::HspiTouchBoardReset),
            _ => Err(Error::InvalidPreset(s.to_string())),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Preset::HspiTouch => write!(f, "hspi-touch"),
            Preset::HspiTouchBoardReset => write!(f, "hspi-touch-board-reset"),
        }
    }
}

/// Returns the full description for a named wiring.
pub fn preset(preset: Preset) -> RawDescription {
    let mut raw = defaults_for(DriverVariant::Ili9341Alt);
    raw.name = Some("User_Setup".to_string());
    raw.pins = RawPins {
        miso: 12,
        mosi: 13,
        sclk: 14,
        cs: 15,
        dc: 2,
        rst: 4,
        bl: 21,
        touch_cs: 33,
        backlight_on: Level::High,
    };
    raw.bus = RawBus {
        port: SpiPort::Hspi,
        write_frequency: 40_000_000,
        read_frequency: 20_000_000,
        touch_frequency: 2_500_000,
    };

    if preset == Preset::HspiTouchBoardReset {
        raw.pins.rst = PIN_UNUSED;
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::Pin;
    use crate::resolve::resolve;

    #[test]
    fn test_every_baseline_resolves() {
        for variant in DriverVariant::ALL {
            let config = resolve(defaults_for(variant)).unwrap();
            assert_eq!(config.driver(), variant);
            assert_eq!((config.width(), config.height()), variant.max_dimensions());
            assert!(config.bus().read_frequency <= config.bus().write_frequency);
        }
    }

    #[test]
    fn test_baseline_override_single_field() {
        let mut raw = defaults_for(DriverVariant::St7789);
        raw.pins.bl = 32;
        let config = resolve(raw).unwrap();
        assert_eq!(config.pins().bl, Pin::Gpio(32));
        assert_eq!(config.pins().cs, Pin::Gpio(15));
    }

    #[test]
    fn test_presets_resolve() {
        let active = resolve(preset(Preset::HspiTouch)).unwrap();
        assert_eq!(active.pins().rst, Pin::Gpio(4));
        assert_eq!(active.pins().bl, Pin::Gpio(21));
        assert_eq!(active.bus().port, SpiPort::Hspi);
        assert!(active.touch().is_enabled());

        let tied = resolve(preset(Preset::HspiTouchBoardReset)).unwrap();
        assert_eq!(tied.pins().rst, Pin::Unused);
        assert_eq!(tied.pins().dc, active.pins().dc);
    }

    #[test]
    fn test_preset_names() {
        for p in Preset::ALL {
            assert_eq!(p.to_string().parse::<Preset>().unwrap(), p);
        }
        assert!("cheap-yellow".parse::<Preset>().is_err());
    }
}
