//! Unvalidated setup description.
//!
//! Field types are deliberately wider than their resolved counterparts so
//! that out-of-range input (negative sizes, zero clocks, pin numbers below
//! the unused sentinel) survives parsing and is reported by the resolver.

use serde::{Deserialize, Serialize};

use crate::driver::DriverSelection;
use crate::fonts::FontSet;
use crate::pins::{Level, Signal};
use crate::rotation::Rotation;
use crate::timing::SpiPort;
use crate::PIN_UNUSED;

/// Declarative display setup as supplied by a file, the environment or a preset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDescription {
    /// Free-form setup label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Driver flags that are set
    #[serde(default, rename = "driver", alias = "drivers")]
    pub drivers: DriverSelection,

    /// Panel geometry
    #[serde(default)]
    pub panel: RawPanel,

    /// Pin map
    #[serde(default)]
    pub pins: RawPins,

    /// SPI clocks and port
    #[serde(default)]
    pub bus: RawBus,

    /// Fonts
    #[serde(default)]
    pub fonts: FontSet,
}

/// Panel size and default rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPanel {
    #[serde(default)]
    pub width: i64,

    #[serde(default)]
    pub height: i64,

    #[serde(default)]
    pub rotation: Rotation,
}

/// Pin numbers, `-1` meaning not independently controlled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPins {
    #[serde(default = "default_pin")]
    pub cs: i32,

    #[serde(default = "default_pin")]
    pub dc: i32,

    #[serde(default = "default_pin")]
    pub rst: i32,

    #[serde(default = "default_pin")]
    pub bl: i32,

    #[serde(default = "default_pin")]
    pub sclk: i32,

    #[serde(default = "default_pin")]
    pub mosi: i32,

    #[serde(default = "default_pin")]
    pub miso: i32,

    #[serde(default = "default_pin")]
    pub touch_cs: i32,

    /// Level that turns the backlight on
    #[serde(default)]
    pub backlight_on: Level,
}

fn default_pin() -> i32 {
    PIN_UNUSED
}

impl Default for RawPins {
    fn default() -> Self {
        Self {
            cs: PIN_UNUSED,
            dc: PIN_UNUSED,
            rst: PIN_UNUSED,
            bl: PIN_UNUSED,
            sclk: PIN_UNUSED,
            mosi: PIN_UNUSED,
            miso: PIN_UNUSED,
            touch_cs: PIN_UNUSED,
            backlight_on: Level::High,
        }
    }
}

impl RawPins {
    /// Returns the raw pin number for a signal.
    pub fn get(&self, signal: Signal) -> i32 {
        match signal {
            Signal::Cs => self.cs,
            Signal::Dc => self.dc,
            Signal::Rst => self.rst,
            Signal::Bl => self.bl,
            Signal::Sclk => self.sclk,
            Signal::Mosi => self.mosi,
            Signal::Miso => self.miso,
            Signal::TouchCs => self.touch_cs,
        }
    }

    /// Binds a signal to a raw pin number.
    pub fn set(&mut self, signal: Signal, pin: i32) {
        let slot = match signal {
            Signal::Cs => &mut self.cs,
            Signal::Dc => &mut self.dc,
            Signal::Rst => &mut self.rst,
            Signal::Bl => &mut self.bl,
            Signal::Sclk => &mut self.sclk,
            Signal::Mosi => &mut self.mosi,
            Signal::Miso => &mut self.miso,
            Signal::TouchCs => &mut self.touch_cs,
        };
        *slot = pin;
    }
}

/// Bus clocks in Hz and the SPI port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBus {
    #[serde(default)]
    pub port: SpiPort,

    #[serde(default)]
    pub write_frequency: i64,

    #[serde(default)]
    pub read_frequency: i64,

    #[serde(default)]
    pub touch_frequency: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pins_unused() {
        let pins = RawPins::default();
        for signal in Signal::ALL {
            assert_eq!(pins.get(signal), PIN_UNUSED);
        }
    }

    #[test]
    fn test_set_pin() {
        let mut pins = RawPins::default();
        pins.set(Signal::TouchCs, 33);
        pins.set(Signal::Rst, 4);
        assert_eq!(pins.touch_cs, 33);
        assert_eq!(pins.get(Signal::Rst), 4);
    }

    #[test]
    fn test_empty_description() {
        let raw = RawDescription::default();
        assert!(raw.drivers.is_empty());
        assert_eq!(raw.panel.width, 0);
        assert!(raw.fonts.load.is_empty());
    }
}
