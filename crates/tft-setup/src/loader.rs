//! Reading descriptions from TOML and header-style overrides.
//!
//! A setup file looks like:
//!
//! ```toml
//! name = "User_Setup"
//! driver = "ili9341-2"
//!
//! [panel]
//! width = 240
//! height = 320
//!
//! [pins]
//! cs = 15
//! dc = 2
//! rst = 4
//!
//! [bus]
//! port = "hspi"
//! write_frequency = 40000000
//! read_frequency = 20000000
//! touch_frequency = 2500000
//!
//! [fonts]
//! load = ["glcd", "font2", "font4"]
//! smooth = true
//! ```

use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::driver::{DriverSelection, DriverVariant};
use crate::pins::{Level, Signal};
use crate::raw::RawDescription;
use crate::rotation::Rotation;
use crate::timing::SpiPort;
use crate::{Error, Result};

/// Keys recognized by [`RawDescription::apply_overrides`].
pub const OVERRIDE_KEYS: &[&str] = &[
    "TFT_DRIVER",
    "TFT_WIDTH",
    "TFT_HEIGHT",
    "TFT_ROTATION",
    "TFT_CS",
    "TFT_DC",
    "TFT_RST",
    "TFT_BL",
    "TFT_SCLK",
    "TFT_MOSI",
    "TFT_MISO",
    "TOUCH_CS",
    "TFT_BACKLIGHT_ON",
    "TFT_SPI_PORT",
    "SPI_FREQUENCY",
    "SPI_READ_FREQUENCY",
    "SPI_TOUCH_FREQUENCY",
];

impl RawDescription {
    /// Parses a description from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a description from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let raw = Self::from_toml_str(&content)?;
        debug!("Loaded setup description from {}", path.as_ref().display());
        Ok(raw)
    }

    /// Serializes the description as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Saves the description to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_toml_string()?)?;
        Ok(())
    }

    /// Applies `KEY=value` overrides named after the header macros.
    ///
    /// Unknown keys are skipped so the whole process environment can be
    /// passed in. Returns how many overrides were applied.
    pub fn apply_overrides<I, K, V>(&mut self, vars: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut applied = 0;
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            if !OVERRIDE_KEYS.contains(&key) {
                continue;
            }
            if self.apply_override(key, value)? {
                debug!("Override {}={}", key, value);
                applied += 1;
            }
        }
        Ok(applied)
    }

    fn apply_override(&mut self, key: &str, value: &str) -> Result<bool> {
        let bad = || Error::Override {
            key: key.to_string(),
            value: value.to_string(),
        };

        if let Some(signal) = signal_for_key(key) {
            let pin: i32 = value.parse().map_err(|_| bad())?;
            self.pins.set(signal, pin);
            return Ok(true);
        }

        match key {
            "TFT_DRIVER" => {
                let variant = DriverVariant::from_str(value).map_err(|_| bad())?;
                self.drivers = DriverSelection::single(variant);
            }
            "TFT_WIDTH" => self.panel.width = value.parse().map_err(|_| bad())?,
            "TFT_HEIGHT" => self.panel.height = value.parse().map_err(|_| bad())?,
            "TFT_ROTATION" => {
                self.panel.rotation = Rotation::from_str(value).map_err(|_| bad())?
            }
            "TFT_BACKLIGHT_ON" => {
                self.pins.backlight_on = Level::from_str(value).map_err(|_| bad())?
            }
            "TFT_SPI_PORT" => self.bus.port = SpiPort::from_str(value).map_err(|_| bad())?,
            "SPI_FREQUENCY" => self.bus.write_frequency = value.parse().map_err(|_| bad())?,
            "SPI_READ_FREQUENCY" => {
                self.bus.read_frequency = value.parse().map_err(|_| bad())?
            }
            "SPI_TOUCH_FREQUENCY" => {
                self.bus.touch_frequency = value.parse().map_err(|_| bad())?
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn signal_for_key(key: &str) -> Option<Signal> {
    Signal::ALL.into_iter().find(|s| s.macro_name() == key)
}
