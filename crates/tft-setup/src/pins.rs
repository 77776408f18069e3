//! Logical signals and their physical pins.

use crate::{Error, Result, PIN_UNUSED};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Logical signals a display setup wires to pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Panel chip select.
    Cs,
    /// Data/command select.
    Dc,
    /// Panel reset.
    Rst,
    /// Backlight control.
    Bl,
    /// SPI clock.
    Sclk,
    /// SPI data out.
    Mosi,
    /// SPI data in.
    Miso,
    /// Touch controller chip select.
    TouchCs,
}

impl Signal {
    /// Every signal, in declaration order.
    pub const ALL: [Signal; 8] = [
        Signal::Cs,
        Signal::Dc,
        Signal::Rst,
        Signal::Bl,
        Signal::Sclk,
        Signal::Mosi,
        Signal::Miso,
        Signal::TouchCs,
    ];

    /// Name of the header macro that historically held this pin.
    pub fn macro_name(&self) -> &'static str {
        match self {
            Signal::Cs => "TFT_CS",
            Signal::Dc => "TFT_DC",
            Signal::Rst => "TFT_RST",
            Signal::Bl => "TFT_BL",
            Signal::Sclk => "TFT_SCLK",
            Signal::Mosi => "TFT_MOSI",
            Signal::Miso => "TFT_MISO",
            Signal::TouchCs => "TOUCH_CS",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Cs => write!(f, "cs"),
            Signal::Dc => write!(f, "dc"),
            Signal::Rst => write!(f, "rst"),
            Signal::Bl => write!(f, "bl"),
            Signal::Sclk => write!(f, "sclk"),
            Signal::Mosi => write!(f, "mosi"),
            Signal::Miso => write!(f, "miso"),
            Signal::TouchCs => write!(f, "touch_cs"),
        }
    }
}

/// A physical pin, or none when the signal is tied to a fixed board line.
///
/// Serialized as the pin number, with `-1` for [`Pin::Unused`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Pin {
    /// Not independently controlled.
    #[default]
    Unused,
    /// GPIO number.
    Gpio(u8),
}

impl Pin {
    /// Returns the GPIO number if the pin is used.
    pub fn gpio(&self) -> Option<u8> {
        match self {
            Pin::Gpio(n) => Some(*n),
            Pin::Unused => None,
        }
    }

    pub fn is_used(&self) -> bool {
        matches!(self, Pin::Gpio(_))
    }
}

impl TryFrom<i32> for Pin {
    type Error = String;

    fn try_from(value: i32) -> std::result::Result<Self, Self::Error> {
        if value == PIN_UNUSED {
            return Ok(Pin::Unused);
        }
        u8::try_from(value)
            .map(Pin::Gpio)
            .map_err(|_| format!("pin {} out of range (expected -1 or 0-255)", value))
    }
}

impl From<Pin> for i32 {
    fn from(pin: Pin) -> Self {
        match pin {
            Pin::Gpio(n) => i32::from(n),
            Pin::Unused => PIN_UNUSED,
        }
    }
}

impl std::fmt::Display for Pin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pin::Gpio(n) => write!(f, "{}", n),
            Pin::Unused => write!(f, "unused"),
        }
    }
}

/// Logic level that turns the backlight on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    High,
    Low,
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "high" | "1" => Ok(Level::High),
            "low" | "0" => Ok(Level::Low),
            _ => Err(Error::InvalidLevel(s.to_string())),
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::High => write!(f, "high"),
            Level::Low => write!(f, "low"),
        }
    }
}

/// Validated pin map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PinAssignment {
    pub cs: Pin,
    pub dc: Pin,
    pub rst: Pin,
    pub bl: Pin,
    pub sclk: Pin,
    pub mosi: Pin,
    pub miso: Pin,
    pub touch_cs: Pin,
    pub backlight_on: Level,
}

impl PinAssignment {
    /// Returns the pin bound to a signal.
    pub fn get(&self, signal: Signal) -> Pin {
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

    /// Iterates over all signals and their pins in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Signal, Pin)> + '_ {
        Signal::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}
