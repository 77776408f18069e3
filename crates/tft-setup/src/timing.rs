//! SPI bus clocks and port selection.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// XPT2046 touch controller clock ceiling in Hz.
pub const TOUCH_FREQUENCY_MAX: u32 = 2_500_000;

/// SPI peripheral the transport opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpiPort {
    #[default]
    Vspi,
    Hspi,
}

impl FromStr for SpiPort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "vspi" => Ok(SpiPort::Vspi),
            "hspi" | "use_hspi_port" => Ok(SpiPort::Hspi),
            _ => Err(Error::InvalidSpiPort(s.to_string())),
        }
    }
}

impl std::fmt::Display for SpiPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpiPort::Vspi => write!(f, "vspi"),
            SpiPort::Hspi => write!(f, "hspi"),
        }
    }
}

/// Validated bus clocks, all in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BusTiming {
    pub port: SpiPort,
    pub write_frequency: u32,
    pub read_frequency: u32,
    pub touch_frequency: u32,
}

/// Formats a frequency the way datasheets print it.
pub fn format_hz(hz: u32) -> String {
    if hz >= 1_000_000 && hz % 100_000 == 0 {
        let mhz = hz as f64 / 1_000_000.0;
        format!("{} MHz", mhz)
    } else if hz >= 1_000 && hz % 1_000 == 0 {
        format!("{} kHz", hz / 1_000)
    } else {
        format!("{} Hz", hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spi_port_from_str() {
        assert_eq!("HSPI".parse::<SpiPort>().unwrap(), SpiPort::Hspi);
        assert_eq!("USE_HSPI_PORT".parse::<SpiPort>().unwrap(), SpiPort::Hspi);
        assert!("qspi".parse::<SpiPort>().is_err());
    }

    #[test]
    fn test_format_hz() {
        assert_eq!(format_hz(40_000_000), "40 MHz");
        assert_eq!(format_hz(2_500_000), "2.5 MHz");
        assert_eq!(format_hz(400_000), "400 kHz");
        assert_eq!(format_hz(1_234), "1234 Hz");
    }
}
