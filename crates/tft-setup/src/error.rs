//! Error types for TFT setup loading and resolution.

use thiserror::Error;

use crate::driver::DriverVariant;
use crate::pins::Signal;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a raw description fails to resolve.
///
/// Every variant carries the offending values so the hosting program can
/// report them without re-inspecting the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Zero or several driver variants selected.
    #[error("exactly one driver must be selected, got {}", format_drivers(.selected))]
    ConflictingDriverSelection { selected: Vec<DriverVariant> },

    /// Panel dimensions non-positive or beyond the controller's maximum.
    #[error(
        "invalid panel geometry {width}x{height} (driver supports up to {max_width}x{max_height})"
    )]
    InvalidGeometry {
        width: i64,
        height: i64,
        max_width: u16,
        max_height: u16,
    },

    /// Pin number outside the addressable range.
    #[error("invalid pin {pin} for {signal} (expected -1 or 0-255)")]
    InvalidPin { signal: Signal, pin: i32 },

    /// Signals that must be physically distinct share a pin.
    #[error("pin {pin} is assigned to {}", format_signals(.signals))]
    PinConflict { pin: u8, signals: Vec<Signal> },

    /// A bus clock is zero or negative.
    #[error("{field} frequency must be positive, got {value} Hz")]
    InvalidFrequency { field: &'static str, value: i64 },

    /// Read clock above the write clock.
    #[error("read frequency {read} Hz exceeds write frequency {write} Hz")]
    ReadFasterThanWrite { read: u32, write: u32 },

    /// Touch clock above the touch controller ceiling.
    #[error("touch frequency {touch} Hz exceeds controller maximum {max} Hz")]
    TouchFrequencyTooHigh { touch: u32, max: u32 },

    /// Smooth fonts requested without any font to smooth.
    #[error("font smoothing requested but no fonts are selected")]
    NoFontsSelected,
}

fn format_drivers(selected: &[DriverVariant]) -> String {
    if selected.is_empty() {
        return "none".to_string();
    }
    selected
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_signals(signals: &[Signal]) -> String {
    signals
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Errors raised while loading or parsing a description.
#[derive(Error, Debug)]
pub enum Error {
    /// Description failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Setup file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML syntax or schema error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Override value could not be parsed for its key.
    #[error("invalid override {key}={value}")]
    Override { key: String, value: String },

    /// Invalid rotation value.
    #[error("Invalid rotation: {0}")]
    InvalidRotation(String),

    /// Unknown driver name.
    #[error("Invalid driver: {0}")]
    InvalidDriver(String),

    /// Unknown font name.
    #[error("Invalid font: {0}")]
    InvalidFont(String),

    /// Unknown preset name.
    #[error("Invalid preset: {0}")]
    InvalidPreset(String),

    /// Unknown SPI port name.
    #[error("Invalid SPI port: {0}")]
    InvalidSpiPort(String),

    /// Unknown logic level.
    #[error("Invalid level: {0}")]
    InvalidLevel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_conflict_message() {
        let err = ConfigError::PinConflict {
            pin: 2,
            signals: vec![Signal::Dc, Signal::Rst],
        };
        assert_eq!(err.to_string(), "pin 2 is assigned to dc and rst");
    }

    #[test]
    fn test_driver_selection_message() {
        let err = ConfigError::ConflictingDriverSelection { selected: vec![] };
        assert!(err.to_string().ends_with("got none"));

        let err = ConfigError::ConflictingDriverSelection {
            selected: vec![DriverVariant::Ili9341, DriverVariant::St7789],
        };
        assert!(err.to_string().ends_with("got ili9341, st7789"));
    }

    #[test]
    fn test_config_error_converts() {
        let err: Error = ConfigError::NoFontsSelected.into();
        assert!(matches!(err, Error::Config(ConfigError::NoFontsSelected)));
    }
}
