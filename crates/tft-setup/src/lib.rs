//! TFT Setup
//!
//! Validates a declarative TFT display setup (controller, pin map, panel
//! geometry, SPI clocks, fonts) and resolves it into an immutable
//! [`ResolvedConfig`] before any hardware I/O is attempted.

pub mod advisory;
pub mod driver;
pub mod error;
pub mod fonts;
pub mod loader;
pub mod pins;
pub mod preset;
pub mod raw;
pub mod resolve;
pub mod rotation;
pub mod shared;
pub mod timing;

pub use advisory::{advisories, Advisory};
pub use driver::{DriverSelection, DriverVariant};
pub use error::{ConfigError, Error, Result};
pub use fonts::{FontId, FontSet};
pub use pins::{Level, Pin, PinAssignment, Signal};
pub use preset::{defaults_for, preset, Preset};
pub use raw::{RawBus, RawDescription, RawPanel, RawPins};
pub use resolve::{resolve, RenderConfig, ResolvedConfig, TouchConfig, TransportConfig};
pub use rotation::Rotation;
pub use shared::SharedConfig;
pub use timing::{BusTiming, SpiPort, TOUCH_FREQUENCY_MAX};

/// Sentinel pin number for a signal tied to a fixed board signal.
pub const PIN_UNUSED: i32 = -1;
