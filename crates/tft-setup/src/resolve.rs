//! Resolution of a raw description into a validated configuration.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. driver exclusivity
//! 2. geometry bounds
//! 3. pin range, then pin collisions
//! 4. bus clocks: positivity, read against write, touch ceiling
//! 5. font set
//!
//! Resolution is a pure function of its input. It does not log and does not
//! touch hardware, so resolving the same description twice yields equal
//! results.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::driver::{DriverSelection, DriverVariant};
use crate::error::ConfigError;
use crate::fonts::{FontId, FontSet};
use crate::pins::{Level, Pin, PinAssignment, Signal};
use crate::raw::{RawBus, RawDescription, RawPanel, RawPins};
use crate::rotation::Rotation;
use crate::timing::{BusTiming, SpiPort, TOUCH_FREQUENCY_MAX};

/// A validated, immutable display configuration.
///
/// Only [`resolve`] constructs one, so every invariant holds for the
/// lifetime of the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedConfig {
    name: Option<String>,
    driver: DriverVariant,
    width: u16,
    height: u16,
    rotation: Rotation,
    pins: PinAssignment,
    bus: BusTiming,
    fonts: FontSet,
}

/// What the SPI transport needs to open the bus and drive the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransportConfig {
    pub cs: Pin,
    pub dc: Pin,
    pub rst: Pin,
    pub bl: Pin,
    pub backlight_on: Level,
    pub sclk: Pin,
    pub mosi: Pin,
    pub miso: Pin,
    pub write_frequency: u32,
    pub read_frequency: u32,
    pub port: SpiPort,
}

/// What the touch controller driver needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TouchConfig {
    pub cs: Pin,
    pub frequency: u32,
}

impl TouchConfig {
    /// Touch is wired only when its chip select is.
    pub fn is_enabled(&self) -> bool {
        self.cs.is_used()
    }
}

/// What the rendering and font layer needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderConfig {
    pub width: u16,
    pub height: u16,
    pub rotation: Rotation,
    pub fonts: Vec<FontId>,
    pub smooth: bool,
}

impl ResolvedConfig {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn driver(&self) -> DriverVariant {
        self.driver
    }

    /// Native (portrait) panel width.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Native (portrait) panel height.
    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Visible dimensions after the default rotation.
    pub fn dimensions(&self) -> (u16, u16) {
        self.rotation.dimensions(self.width, self.height)
    }

    pub fn pins(&self) -> &PinAssignment {
        &self.pins
    }

    pub fn bus(&self) -> &BusTiming {
        &self.bus
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            cs: self.pins.cs,
            dc: self.pins.dc,
            rst: self.pins.rst,
            bl: self.pins.bl,
            backlight_on: self.pins.backlight_on,
            sclk: self.pins.sclk,
            mosi: self.pins.mosi,
            miso: self.pins.miso,
            write_frequency: self.bus.write_frequency,
            read_frequency: self.bus.read_frequency,
            port: self.bus.port,
        }
    }

    pub fn touch(&self) -> TouchConfig {
        TouchConfig {
            cs: self.pins.touch_cs,
            frequency: self.bus.touch_frequency,
        }
    }

    pub fn render(&self) -> RenderConfig {
        RenderConfig {
            width: self.width,
            height: self.height,
            rotation: self.rotation,
            fonts: self.fonts.load.iter().copied().collect(),
            smooth: self.fonts.smooth,
        }
    }

    /// Returns the raw description this configuration resolves from.
    pub fn to_raw(&self) -> RawDescription {
        let mut pins = RawPins {
            backlight_on: self.pins.backlight_on,
            ..RawPins::default()
        };
        for (signal, pin) in self.pins.iter() {
            pins.set(signal, i32::from(pin));
        }

        RawDescription {
            name: self.name.clone(),
            drivers: DriverSelection::single(self.driver),
            panel: RawPanel {
                width: i64::from(self.width),
                height: i64::from(self.height),
                rotation: self.rotation,
            },
            pins,
            bus: RawBus {
                port: self.bus.port,
                write_frequency: i64::from(self.bus.write_frequency),
                read_frequency: i64::from(self.bus.read_frequency),
                touch_frequency: i64::from(self.bus.touch_frequency),
            },
            fonts: self.fonts.clone(),
        }
    }
}

/// Validates a raw description and produces an immutable configuration.
pub fn resolve(raw: RawDescription) -> Result<ResolvedConfig, ConfigError> {
    let driver = check_driver(&raw.drivers)?;
    let (width, height) = check_geometry(driver, &raw.panel)?;
    let pins = check_pins(driver, &raw.pins)?;
    let bus = check_bus(&raw.bus)?;
    check_fonts(&raw.fonts)?;

    Ok(ResolvedConfig {
        name: raw.name,
        driver,
        width,
        height,
        rotation: raw.panel.rotation,
        pins,
        bus,
        fonts: raw.fonts,
    })
}

fn check_driver(selection: &DriverSelection) -> Result<DriverVariant, ConfigError> {
    selection
        .exclusive()
        .ok_or_else(|| ConfigError::ConflictingDriverSelection {
            selected: selection.selected(),
        })
}

fn check_geometry(driver: DriverVariant, panel: &RawPanel) -> Result<(u16, u16), ConfigError> {
    let (max_width, max_height) = driver.max_dimensions();
    let invalid = || ConfigError::InvalidGeometry {
        width: panel.width,
        height: panel.height,
        max_width,
        max_height,
    };

    let width = u16::try_from(panel.width).map_err(|_| invalid())?;
    let height = u16::try_from(panel.height).map_err(|_| invalid())?;
    if width == 0 || height == 0 || width > max_width || height > max_height {
        return Err(invalid());
    }
    Ok((width, height))
}

fn check_pins(driver: DriverVariant, raw: &RawPins) -> Result<PinAssignment, ConfigError> {
    let mut resolved = [Pin::Unused; 8];
    for (slot, signal) in resolved.iter_mut().zip(Signal::ALL) {
        let pin = raw.get(signal);
        *slot = Pin::try_from(pin).map_err(|_| ConfigError::InvalidPin { signal, pin })?;
    }

    // Pin number -> signals bound to it, in ascending pin order.
    let mut by_pin: BTreeMap<u8, Vec<Signal>> = BTreeMap::new();
    for (signal, pin) in Signal::ALL.into_iter().zip(resolved) {
        if let Some(gpio) = pin.gpio() {
            by_pin.entry(gpio).or_default().push(signal);
        }
    }

    for (&pin, signals) in &by_pin {
        let colliding = colliding_signals(driver, signals);
        if !colliding.is_empty() {
            return Err(ConfigError::PinConflict {
                pin,
                signals: colliding,
            });
        }
    }

    let [cs, dc, rst, bl, sclk, mosi, miso, touch_cs] = resolved;
    Ok(PinAssignment {
        cs,
        dc,
        rst,
        bl,
        sclk,
        mosi,
        miso,
        touch_cs,
        backlight_on: raw.backlight_on,
    })
}

/// Signals on one pin that take part in at least one forbidden pairing.
fn colliding_signals(driver: DriverVariant, signals: &[Signal]) -> Vec<Signal> {
    signals
        .iter()
        .copied()
        .filter(|&a| {
            signals
                .iter()
                .any(|&b| a != b && !driver.permits_sharing(a, b))
        })
        .collect()
}

fn check_bus(raw: &RawBus) -> Result<BusTiming, ConfigError> {
    let write = positive_hz("write", raw.write_frequency)?;
    let read = positive_hz("read", raw.read_frequency)?;
    let touch = positive_hz("touch", raw.touch_frequency)?;

    if read > write {
        return Err(ConfigError::ReadFasterThanWrite { read, write });
    }
    if touch > TOUCH_FREQUENCY_MAX {
        return Err(ConfigError::TouchFrequencyTooHigh {
            touch,
            max: TOUCH_FREQUENCY_MAX,
        });
    }

    Ok(BusTiming {
        port: raw.port,
        write_frequency: write,
        read_frequency: read,
        touch_frequency: touch,
    })
}

fn positive_hz(field: &'static str, value: i64) -> Result<u32, ConfigError> {
    match u32::try_from(value) {
        Ok(hz) if hz > 0 => Ok(hz),
        _ => Err(ConfigError::InvalidFrequency { field, value }),
    }
}

fn check_fonts(fonts: &FontSet) -> Result<(), ConfigError> {
    if fonts.smooth && fonts.load.is_empty() {
        return Err(ConfigError::NoFontsSelected);
    }
    Ok(())
}


#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;
    use proptest::sample::{select, subsequence};

    /// Distinct GPIO numbers, each signal independently wired or left unused.
    fn pins() -> impl Strategy<Value = RawPins> {
        (
            subsequence((0i32..40).collect::<Vec<_>>(), Signal::ALL.len()).prop_shuffle(),
            proptest::collection::vec(any::<bool>(), Signal::ALL.len()),
            prop_oneof![Just(Level::High), Just(Level::Low)],
        )
            .prop_map(|(numbers, wired, backlight_on)| {
                let mut pins = RawPins {
                    backlight_on,
                    ..RawPins::default()
                };
                for ((signal, pin), used) in Signal::ALL.into_iter().zip(numbers).zip(wired) {
                    if used {
                        pins.set(signal, pin);
                    }
                }
                pins
            })
    }

    fn bus() -> impl Strategy<Value = RawBus> {
        (
            1i64..=80_000_000,
            1i64..=i64::from(TOUCH_FREQUENCY_MAX),
            prop_oneof![Just(SpiPort::Vspi), Just(SpiPort::Hspi)],
        )
            .prop_flat_map(|(write, touch, port)| {
                (1i64..=write).prop_map(move |read| RawBus {
                    port,
                    write_frequency: write,
                    read_frequency: read,
                    touch_frequency: touch,
                })
            })
    }

    fn fonts() -> impl Strategy<Value = FontSet> {
        (
            subsequence(FontId::ALL.to_vec(), 0..=FontId::ALL.len()),
            any::<bool>(),
        )
            .prop_map(|(load, smooth)| {
                let smooth = smooth && !load.is_empty();
                FontSet::new(load, smooth)
            })
    }

    fn valid_description() -> impl Strategy<Value = RawDescription> {
        select(DriverVariant::ALL.to_vec())
            .prop_flat_map(|driver| {
                let (max_width, max_height) = driver.max_dimensions();
                (
                    Just(driver),
                    proptest::option::of("[A-Za-z_]{1,16}"),
                    1..=i64::from(max_width),
                    1..=i64::from(max_height),
                    (0u8..4).prop_map(Rotation::from_index),
                    pins(),
                    bus(),
                    fonts(),
                )
            })
            .prop_map(
                |(driver, name, width, height, rotation, pins, bus, fonts)| RawDescription {
                    name,
                    drivers: DriverSelection::single(driver),
                    panel: RawPanel {
                        width,
                        height,
                        rotation,
                    },
                    pins,
                    bus,
                    fonts,
                },
            )
    }

    proptest! {
        #[test]
        fn valid_descriptions_round_trip(raw in valid_description()) {
            let config = resolve(raw.clone()).map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(config.to_raw(), raw.clone());

            let again = resolve(raw).map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(again, config);
        }

        #[test]
        fn several_drivers_always_conflict(
            drivers in subsequence(DriverVariant::ALL.to_vec(), 2..=DriverVariant::ALL.len()),
            width in any::<i64>(),
            height in any::<i64>(),
            raw_pins in proptest::collection::vec(any::<i32>(), Signal::ALL.len()),
            frequencies in (any::<i64>(), any::<i64>(), any::<i64>()),
            fonts in fonts()
        ) {
            let mut pins = RawPins::default();
            for (signal, pin) in Signal::ALL.into_iter().zip(raw_pins) {
                pins.set(signal, pin);
            }
            let (write, read, touch) = frequencies;
            let raw = RawDescription {
                name: None,
                drivers: drivers.iter().copied().collect(),
                panel: RawPanel {
                    width,
                    height,
                    rotation: Rotation::Portrait,
                },
                pins,
                bus: RawBus {
                    port: SpiPort::Vspi,
                    write_frequency: write,
                    read_frequency: read,
                    touch_frequency: touch,
                },
                fonts,
            };

            prop_assert_eq!(
                resolve(raw),
                Err(ConfigError::ConflictingDriverSelection { selected: drivers })
            );
        }
    }
}
