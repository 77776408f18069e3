//! Non-fatal observations about a resolved configuration.
//!
//! Advisories never affect whether a description resolves. The hosting
//! program decides whether to print them.

use crate::driver::DriverVariant;
use crate::resolve::ResolvedConfig;
use crate::timing::format_hz;

/// Something worth telling the user about a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// Write clock above what the controller is rated for.
    WriteAboveRated {
        driver: DriverVariant,
        write: u32,
        rated: u32,
    },
    /// Backlight has no control pin, so it cannot be dimmed or switched off.
    BacklightUncontrolled,
    /// Panel reset follows the board reset only.
    ResetTiedToBoard,
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Advisory::WriteAboveRated {
                driver,
                write,
                rated,
            } => write!(
                f,
                "write clock {} is above the {} rating of {}",
                format_hz(*write),
                driver,
                format_hz(*rated)
            ),
            Advisory::BacklightUncontrolled => {
                write!(f, "backlight is not on a GPIO and stays on permanently")
            }
            Advisory::ResetTiedToBoard => {
                write!(f, "panel reset is tied to the board reset")
            }
        }
    }
}

/// Collects advisories for a configuration.
pub fn advisories(config: &ResolvedConfig) -> Vec<Advisory> {
    let mut out = Vec::new();

    let rated = config.driver().rated_write_frequency();
    if config.bus().write_frequency > rated {
        out.push(Advisory::WriteAboveRated {
            driver: config.driver(),
            write: config.bus().write_frequency,
            rated,
        });
    }
    if !config.pins().bl.is_used() {
        out.push(Advisory::BacklightUncontrolled);
    }
    if !config.pins().rst.is_used() {
        out.push(Advisory::ResetTiedToBoard);
    }

    out
}
