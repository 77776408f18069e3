//! TFT Setup Tool
//!
//! Checks display setup files before firmware touches the hardware, prints
//! baseline templates, and watches a setup file for live reconfiguration.

mod watch;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tft_setup::timing::format_hz;
use tft_setup::{
    advisories, defaults_for, preset, resolve, DriverVariant, Preset, RawDescription,
    ResolvedConfig,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// JSON document of the resolved configuration
    Json,
    /// TOML setup description
    Toml,
}

#[derive(Parser)]
#[command(name = "tftsetup")]
#[command(about = "Check and resolve TFT display setups")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Apply TFT_* / SPI_* / TOUCH_CS environment variables on top of the file
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a setup file and report the first problem found
    Check {
        /// Setup file (TOML)
        file: PathBuf,
    },
    /// Resolve a setup file and print the result
    Show {
        /// Setup file (TOML)
        file: PathBuf,

        /// Output format
        #[arg(long, default_value = "text", value_enum)]
        format: OutputFormat,
    },
    /// Print a baseline setup for a driver or a named preset
    Template {
        /// Driver name (e.g. ili9341, st7789-2)
        #[arg(long, conflicts_with = "preset")]
        driver: Option<String>,

        /// Preset name (e.g. hspi-touch)
        #[arg(long)]
        preset: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List supported drivers
    Drivers,
    /// List named presets
    Presets,
    /// Re-resolve a setup file whenever it changes
    Watch {
        /// Setup file (TOML)
        file: PathBuf,

        /// Poll interval in milliseconds (100-60000)
        #[arg(long, default_value = "1000")]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Check { file } => handle_check(&file, cli.env),
        Commands::Show { file, format } => handle_show(&file, format, cli.env),
        Commands::Template {
            driver,
            preset,
            output,
        } => handle_template(driver, preset, output),
        Commands::Drivers => handle_drivers(),
        Commands::Presets => handle_presets(),
        Commands::Watch { file, interval } => {
            if !(100..=60000).contains(&interval) {
                anyhow::bail!("Poll interval must be between 100 and 60000 milliseconds");
            }
            watch::run(file, interval, cli.env).await
        }
    }
}

/// Loads a description, optionally layering environment overrides on top.
pub(crate) fn load_description(file: &Path, use_env: bool) -> Result<RawDescription> {
    let mut raw = RawDescription::load(file)
        .with_context(|| format!("Failed to load setup file {}", file.display()))?;
    if use_env {
        let applied = raw
            .apply_overrides(unicode_vars(std::env::vars_os()))
            .context("Invalid environment override")?;
        info!("Applied {} environment overrides", applied);
    }
    Ok(raw)
}

/// Keeps the variables that are valid Unicode; overrides are never anything else.
fn unicode_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter().filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
        (Ok(key), Ok(value)) => Some((key, value)),
        (key, _) => {
            debug!("Skipping non-Unicode environment variable {:?}", key);
            None
        }
    })
}

/// Loads and resolves, refusing to continue on any error.
fn load_resolved(file: &Path, use_env: bool) -> Result<ResolvedConfig> {
    let raw = load_description(file, use_env)?;
    let config = resolve(raw).with_context(|| {
        format!(
            "Invalid setup in {}, display must not be initialized",
            file.display()
        )
    })?;
    for advisory in advisories(&config) {
        warn!("{}", advisory);
    }
    Ok(config)
}

fn handle_check(file: &Path, use_env: bool) -> Result<()> {
    let config = load_resolved(file, use_env)?;
    let (width, height) = config.dimensions();
    println!(
        "OK: {} {}x{} ({})",
        config.driver(),
        width,
        height,
        config.rotation()
    );
    Ok(())
}

fn handle_show(file: &Path, format: OutputFormat, use_env: bool) -> Result<()> {
    let config = load_resolved(file, use_env)?;
    match format {
        OutputFormat::Text => print_summary(&config),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&config)
                .context("Failed to serialize configuration")?;
            println!("{}", json);
        }
        OutputFormat::Toml => {
            let text = config
                .to_raw()
                .to_toml_string()
                .context("Failed to serialize configuration")?;
            print!("{}", text);
        }
    }
    Ok(())
}

fn print_summary(config: &ResolvedConfig) {
    let transport = config.transport();
    let touch = config.touch();
    let render = config.render();

    if let Some(name) = config.name() {
        println!("Setup: {}", name);
    }
    println!("Panel:");
    println!("  Driver: {}", config.driver());
    println!("  Size: {}x{}", render.width, render.height);
    println!(
        "  Rotation: {} ({})",
        render.rotation,
        render.rotation.index()
    );
    println!("Transport:");
    println!("  Port: {}", transport.port);
    println!(
        "  CS: {}  DC: {}  RST: {}",
        transport.cs, transport.dc, transport.rst
    );
    println!(
        "  SCLK: {}  MOSI: {}  MISO: {}",
        transport.sclk, transport.mosi, transport.miso
    );
    println!(
        "  Backlight: {} (on = {})",
        transport.bl, transport.backlight_on
    );
    println!("  Write clock: {}", format_hz(transport.write_frequency));
    println!("  Read clock: {}", format_hz(transport.read_frequency));
    println!("Touch:");
    if touch.is_enabled() {
        println!("  CS: {}", touch.cs);
        println!("  Clock: {}", format_hz(touch.frequency));
    } else {
        println!("  (not wired)");
    }
    println!("Fonts:");
    let names: Vec<String> = render
        .fonts
        .iter()
        .map(|f| match f.number() {
            Some(n) => format!("{} ({})", f, n),
            None => f.to_string(),
        })
        .collect();
    println!(
        "  Loaded: {}",
        if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        }
    );
    println!("  Smooth: {}", if render.smooth { "yes" } else { "no" });
    println!(
        "  Flash estimate: {} bytes",
        config.fonts().flash_estimate()
    );
}

fn handle_template(
    driver: Option<String>,
    preset_name: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let raw = match (driver, preset_name) {
        (_, Some(name)) => preset(name.parse::<Preset>()?),
        (Some(name), None) => defaults_for(name.parse::<DriverVariant>()?),
        (None, None) => anyhow::bail!("Specify --driver or --preset"),
    };

    let text = raw
        .to_toml_string()
        .context("Failed to serialize template")?;
    match output {
        Some(path) => {
            std::fs::write(&path, text).context("Failed to write template file")?;
            println!("Template saved to: {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn handle_drivers() -> Result<()> {
    println!("Supported drivers:");
    for driver in DriverVariant::ALL {
        let (width, height) = driver.max_dimensions();
        let shared: Vec<String> = driver
            .shared_pins()
            .iter()
            .map(|(a, b)| format!("{}/{}", a, b))
            .collect();
        println!(
            "  {:<10} {}x{}, rated {}{}",
            driver.to_string(),
            width,
            height,
            format_hz(driver.rated_write_frequency()),
            if shared.is_empty() {
                String::new()
            } else {
                format!(", may share {}", shared.join(", "))
            }
        );
    }
    Ok(())
}

fn handle_presets() -> Result<()> {
    println!("Available presets:");
    for p in Preset::ALL {
        println!("  {:<24} {}", p.to_string(), p.description());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::ffi::OsStringExt;
    use tft_setup::{ConfigError, Preset};

    fn temp_setup(tag: &str, text: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "tftsetup-main-{}-{}.toml",
            tag,
            std::process::id()
        ));
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_non_unicode_variables_are_skipped() {
        let vars = vec![
            (OsString::from("BADVAR"), OsString::from_vec(vec![0xff])),
            (OsString::from_vec(vec![b'X', 0xfe]), OsString::from("1")),
            (OsString::from("TFT_RST"), OsString::from("-1")),
        ];

        let mut raw = preset(Preset::HspiTouch);
        let applied = raw.apply_overrides(unicode_vars(vars)).unwrap();
        assert_eq!(applied, 1);
        assert_eq!(raw.pins.rst, tft_setup::PIN_UNUSED);
    }

    #[test]
    fn test_invalid_setup_is_refused() {
        let mut raw = preset(Preset::HspiTouch);
        raw.bus.touch_frequency = 10_000_000;
        let path = temp_setup("touch", &raw.to_toml_string().unwrap());

        let err = load_resolved(&path, false).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::TouchFrequencyTooHigh {
                touch: 10_000_000,
                ..
            })
        ));
    }

    #[test]
    fn test_valid_setup_resolves() {
        let text = include_str!("../../../setups/user_setup.toml");
        let path = temp_setup("valid", text);

        let config = load_resolved(&path, false).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.driver(), DriverVariant::Ili9341Alt);
        assert!(config.touch().is_enabled());
    }
}
