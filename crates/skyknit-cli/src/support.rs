use crate::config::SkyknitConfig;
use serde::Serialize;
use skyknit_kernel::{Gauge, PrecisionLevel};
use skyknit_topology::TopologyRegistry;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exit status for bad input, bad configuration or unloadable tables.
pub const EXIT_USAGE: i32 = 2;
/// Exit status when the input was read but rejected.
pub const EXIT_REJECTED: i32 = 1;

pub fn load_config_or_exit(explicit: Option<&Path>) -> SkyknitConfig {
    SkyknitConfig::load(explicit).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_USAGE);
    })
}

/// The flag wins, then `topology.data_dir`, then the compiled-in tables.
pub fn load_registry_or_exit(
    data_dir: Option<PathBuf>,
    config: &SkyknitConfig,
) -> Cow<'static, TopologyRegistry> {
    let dir = data_dir.or_else(|| config.topology.data_dir.clone());
    let registry = match &dir {
        Some(dir) => match TopologyRegistry::load_from_dir(dir) {
            Ok(registry) => Cow::Owned(registry),
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(EXIT_USAGE);
            }
        },
        None => match skyknit_topology::registry() {
            Ok(registry) => Cow::Borrowed(registry),
            Err(e) => {
                eprintln!("error: built-in topology tables failed to load: {e}");
                std::process::exit(EXIT_USAGE);
            }
        },
    };
    let source = dir.map_or_else(|| "built-in".to_string(), |dir| dir.display().to_string());
    debug!(%source, digest = registry.digest(), "topology registry loaded");
    registry
}

pub fn read_json_file_or_exit<T>(path: &str, label: &str) -> T
where
    T: serde::de::DeserializeOwned,
{
    let bytes = fs::read(path).unwrap_or_else(|e| {
        eprintln!("error: failed to read {label} at {path}: {e}");
        std::process::exit(EXIT_USAGE);
    });
    serde_json::from_slice::<T>(&bytes).unwrap_or_else(|e| {
        eprintln!("error: failed to parse {label} JSON at {path}: {e}");
        std::process::exit(EXIT_USAGE);
    })
}

pub fn print_json<T: Serialize>(payload: &T, label: &str) {
    let rendered = serde_json::to_string_pretty(payload).unwrap_or_else(|e| {
        eprintln!("error: failed to render {label} payload: {e}");
        std::process::exit(EXIT_USAGE);
    });
    println!("{rendered}");
}

pub fn gauge_or_exit(spi: f64, rpi: f64) -> Gauge {
    Gauge::new(spi, rpi).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_USAGE);
    })
}

/// The flag wins over `tolerance.precision`.
pub fn precision_or_exit(flag: Option<&str>, config: &SkyknitConfig) -> PrecisionLevel {
    match flag {
        Some(value) => value.parse().unwrap_or_else(|e| {
            eprintln!("error: {e}");
            std::process::exit(EXIT_USAGE);
        }),
        None => config.tolerance.precision,
    }
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
