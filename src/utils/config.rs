//! Application configuration constants.
//! Separators, fan-out widths and timing in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Config file looked up in the working directory when `--config` is not given.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Digest format ----

/// Joins the two halves of a paired digest.
pub const PAIR_SEPARATOR: &str = "~";

/// Default delimiter the collector puts between sorted items.
pub const DEFAULT_DELIMITER: &str = "_";

/// Number of indexed checksums computed per item by the indexed digest stage.
pub const INDEXED_FAN_OUT: usize = 6;

/// Seeds used by the CLI when none are given (first Fibonacci numbers).
pub const DEFAULT_SEEDS: [i64; 6] = [0, 1, 1, 2, 3, 5];

// ---- Timing ----

/// How often a stage blocked on its inbox rechecks the cancel flag.
pub const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Latencies of the rate-limited reference service, used with `--latency`.
pub struct ReferenceLatency;

impl ReferenceLatency {
    pub const CHEAP: Duration = Duration::from_secs(1);
    pub const EXPENSIVE: Duration = Duration::from_millis(10);
}
