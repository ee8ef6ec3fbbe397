//! Public and internal types for the sigflow API and pipeline.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::utils::config::{DEFAULT_DELIMITER, ReferenceLatency};

/// One value flowing between stages. Seeds enter as `Int` or `Text`; every derived value is `Text`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Item {
    Int(i64),
    Text(String),
    /// Raw payload. No shipped stage accepts it.
    Bytes(Vec<u8>),
}

/// Tag of an [`Item`], used by stages to declare what they accept and emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Int,
    Text,
    Bytes,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemKind::Int => "int",
            ItemKind::Text => "text",
            ItemKind::Bytes => "bytes",
        };
        f.write_str(s)
    }
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Int(_) => ItemKind::Int,
            Item::Text(_) => ItemKind::Text,
            Item::Bytes(_) => ItemKind::Bytes,
        }
    }

    /// Borrow the string of a `Text` item.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Item::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Consume a `Text` item into its string.
    pub fn into_text(self) -> Option<String> {
        match self {
            Item::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a CLI / config seed: integers become `Int`, anything else `Text`.
    pub fn parse_seed(raw: &str) -> Item {
        match raw.trim().parse::<i64>() {
            Ok(n) => Item::Int(n),
            Err(_) => Item::Text(raw.to_string()),
        }
    }
}

impl From<i64> for Item {
    fn from(n: i64) -> Self {
        Item::Int(n)
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Item::Text(s.to_string())
    }
}

impl From<String> for Item {
    fn from(s: String) -> Self {
        Item::Text(s)
    }
}

/// Outer per-item concurrency of a fan-out stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Concurrency {
    /// One task per incoming item, no upper bound.
    #[default]
    PerItem,
    /// Fixed pool of workers pulling from the stage's inbox. Zero is treated as one.
    Workers(usize),
}

impl Concurrency {
    /// `None` → [`Concurrency::PerItem`], `Some(n)` → [`Concurrency::Workers`].
    pub fn from_workers(workers: Option<usize>) -> Self {
        match workers {
            Some(n) => Concurrency::Workers(n.max(1)),
            None => Concurrency::PerItem,
        }
    }
}

/// Artificial delay added to each primitive call, simulating a slow external service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HashLatency {
    pub cheap: Duration,
    pub expensive: Duration,
}

impl HashLatency {
    /// Delays of the rate-limited reference service (1 s checksum, 10 ms digest).
    pub fn reference() -> Self {
        Self {
            cheap: ReferenceLatency::CHEAP,
            expensive: ReferenceLatency::EXPENSIVE,
        }
    }
}

/// Lib options for [`sign_seeds`](crate::sign_seeds).
#[derive(Clone, Debug)]
pub struct SignOpts {
    /// Outer per-item concurrency for the paired and indexed digest stages.
    pub concurrency: Concurrency,
    /// Joins the collector's sorted items.
    pub delimiter: String,
    /// Simulated primitive latency. Zero by default.
    pub latency: HashLatency,
}

impl Default for SignOpts {
    fn default() -> Self {
        Self {
            concurrency: Concurrency::default(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            latency: HashLatency::default(),
        }
    }
}

/// Full options (CLI). Built from defaults, then `.sigflow.toml`, then flags.
#[derive(Clone, Debug)]
pub struct Opts {
    pub seeds: Vec<Item>,
    pub workers: Option<usize>,
    pub delimiter: String,
    /// Use [`HashLatency::reference`] instead of zero latency.
    pub latency: bool,
    /// Print a JSON report instead of the bare result.
    pub json: bool,
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            seeds: crate::utils::config::DEFAULT_SEEDS
                .iter()
                .map(|&n| Item::Int(n))
                .collect(),
            workers: None,
            delimiter: DEFAULT_DELIMITER.to_string(),
            latency: false,
            json: false,
            verbose: false,
        }
    }
}

impl From<&Opts> for SignOpts {
    fn from(o: &Opts) -> Self {
        SignOpts {
            concurrency: Concurrency::from_workers(o.workers),
            delimiter: o.delimiter.clone(),
            latency: if o.latency {
                HashLatency::reference()
            } else {
                HashLatency::default()
            },
        }
    }
}

/// Summary printed by the CLI in `--json` mode.
#[derive(Debug, Serialize)]
pub struct SignReport {
    pub result: String,
    pub items: usize,
    pub elapsed_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_seed_numeric_and_text() {
        assert_eq!(Item::parse_seed("42"), Item::Int(42));
        assert_eq!(Item::parse_seed("-3"), Item::Int(-3));
        assert_eq!(Item::parse_seed("abc"), Item::Text("abc".to_string()));
    }

    #[test]
    fn workers_zero_clamped_to_one() {
        assert_eq!(Concurrency::from_workers(Some(0)), Concurrency::Workers(1));
        assert_eq!(Concurrency::from_workers(None), Concurrency::PerItem);
    }
}
