//! Logging configuration
//!
//! `level` is the baseline for every target; each `-v` on the command line
//! raises it one step. `directives` are appended verbatim as `EnvFilter`
//! directives, so `tower_http=debug` turns on per-request spans without
//! raising everything else. `RUST_LOG` overrides the whole lot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Log severity, quietest first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const LADDER: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// `steps` levels more verbose, stopping at trace
    pub fn raised(self, steps: u8) -> Self {
        let target = (self as usize).saturating_add(steps as usize);
        Self::LADDER[target.min(Self::LADDER.len() - 1)]
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::LADDER
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown log level '{}' (expected error, warn, info, debug or trace)", s))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Extra `target=level` filter directives
    pub directives: Vec<String>,
}

impl LoggingConfig {
    /// Filter string for `EnvFilter`, with the base level raised by `verbose`
    pub fn filter_directives(&self, verbose: u8) -> String {
        let mut filter = self.level.raised(verbose).as_str().to_string();
        for directive in &self.directives {
            filter.push(',');
            filter.push_str(directive.trim());
        }
        filter
    }

    /// Problems with `directives`, one message each
    pub(crate) fn directive_errors(&self) -> Vec<String> {
        self.directives
            .iter()
            .filter_map(|d| {
                let d = d.trim();
                if d.is_empty() {
                    Some("logging directives must not be empty".to_string())
                } else if d.contains(',') || d.contains(char::is_whitespace) {
                    Some(format!("logging directive '{}' must be a single target=level pair", d))
                } else {
                    None
                }
            })
            .collect()
    }
}
