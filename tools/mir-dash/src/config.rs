//! Dashboard configuration.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use mir_matrix::{CheckpointKeyRule, RenderOptions, SchemaVersion};

/// Delays the auto-processor can be cycled through, in milliseconds.
pub const AUTO_PROCESS_DELAYS_MS: [u64; 4] = [0, 50, 500, 1500];

/// Whether nodes with pending actions are processed without a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoProcess {
    /// Only the `p` key issues process commands
    #[default]
    Off,
    /// Process every busy node this long after each poll
    Delay(Duration),
}

impl AutoProcess {
    pub fn delay(&self) -> Option<Duration> {
        match self {
            AutoProcess::Off => None,
            AutoProcess::Delay(d) => Some(*d),
        }
    }

    /// Off -> 0ms -> 50ms -> 500ms -> 1500ms -> Off.
    pub fn cycle(self) -> Self {
        let next_ms = match self {
            AutoProcess::Off => AUTO_PROCESS_DELAYS_MS.first().copied(),
            AutoProcess::Delay(d) => {
                let current = d.as_millis() as u64;
                AUTO_PROCESS_DELAYS_MS.iter().copied().find(|ms| *ms > current)
            }
        };
        next_ms
            .map(|ms| AutoProcess::Delay(Duration::from_millis(ms)))
            .unwrap_or(AutoProcess::Off)
    }
}

impl fmt::Display for AutoProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutoProcess::Off => write!(f, "manual"),
            AutoProcess::Delay(d) => write!(f, "{}ms", d.as_millis()),
        }
    }
}

impl FromStr for AutoProcess {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "off" || s == "manual" {
            return Ok(AutoProcess::Off);
        }
        let ms: u64 = s
            .trim_end_matches("ms")
            .parse()
            .map_err(|_| format!("invalid auto-process mode '{s}' (expected off, 0, 50, 500 or 1500)"))?;
        if AUTO_PROCESS_DELAYS_MS.contains(&ms) {
            Ok(AutoProcess::Delay(Duration::from_millis(ms)))
        } else {
            Err(format!("unsupported auto-process delay {ms}ms (expected 0, 50, 500 or 1500)"))
        }
    }
}

/// Resolved dashboard settings.
#[derive(Debug, Clone)]
pub struct DashConfig {
    /// Base URL of the status server
    pub endpoint: String,

    /// Interval between status polls
    pub refresh: Duration,

    /// Sequence code schema the server speaks
    pub schema: SchemaVersion,

    /// How checkpoint `seqNo` values map to columns
    pub checkpoint_keys: CheckpointKeyRule,

    /// Run against the in-process demo cluster
    pub demo: bool,

    /// Print one rendered matrix as JSON and exit
    pub dump: bool,

    /// Log file used while the terminal UI owns stdout
    pub log_file: PathBuf,

    pub auto_process: AutoProcess,

    /// Log filter directive (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:10000".to_string(),
            refresh: Duration::from_millis(1000),
            schema: SchemaVersion::V1,
            checkpoint_keys: CheckpointKeyRule::Absolute,
            demo: false,
            dump: false,
            log_file: PathBuf::from("mir-dash.log"),
            auto_process: AutoProcess::Off,
            log_level: "info".to_string(),
        }
    }
}

impl DashConfig {
    /// Defaults with the log level taken from `MIR_DASH_LOG` or `RUST_LOG`.
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("MIR_DASH_LOG")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),
            ..Self::default()
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::for_schema(self.schema).with_checkpoint_keys(self.checkpoint_keys)
    }

    /// Where the status data comes from, for the header.
    pub fn source_label(&self) -> String {
        if self.demo {
            "demo cluster".to_string()
        } else {
            self.endpoint.clone()
        }
    }
}
