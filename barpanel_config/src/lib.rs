#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the operator panel.
//!
//! Deserialized from TOML and validated before the panel starts. Every knob
//! has a default matching the machine's stock behavior (30 s hose polling,
//! 5 s success auto-dismiss, 20% low-level threshold).
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    /// Base URL of the machine backend, e.g. "http://barmachine.local:5000"
    pub base_url: String,
    /// Request timeout for device actions (ms)
    pub timeout_ms: u64,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Feed {
    /// Path of the server-push event stream on the backend
    pub path: String,
    /// Delay before reconnecting after the stream drops (ms)
    pub reconnect_ms: u64,
}

impl Default for Feed {
    fn default() -> Self {
        Self {
            path: "/events".to_string(),
            reconnect_ms: 2000,
        }
    }
}

/// What to do with the optimistic "active" control highlight when a start
/// action fails. The stock panel keeps it lit.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RollbackMode {
    #[default]
    Keep,
    Revert,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Panel {
    /// Whether the hose-level display is present; when false the poller
    /// never starts.
    pub hose_display: bool,
    /// Hose status poll interval (seconds)
    pub poll_interval_s: u64,
    /// Flag a hose as low below this fill percent
    pub low_threshold_pct: f32,
    /// Auto-dismiss delay for the success acknowledgment (seconds)
    pub success_dismiss_s: u64,
    /// Optimistic-highlight policy on failed start actions
    pub rollback: RollbackMode,
}

impl Default for Panel {
    fn default() -> Self {
        Self {
            hose_display: true,
            poll_interval_s: 30,
            low_threshold_pct: 20.0,
            success_dismiss_s: 5,
            rollback: RollbackMode::Keep,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: Server,
    pub feed: Feed,
    pub panel: Panel,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Server
        if self.server.base_url.is_empty() {
            eyre::bail!("server.base_url must not be empty");
        }
        if !(self.server.base_url.starts_with("http://")
            || self.server.base_url.starts_with("https://"))
        {
            eyre::bail!("server.base_url must start with http:// or https://");
        }
        if self.server.timeout_ms == 0 {
            eyre::bail!("server.timeout_ms must be >= 1");
        }

        // Feed
        if !self.feed.path.starts_with('/') {
            eyre::bail!("feed.path must start with '/'");
        }
        if self.feed.reconnect_ms == 0 {
            eyre::bail!("feed.reconnect_ms must be >= 1");
        }

        // Panel
        if self.panel.poll_interval_s == 0 {
            eyre::bail!("panel.poll_interval_s must be >= 1");
        }
        if self.panel.poll_interval_s > 60 * 60 {
            eyre::bail!("panel.poll_interval_s is unreasonably large (>1h)");
        }
        if !(0.0..=100.0).contains(&self.panel.low_threshold_pct) {
            eyre::bail!("panel.low_threshold_pct must be in [0, 100]");
        }
        if self.panel.success_dismiss_s == 0 {
            eyre::bail!("panel.success_dismiss_s must be >= 1");
        }
        if self.panel.success_dismiss_s > 5 * 60 {
            eyre::bail!("panel.success_dismiss_s is unreasonably large (>5min)");
        }

        Ok(())
    }
}
