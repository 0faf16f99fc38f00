//! Core-side view of the panel configuration.

use std::time::Duration;

use crate::calibration::OptimisticRollback;

/// Knobs the panel loop and controllers need, decoupled from the TOML schema.
#[derive(Debug, Clone)]
pub struct PanelCfg {
    /// Whether the hose-level display exists; when false the poller never starts.
    pub hose_display: bool,
    pub poll_interval: Duration,
    pub low_threshold_pct: f32,
    pub success_dismiss: Duration,
    pub rollback: OptimisticRollback,
}

impl Default for PanelCfg {
    fn default() -> Self {
        Self {
            hose_display: true,
            poll_interval: Duration::from_secs(30),
            low_threshold_pct: 20.0,
            success_dismiss: Duration::from_secs(5),
            rollback: OptimisticRollback::Keep,
        }
    }
}

impl From<&barpanel_config::Config> for PanelCfg {
    fn from(cfg: &barpanel_config::Config) -> Self {
        Self {
            hose_display: cfg.panel.hose_display,
            poll_interval: Duration::from_secs(cfg.panel.poll_interval_s),
            low_threshold_pct: cfg.panel.low_threshold_pct,
            success_dismiss: Duration::from_secs(cfg.panel.success_dismiss_s),
            rollback: match cfg.panel.rollback {
                barpanel_config::RollbackMode::Keep => OptimisticRollback::Keep,
                barpanel_config::RollbackMode::Revert => OptimisticRollback::Revert,
            },
        }
    }
}
