//! Periodic, read-only hose fill-level refresh.
//!
//! Each poll fully replaces the displayed snapshot on success. A failed
//! poll keeps the previous snapshot on screen; a transient network blip
//! must not blank or corrupt the display. Ticks are independent: no
//! backoff, and a failed tick never cancels subsequent ones.

use barpanel_traits::{DeviceActions, HOSE_COUNT, HoseStatusSnapshot, Presentation};

use crate::error::PanelError;

pub struct HoseStatusPoller {
    low_threshold_pct: f32,
    last: Option<HoseStatusSnapshot>,
}

impl HoseStatusPoller {
    pub fn new(low_threshold_pct: f32) -> Self {
        Self {
            low_threshold_pct,
            last: None,
        }
    }

    /// The snapshot currently on display, if any poll has succeeded yet.
    pub fn last_snapshot(&self) -> Option<&HoseStatusSnapshot> {
        self.last.as_ref()
    }

    /// One poll tick: pull the levels and re-render hoses 1..=8.
    pub fn poll<A: DeviceActions, P: Presentation>(
        &mut self,
        actions: &mut A,
        pres: &mut P,
    ) -> Result<(), PanelError> {
        let snapshot = actions
            .hose_status()
            .map_err(|e| PanelError::action("Hose status refresh", e))?;
        for hose in 1..=HOSE_COUNT {
            if let Some(percent) = snapshot.get(hose) {
                pres.set_hose_level(hose, percent, percent < self.low_threshold_pct);
            }
        }
        self.last = Some(snapshot);
        Ok(())
    }
}
