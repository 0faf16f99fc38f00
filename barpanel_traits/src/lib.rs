pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Number of hoses (and pumps) on the machine.
pub const HOSE_COUNT: u8 = 8;

pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a submit-style action; the backend may answer with a redirect
/// that the client is expected to follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Done,
    Redirect(String),
}

/// Fill levels for hoses 1..=8 as reported by the backend. Entries may be
/// absent when the backend has no reading for a hose.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoseStatusSnapshot {
    levels: [Option<f32>; HOSE_COUNT as usize],
}

impl HoseStatusSnapshot {
    /// Record the fill percent for a hose (1-based). Out-of-range indices
    /// are ignored.
    pub fn set(&mut self, hose: u8, percent: f32) {
        if (1..=HOSE_COUNT).contains(&hose) {
            self.levels[usize::from(hose) - 1] = Some(percent);
        }
    }

    /// Fill percent for a hose (1-based), if known.
    pub fn get(&self, hose: u8) -> Option<f32> {
        if (1..=HOSE_COUNT).contains(&hose) {
            self.levels[usize::from(hose) - 1]
        } else {
            None
        }
    }
}

/// Backend-reported mixing state, used to resynchronize the display after a
/// client restart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MixingStatusReport {
    pub is_mixing: bool,
    pub progress: f32,
    pub error: Option<String>,
}

/// Request/response actions against the machine backend.
///
/// `start_*` succeed with no payload; `stop_*` return the elapsed run time
/// in seconds. Submit-style actions return an [`ActionOutcome`] carrying an
/// optional redirect.
pub trait DeviceActions {
    fn start_pump(&mut self, pump_id: u8) -> Result<(), ActionError>;
    fn stop_pump(&mut self, pump_id: u8) -> Result<f32, ActionError>;
    fn calibrate_pump(
        &mut self,
        pump_id: u8,
        dispensed_volume: f32,
    ) -> Result<ActionOutcome, ActionError>;
    fn start_prime(&mut self, pump_id: u8) -> Result<(), ActionError>;
    fn stop_prime(&mut self, pump_id: u8) -> Result<f32, ActionError>;
    fn prime_hose(&mut self, pump_id: u8) -> Result<ActionOutcome, ActionError>;
    fn hose_status(&mut self) -> Result<HoseStatusSnapshot, ActionError>;
    fn mixing_status(&mut self) -> Result<MixingStatusReport, ActionError>;
    fn emergency_stop(&mut self) -> Result<(), ActionError>;
}

/// Which operator control a visual command refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Calibrate,
    Prime,
}

/// Abstract rendering sink. The core issues only these commands and never
/// touches rendering directly; implementations must treat every command as
/// idempotent (hiding an already-hidden surface is a no-op).
pub trait Presentation {
    /// Show the mixing progress overlay for a drink, seeded at 0%.
    /// An empty name means the drink is unknown (resync after restart).
    fn show_progress_overlay(&mut self, drink_name: &str);
    /// Update the rendered mixing percentage (0..=100).
    fn update_progress(&mut self, percent: u8);
    fn hide_progress_overlay(&mut self);
    /// Transient "drink ready" acknowledgment.
    fn show_success(&mut self);
    fn hide_success(&mut self);
    /// Modal error message; replaces any error already shown.
    fn show_error(&mut self, message: &str);
    fn hide_error(&mut self);
    fn set_pump_selected(&mut self, pump_id: u8);
    fn set_control_active(&mut self, control: ControlKind, active: bool);
    /// Write a measured elapsed time (seconds) into the control's display field.
    fn set_elapsed_seconds(&mut self, control: ControlKind, seconds: f32);
    /// Update one hose's fill display; `low` flags levels below the threshold.
    fn set_hose_level(&mut self, hose: u8, percent: f32, low: bool);
    /// Follow a backend redirect.
    fn navigate(&mut self, location: &str);
}
