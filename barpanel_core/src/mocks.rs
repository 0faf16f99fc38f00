//! Test and helper mocks for barpanel_core

use barpanel_traits::{
    ActionError, ActionOutcome, ControlKind, DeviceActions, HoseStatusSnapshot, MixingStatusReport,
    Presentation,
};

/// Every command a [`Presentation`] can receive, recorded verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    ShowOverlay(String),
    Progress(u8),
    HideOverlay,
    ShowSuccess,
    HideSuccess,
    ShowError(String),
    HideError,
    PumpSelected(u8),
    ControlActive(ControlKind, bool),
    ElapsedSeconds(ControlKind, f32),
    HoseLevel { hose: u8, percent: f32, low: bool },
    Navigate(String),
}

/// Presentation that records the command stream for assertions.
#[derive(Debug, Default)]
pub struct RecordingPresentation {
    pub commands: Vec<Rendered>,
}

impl RecordingPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&Rendered) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    /// Progress percentages in the order they were rendered.
    pub fn progress_history(&self) -> Vec<u8> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Rendered::Progress(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Whether the progress overlay is visible after replaying all commands.
    pub fn overlay_visible(&self) -> bool {
        self.commands
            .iter()
            .rev()
            .find_map(|c| match c {
                Rendered::ShowOverlay(_) => Some(true),
                Rendered::HideOverlay => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Whether the success acknowledgment is visible after replay.
    pub fn success_visible(&self) -> bool {
        self.commands
            .iter()
            .rev()
            .find_map(|c| match c {
                Rendered::ShowSuccess => Some(true),
                Rendered::HideSuccess => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Last rendered state of a control highlight, defaulting to inactive.
    pub fn control_active(&self, control: ControlKind) -> bool {
        self.commands
            .iter()
            .rev()
            .find_map(|c| match c {
                Rendered::ControlActive(k, on) if *k == control => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Last rendered percent for a hose, if any.
    pub fn hose_percent(&self, hose_ix: u8) -> Option<f32> {
        self.commands.iter().rev().find_map(|c| match c {
            Rendered::HoseLevel { hose, percent, .. } if *hose == hose_ix => Some(*percent),
            _ => None,
        })
    }
}

impl Presentation for RecordingPresentation {
    fn show_progress_overlay(&mut self, drink_name: &str) {
        self.commands
            .push(Rendered::ShowOverlay(drink_name.to_string()));
    }
    fn update_progress(&mut self, percent: u8) {
        self.commands.push(Rendered::Progress(percent));
    }
    fn hide_progress_overlay(&mut self) {
        self.commands.push(Rendered::HideOverlay);
    }
    fn show_success(&mut self) {
        self.commands.push(Rendered::ShowSuccess);
    }
    fn hide_success(&mut self) {
        self.commands.push(Rendered::HideSuccess);
    }
    fn show_error(&mut self, message: &str) {
        self.commands.push(Rendered::ShowError(message.to_string()));
    }
    fn hide_error(&mut self) {
        self.commands.push(Rendered::HideError);
    }
    fn set_pump_selected(&mut self, pump_id: u8) {
        self.commands.push(Rendered::PumpSelected(pump_id));
    }
    fn set_control_active(&mut self, control: ControlKind, active: bool) {
        self.commands.push(Rendered::ControlActive(control, active));
    }
    fn set_elapsed_seconds(&mut self, control: ControlKind, seconds: f32) {
        self.commands.push(Rendered::ElapsedSeconds(control, seconds));
    }
    fn set_hose_level(&mut self, hose: u8, percent: f32, low: bool) {
        self.commands.push(Rendered::HoseLevel { hose, percent, low });
    }
    fn navigate(&mut self, location: &str) {
        self.commands.push(Rendered::Navigate(location.to_string()));
    }
}

/// One recorded device-action call.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionCall {
    StartPump(u8),
    StopPump(u8),
    CalibratePump { pump_id: u8, volume: f32 },
    StartPrime(u8),
    StopPrime(u8),
    PrimeHose(u8),
    HoseStatus,
    MixingStatus,
    EmergencyStop,
}

/// Scripted [`DeviceActions`] double: records calls and answers from fixed
/// fields. Setting `fail_with` makes every action error with that reason.
#[derive(Debug)]
pub struct ScriptedActions {
    pub calls: Vec<ActionCall>,
    pub fail_with: Option<String>,
    pub stop_seconds: f32,
    pub redirect_to: Option<String>,
    pub hose_levels: HoseStatusSnapshot,
    pub mixing_report: MixingStatusReport,
}

impl Default for ScriptedActions {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            fail_with: None,
            stop_seconds: 3.5,
            redirect_to: Some("/calibration".to_string()),
            hose_levels: HoseStatusSnapshot::default(),
            mixing_report: MixingStatusReport::default(),
        }
    }
}

impl ScriptedActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), ActionError> {
        match &self.fail_with {
            Some(reason) => Err(Box::new(std::io::Error::other(reason.clone()))),
            None => Ok(()),
        }
    }

    fn outcome(&self) -> Result<ActionOutcome, ActionError> {
        self.check()?;
        Ok(match &self.redirect_to {
            Some(loc) => ActionOutcome::Redirect(loc.clone()),
            None => ActionOutcome::Done,
        })
    }
}

impl DeviceActions for ScriptedActions {
    fn start_pump(&mut self, pump_id: u8) -> Result<(), ActionError> {
        self.calls.push(ActionCall::StartPump(pump_id));
        self.check()
    }

    fn stop_pump(&mut self, pump_id: u8) -> Result<f32, ActionError> {
        self.calls.push(ActionCall::StopPump(pump_id));
        self.check()?;
        Ok(self.stop_seconds)
    }

    fn calibrate_pump(
        &mut self,
        pump_id: u8,
        dispensed_volume: f32,
    ) -> Result<ActionOutcome, ActionError> {
        self.calls.push(ActionCall::CalibratePump {
            pump_id,
            volume: dispensed_volume,
        });
        self.outcome()
    }

    fn start_prime(&mut self, pump_id: u8) -> Result<(), ActionError> {
        self.calls.push(ActionCall::StartPrime(pump_id));
        self.check()
    }

    fn stop_prime(&mut self, pump_id: u8) -> Result<f32, ActionError> {
        self.calls.push(ActionCall::StopPrime(pump_id));
        self.check()?;
        Ok(self.stop_seconds)
    }

    fn prime_hose(&mut self, pump_id: u8) -> Result<ActionOutcome, ActionError> {
        self.calls.push(ActionCall::PrimeHose(pump_id));
        self.outcome()
    }

    fn hose_status(&mut self) -> Result<HoseStatusSnapshot, ActionError> {
        self.calls.push(ActionCall::HoseStatus);
        self.check()?;
        Ok(self.hose_levels.clone())
    }

    fn mixing_status(&mut self) -> Result<MixingStatusReport, ActionError> {
        self.calls.push(ActionCall::MixingStatus);
        self.check()?;
        Ok(self.mixing_report.clone())
    }

    fn emergency_stop(&mut self) -> Result<(), ActionError> {
        self.calls.push(ActionCall::EmergencyStop);
        self.check()
    }
}
