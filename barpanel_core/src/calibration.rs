//! Calibrate/prime control flow for the selected pump.
//!
//! Start actions commit the "active" control highlight optimistically,
//! before the backend confirms. Whether a failed start reverts that
//! highlight is an explicit policy ([`OptimisticRollback`]); the stock
//! behavior keeps it lit. Stop actions clear the highlight as soon as the
//! stop is issued, regardless of outcome.

use barpanel_traits::{ActionOutcome, ControlKind, DeviceActions, Presentation};

use crate::error::PanelError;

pub const PUMP_MIN: u8 = 1;
pub const PUMP_MAX: u8 = 8;

/// What the selected pump is currently doing, per the UI contract.
/// Concurrent triggers are prevented by disabling controls, not by locking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpMode {
    Idle,
    Calibrating,
    Priming,
}

/// Policy for the optimistic "active" highlight when a start action fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimisticRollback {
    /// Leave the highlight lit (stock behavior).
    #[default]
    Keep,
    /// Revert the highlight and the mode.
    Revert,
}

/// Pump selection plus the calibrate/prime request/response cycle.
///
/// The selection persists across actions; only `mode` transitions on
/// start/stop round-trips. All failures are returned as [`PanelError`] for
/// the shared error surface; none are retried.
pub struct CalibrationController {
    pump_id: u8,
    mode: PumpMode,
    rollback: OptimisticRollback,
}

impl Default for CalibrationController {
    fn default() -> Self {
        Self::new(OptimisticRollback::Keep)
    }
}

impl CalibrationController {
    pub fn new(rollback: OptimisticRollback) -> Self {
        Self {
            pump_id: PUMP_MIN,
            mode: PumpMode::Idle,
            rollback,
        }
    }

    pub fn selected_pump(&self) -> u8 {
        self.pump_id
    }

    pub fn mode(&self) -> PumpMode {
        self.mode
    }

    pub fn reset(&mut self) {
        self.pump_id = PUMP_MIN;
        self.mode = PumpMode::Idle;
    }

    /// Pure selection update; no backend call.
    pub fn select_pump<P: Presentation>(
        &mut self,
        pump_id: u8,
        pres: &mut P,
    ) -> Result<(), PanelError> {
        if !(PUMP_MIN..=PUMP_MAX).contains(&pump_id) {
            return Err(PanelError::Validation(format!(
                "pump id must be in {PUMP_MIN}..={PUMP_MAX}, got {pump_id}"
            )));
        }
        self.pump_id = pump_id;
        pres.set_pump_selected(pump_id);
        Ok(())
    }

    pub fn start_calibration<A: DeviceActions, P: Presentation>(
        &mut self,
        actions: &mut A,
        pres: &mut P,
    ) -> Result<(), PanelError> {
        self.start(ControlKind::Calibrate, actions, pres)
    }

    pub fn start_priming<A: DeviceActions, P: Presentation>(
        &mut self,
        actions: &mut A,
        pres: &mut P,
    ) -> Result<(), PanelError> {
        self.start(ControlKind::Prime, actions, pres)
    }

    fn start<A: DeviceActions, P: Presentation>(
        &mut self,
        control: ControlKind,
        actions: &mut A,
        pres: &mut P,
    ) -> Result<(), PanelError> {
        let pump = self.pump_id;
        // Optimistic: the highlight commits on intent, not on confirmation.
        pres.set_control_active(control, true);
        self.mode = match control {
            ControlKind::Calibrate => PumpMode::Calibrating,
            ControlKind::Prime => PumpMode::Priming,
        };
        let result = match control {
            ControlKind::Calibrate => actions.start_pump(pump),
            ControlKind::Prime => actions.start_prime(pump),
        };
        match result {
            Ok(()) => {
                tracing::info!(pump, ?control, "pump started");
                Ok(())
            }
            Err(e) => {
                if self.rollback == OptimisticRollback::Revert {
                    pres.set_control_active(control, false);
                    self.mode = PumpMode::Idle;
                }
                Err(PanelError::action(start_action_name(control, pump), e))
            }
        }
    }

    pub fn stop_calibration<A: DeviceActions, P: Presentation>(
        &mut self,
        actions: &mut A,
        pres: &mut P,
    ) -> Result<(), PanelError> {
        self.stop(ControlKind::Calibrate, actions, pres)
    }

    pub fn stop_priming<A: DeviceActions, P: Presentation>(
        &mut self,
        actions: &mut A,
        pres: &mut P,
    ) -> Result<(), PanelError> {
        self.stop(ControlKind::Prime, actions, pres)
    }

    fn stop<A: DeviceActions, P: Presentation>(
        &mut self,
        control: ControlKind,
        actions: &mut A,
        pres: &mut P,
    ) -> Result<(), PanelError> {
        let pump = self.pump_id;
        // The highlight clears once the stop is issued, whatever the outcome.
        pres.set_control_active(control, false);
        self.mode = PumpMode::Idle;
        let result = match control {
            ControlKind::Calibrate => actions.stop_pump(pump),
            ControlKind::Prime => actions.stop_prime(pump),
        };
        match result {
            Ok(seconds) => {
                tracing::info!(pump, ?control, seconds, "pump stopped");
                pres.set_elapsed_seconds(control, seconds);
                Ok(())
            }
            Err(e) => Err(PanelError::action(stop_action_name(control, pump), e)),
        }
    }

    /// Record a calibration measurement. The dispensed volume is validated
    /// locally; an invalid value issues zero network calls. On success the
    /// backend answers with a redirect the panel follows; that redirect is
    /// the sole persistence path for a measurement.
    pub fn submit_calibration<A: DeviceActions, P: Presentation>(
        &mut self,
        dispensed_volume: f32,
        actions: &mut A,
        pres: &mut P,
    ) -> Result<(), PanelError> {
        if !dispensed_volume.is_finite() || dispensed_volume <= 0.0 {
            return Err(PanelError::Validation(
                "dispensed volume must be a positive number of milliliters".to_string(),
            ));
        }
        let pump = self.pump_id;
        match actions.calibrate_pump(pump, dispensed_volume) {
            Ok(outcome) => {
                tracing::info!(pump, dispensed_volume, "calibration submitted");
                follow(outcome, pres);
                Ok(())
            }
            Err(e) => Err(PanelError::action("Calibration", e)),
        }
    }

    /// Record a completed priming run; same redirect-follow contract as
    /// calibration, no numeric payload.
    pub fn submit_priming<A: DeviceActions, P: Presentation>(
        &mut self,
        actions: &mut A,
        pres: &mut P,
    ) -> Result<(), PanelError> {
        let pump = self.pump_id;
        match actions.prime_hose(pump) {
            Ok(outcome) => {
                tracing::info!(pump, "priming submitted");
                follow(outcome, pres);
                Ok(())
            }
            Err(e) => Err(PanelError::action("Priming", e)),
        }
    }

    /// Accept the operator's bottle-volume entries for hoses 1..=8, each a
    /// (total, remaining) pair in milliliters. Purely local: an invalid
    /// pair is rejected with the offending hose named, and no network call
    /// is made either way.
    pub fn submit_volumes(&mut self, pairs: &[(f32, f32)]) -> Result<(), PanelError> {
        validate_bottle_volumes(pairs)?;
        tracing::info!(hoses = pairs.len(), "bottle volumes accepted");
        Ok(())
    }

    /// Halt all pumps immediately and clear any active control highlight.
    pub fn emergency_stop<A: DeviceActions, P: Presentation>(
        &mut self,
        actions: &mut A,
        pres: &mut P,
    ) -> Result<(), PanelError> {
        pres.set_control_active(ControlKind::Calibrate, false);
        pres.set_control_active(ControlKind::Prime, false);
        self.mode = PumpMode::Idle;
        actions
            .emergency_stop()
            .map_err(|e| PanelError::action("Emergency stop", e))?;
        tracing::warn!("emergency stop issued");
        Ok(())
    }
}

fn follow<P: Presentation>(outcome: ActionOutcome, pres: &mut P) {
    if let ActionOutcome::Redirect(location) = outcome {
        pres.navigate(&location);
    }
}

fn start_action_name(control: ControlKind, pump: u8) -> String {
    match control {
        ControlKind::Calibrate => format!("Start pump {pump}"),
        ControlKind::Prime => format!("Start priming pump {pump}"),
    }
}

fn stop_action_name(control: ControlKind, pump: u8) -> String {
    match control {
        ControlKind::Calibrate => format!("Stop pump {pump}"),
        ControlKind::Prime => format!("Stop priming pump {pump}"),
    }
}

/// Local check of bottle volume entries for hoses 1..=8, each a
/// (total, remaining) pair in milliliters. Never issues a network call.
pub fn validate_bottle_volumes(pairs: &[(f32, f32)]) -> Result<(), PanelError> {
    for (idx, (total, remaining)) in pairs.iter().enumerate() {
        let hose = idx + 1;
        if !total.is_finite() || !remaining.is_finite() || *total < 0.0 || *remaining < 0.0 {
            return Err(PanelError::Validation(format!(
                "Hose {hose}: volumes must be non-negative numbers"
            )));
        }
        if remaining > total {
            return Err(PanelError::Validation(format!(
                "Hose {hose}: remaining volume cannot be greater than total volume"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_bottle_volumes;

    #[test]
    fn accepts_remaining_at_or_below_total() {
        validate_bottle_volumes(&[(700.0, 700.0), (1000.0, 0.0)]).expect("valid volumes");
    }

    #[test]
    fn rejects_remaining_above_total_naming_the_hose() {
        let err = validate_bottle_volumes(&[(700.0, 100.0), (500.0, 600.0)])
            .expect_err("should reject hose 2");
        assert!(format!("{err}").contains("Hose 2"));
    }

    #[test]
    fn rejects_non_finite_and_negative_volumes() {
        assert!(validate_bottle_volumes(&[(f32::NAN, 0.0)]).is_err());
        assert!(validate_bottle_volumes(&[(700.0, -1.0)]).is_err());
    }
}
