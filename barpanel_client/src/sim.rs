//! Simulated backend for running the panel without a machine.

use std::time::Instant;

use barpanel_traits::{
    ActionError, ActionOutcome, DeviceActions, HOSE_COUNT, HoseStatusSnapshot, MixingStatusReport,
};

/// In-memory `DeviceActions`: pumps track real wall-clock run time, hose
/// levels drain a little on every status read.
pub struct SimulatedActions {
    started: [Option<Instant>; HOSE_COUNT as usize],
    levels: [f32; HOSE_COUNT as usize],
}

impl Default for SimulatedActions {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedActions {
    pub fn new() -> Self {
        Self {
            started: [None; HOSE_COUNT as usize],
            levels: [100.0, 85.0, 60.0, 45.0, 30.0, 18.0, 10.0, 5.0],
        }
    }

    fn slot(&mut self, pump_id: u8) -> Result<&mut Option<Instant>, ActionError> {
        if !(1..=HOSE_COUNT).contains(&pump_id) {
            return Err(Box::new(std::io::Error::other(format!(
                "no such pump: {pump_id}"
            ))));
        }
        Ok(&mut self.started[usize::from(pump_id) - 1])
    }

    fn start(&mut self, pump_id: u8) -> Result<(), ActionError> {
        let slot = self.slot(pump_id)?;
        *slot = Some(Instant::now());
        tracing::info!(pump_id, "pump started (simulated)");
        Ok(())
    }

    fn stop(&mut self, pump_id: u8) -> Result<f32, ActionError> {
        let slot = self.slot(pump_id)?;
        match slot.take() {
            Some(at) => Ok(at.elapsed().as_secs_f32()),
            // Mirrors the backend's 400 on a stop without a start.
            None => Err(Box::new(std::io::Error::other("pump was not started"))),
        }
    }
}

impl DeviceActions for SimulatedActions {
    fn start_pump(&mut self, pump_id: u8) -> Result<(), ActionError> {
        self.start(pump_id)
    }

    fn stop_pump(&mut self, pump_id: u8) -> Result<f32, ActionError> {
        self.stop(pump_id)
    }

    fn calibrate_pump(
        &mut self,
        pump_id: u8,
        _dispensed_volume: f32,
    ) -> Result<ActionOutcome, ActionError> {
        self.slot(pump_id)?;
        Ok(ActionOutcome::Redirect("/calibration".to_string()))
    }

    fn start_prime(&mut self, pump_id: u8) -> Result<(), ActionError> {
        self.start(pump_id)
    }

    fn stop_prime(&mut self, pump_id: u8) -> Result<f32, ActionError> {
        self.stop(pump_id)
    }

    fn prime_hose(&mut self, pump_id: u8) -> Result<ActionOutcome, ActionError> {
        self.slot(pump_id)?;
        Ok(ActionOutcome::Redirect("/calibration".to_string()))
    }

    fn hose_status(&mut self) -> Result<HoseStatusSnapshot, ActionError> {
        let mut snapshot = HoseStatusSnapshot::default();
        for (idx, level) in self.levels.iter_mut().enumerate() {
            *level = (*level - 0.5).max(0.0);
            snapshot.set(idx as u8 + 1, *level);
        }
        Ok(snapshot)
    }

    fn mixing_status(&mut self) -> Result<MixingStatusReport, ActionError> {
        Ok(MixingStatusReport::default())
    }

    fn emergency_stop(&mut self) -> Result<(), ActionError> {
        self.started = [None; HOSE_COUNT as usize];
        tracing::warn!("emergency stop (simulated)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_without_start_errors() {
        let mut sim = SimulatedActions::new();
        let err = sim.stop_pump(3).expect_err("not started");
        assert!(format!("{err}").contains("not started"));
    }

    #[test]
    fn start_stop_roundtrip_reports_elapsed() {
        let mut sim = SimulatedActions::new();
        sim.start_pump(3).expect("start");
        let secs = sim.stop_pump(3).expect("stop");
        assert!(secs >= 0.0);
        // Second stop fails: the run was consumed.
        assert!(sim.stop_pump(3).is_err());
    }

    #[test]
    fn hose_levels_drain_on_each_read() {
        let mut sim = SimulatedActions::new();
        let first = sim.hose_status().expect("status");
        let second = sim.hose_status().expect("status");
        assert!(second.get(1) < first.get(1));
    }

    #[test]
    fn emergency_stop_clears_running_pumps() {
        let mut sim = SimulatedActions::new();
        sim.start_prime(2).expect("start");
        sim.emergency_stop().expect("estop");
        assert!(sim.stop_prime(2).is_err());
    }
}
