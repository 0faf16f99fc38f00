//! The panel control loop.
//!
//! Single-threaded and cooperative: feed events, operator input, hose-poll
//! ticks and the auto-dismiss heartbeat are all serialized onto one loop via
//! `crossbeam_channel::select!`, so the session and selection state need no
//! locking. No handler blocks the loop; device actions run synchronously but
//! are bounded by the transport's own timeout.

use std::time::Duration;

use crossbeam_channel::{Receiver, never, select, tick};

use barpanel_traits::{Clock, DeviceActions, Presentation};

use crate::calibration::CalibrationController;
use crate::config::PanelCfg;
use crate::error::{PanelError, Result};
use crate::events::MachineEvent;
use crate::hoses::HoseStatusPoller;
use crate::session::MixingSessionController;

/// Interval between auto-dismiss deadline checks.
const HEARTBEAT: Duration = Duration::from_millis(200);

/// One operator action delivered to the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorInput {
    SelectPump(u8),
    StartCalibration,
    StopCalibration,
    SubmitCalibration(f32),
    StartPriming,
    StopPriming,
    SubmitPriming,
    /// Bottle-volume entries per hose as (total, remaining) milliliters.
    SubmitVolumes(Vec<(f32, f32)>),
    AcknowledgeSuccess,
    AcknowledgeError,
    EmergencyStop,
    Shutdown,
}

/// Owns the three controllers plus the action/presentation collaborators and
/// reacts to whatever arrives first on the feed, input, or timer channels.
pub struct Panel<A, P, C>
where
    A: DeviceActions,
    P: Presentation,
    C: Clock,
{
    actions: A,
    presentation: P,
    session: MixingSessionController<C>,
    calibration: CalibrationController,
    hoses: HoseStatusPoller,
    events: Receiver<MachineEvent>,
    inputs: Receiver<OperatorInput>,
    cfg: PanelCfg,
}

impl<A, P, C> Panel<A, P, C>
where
    A: DeviceActions,
    P: Presentation,
    C: Clock,
{
    pub fn new(
        cfg: PanelCfg,
        actions: A,
        presentation: P,
        clock: C,
        events: Receiver<MachineEvent>,
        inputs: Receiver<OperatorInput>,
    ) -> Self {
        let session = MixingSessionController::with_clock(cfg.success_dismiss, clock);
        let calibration = CalibrationController::new(cfg.rollback);
        let hoses = HoseStatusPoller::new(cfg.low_threshold_pct);
        Self {
            actions,
            presentation,
            session,
            calibration,
            hoses,
            events,
            inputs,
            cfg,
        }
    }

    pub fn session(&self) -> &MixingSessionController<C> {
        &self.session
    }

    pub fn calibration(&self) -> &CalibrationController {
        &self.calibration
    }

    pub fn hoses(&self) -> &HoseStatusPoller {
        &self.hoses
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn actions(&self) -> &A {
        &self.actions
    }

    /// Ask the backend whether a mix is already in flight and seed the
    /// display accordingly. Failure is logged and ignored; the next
    /// `mixing_start` event will correct the display anyway.
    pub fn resync(&mut self) {
        match self.actions.mixing_status() {
            Ok(report) => self.session.resync(&report, &mut self.presentation),
            Err(e) => tracing::warn!(error = %e, "mixing status resync failed"),
        }
    }

    /// Run until the input channel shuts down or a `Shutdown` input arrives.
    pub fn run(&mut self) -> Result<()> {
        let events = self.events.clone();
        let inputs = self.inputs.clone();
        let hose_tick = if self.cfg.hose_display {
            tick(self.cfg.poll_interval)
        } else {
            never()
        };
        let heartbeat = tick(HEARTBEAT);

        loop {
            select! {
                recv(events) -> ev => match ev {
                    Ok(ev) => self.handle_event(ev),
                    Err(_) => {
                        // Feed closed; reconnection is the feed's job, a
                        // dropped sender means it gave up for good.
                        tracing::warn!("notification feed disconnected");
                        return Ok(());
                    }
                },
                recv(inputs) -> input => match input {
                    Ok(input) => {
                        if !self.handle_input(input) {
                            return Ok(());
                        }
                    }
                    Err(_) => return Ok(()),
                },
                recv(hose_tick) -> _ => self.handle_poll_tick(),
                recv(heartbeat) -> _ => self.handle_heartbeat(),
            }
        }
    }

    /// React to one feed event. Public so embedders and tests can drive the
    /// loop manually.
    pub fn handle_event(&mut self, event: MachineEvent) {
        match event {
            MachineEvent::MixingStart { drink_name } => {
                self.session.on_start(&drink_name, &mut self.presentation);
            }
            MachineEvent::MixingProgress { progress } => {
                self.session.on_progress(progress, &mut self.presentation);
            }
            MachineEvent::MixingComplete => {
                self.session.on_complete(&mut self.presentation);
            }
            MachineEvent::MixingError { error } => {
                self.session.on_error(&error, &mut self.presentation);
            }
        }
    }

    /// React to one operator input; returns false on shutdown.
    pub fn handle_input(&mut self, input: OperatorInput) -> bool {
        let outcome = match input {
            OperatorInput::SelectPump(id) => {
                self.calibration.select_pump(id, &mut self.presentation)
            }
            OperatorInput::StartCalibration => self
                .calibration
                .start_calibration(&mut self.actions, &mut self.presentation),
            OperatorInput::StopCalibration => self
                .calibration
                .stop_calibration(&mut self.actions, &mut self.presentation),
            OperatorInput::SubmitCalibration(volume) => self.calibration.submit_calibration(
                volume,
                &mut self.actions,
                &mut self.presentation,
            ),
            OperatorInput::StartPriming => self
                .calibration
                .start_priming(&mut self.actions, &mut self.presentation),
            OperatorInput::StopPriming => self
                .calibration
                .stop_priming(&mut self.actions, &mut self.presentation),
            OperatorInput::SubmitPriming => self
                .calibration
                .submit_priming(&mut self.actions, &mut self.presentation),
            OperatorInput::SubmitVolumes(pairs) => self.calibration.submit_volumes(&pairs),
            OperatorInput::AcknowledgeSuccess => {
                self.session.acknowledge_success(&mut self.presentation);
                Ok(())
            }
            OperatorInput::AcknowledgeError => {
                self.presentation.hide_error();
                self.session.acknowledge_error();
                Ok(())
            }
            OperatorInput::EmergencyStop => self
                .calibration
                .emergency_stop(&mut self.actions, &mut self.presentation),
            OperatorInput::Shutdown => return false,
        };
        if let Err(e) = outcome {
            self.surface(e);
        }
        true
    }

    /// One hose-poll tick; failures keep the previous snapshot on display.
    pub fn handle_poll_tick(&mut self) {
        if let Err(e) = self.hoses.poll(&mut self.actions, &mut self.presentation) {
            self.surface(e);
        }
    }

    /// Auto-dismiss deadline check.
    pub fn handle_heartbeat(&mut self) {
        self.session.tick(&mut self.presentation);
    }

    /// Shared error surface: one visible message, a new one replaces it.
    fn surface(&mut self, err: PanelError) {
        tracing::warn!(error = %err, "surfacing panel error");
        self.presentation.show_error(&err.to_string());
    }
}
