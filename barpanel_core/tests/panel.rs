use std::time::Duration;

use barpanel_core::mocks::{ActionCall, RecordingPresentation, Rendered, ScriptedActions};
use barpanel_core::{MachineEvent, MixingStatus, OperatorInput, Panel, PanelCfg};
use barpanel_traits::{HoseStatusSnapshot, MixingStatusReport};
use barpanel_traits::clock::test_clock::TestClock;
use crossbeam_channel::unbounded;

type TestPanel = Panel<ScriptedActions, RecordingPresentation, TestClock>;

fn panel_with(actions: ScriptedActions, clock: &TestClock) -> TestPanel {
    let (_etx, erx) = unbounded();
    let (_itx, irx) = unbounded();
    Panel::new(
        PanelCfg::default(),
        actions,
        RecordingPresentation::new(),
        clock.clone(),
        erx,
        irx,
    )
}

#[test]
fn mixing_scenario_flows_through_the_loop() {
    let clock = TestClock::new();
    let mut panel = panel_with(ScriptedActions::new(), &clock);

    panel.handle_event(MachineEvent::MixingStart {
        drink_name: "Mojito".to_string(),
    });
    panel.handle_event(MachineEvent::MixingProgress { progress: 0.5 });
    panel.handle_event(MachineEvent::MixingProgress { progress: 0.3 });
    panel.handle_event(MachineEvent::MixingComplete);

    assert_eq!(panel.presentation().progress_history(), vec![0, 50, 30]);
    assert!(!panel.presentation().overlay_visible());
    assert!(panel.presentation().success_visible());

    clock.advance(Duration::from_secs(6));
    panel.handle_heartbeat();
    assert_eq!(panel.session().status(), MixingStatus::Idle);
    assert!(!panel.presentation().success_visible());
}

#[test]
fn unsolicited_error_event_shows_message_once_without_overlay() {
    let clock = TestClock::new();
    let mut panel = panel_with(ScriptedActions::new(), &clock);

    panel.handle_event(MachineEvent::MixingError {
        error: "pump 3 jammed".to_string(),
    });

    let pres = panel.presentation();
    assert_eq!(pres.count(|c| matches!(c, Rendered::ShowOverlay(_))), 0);
    assert_eq!(
        pres.count(|c| matches!(c, Rendered::ShowError(m) if m == "pump 3 jammed")),
        1
    );
}

#[test]
fn failed_action_input_routes_through_shared_error_surface() {
    let clock = TestClock::new();
    let mut panel = panel_with(ScriptedActions::failing("connection refused"), &clock);

    assert!(panel.handle_input(OperatorInput::StartCalibration));

    let pres = panel.presentation();
    assert_eq!(
        pres.count(
            |c| matches!(c, Rendered::ShowError(m) if m.starts_with("Start pump 1 failed:"))
        ),
        1
    );
}

#[test]
fn a_new_error_replaces_the_visible_one() {
    let clock = TestClock::new();
    let mut panel = panel_with(ScriptedActions::failing("down"), &clock);

    panel.handle_input(OperatorInput::StartCalibration);
    panel.handle_event(MachineEvent::MixingError {
        error: "pump 3 jammed".to_string(),
    });

    // Two shows, no stacking semantics on the surface itself.
    let pres = panel.presentation();
    assert_eq!(pres.count(|c| matches!(c, Rendered::ShowError(_))), 2);
    let last_error = pres
        .commands
        .iter()
        .rev()
        .find_map(|c| match c {
            Rendered::ShowError(m) => Some(m.clone()),
            _ => None,
        })
        .expect("an error is visible");
    assert_eq!(last_error, "pump 3 jammed");
}

#[test]
fn acknowledge_error_hides_surface_and_resets_failed_session() {
    let clock = TestClock::new();
    let mut panel = panel_with(ScriptedActions::new(), &clock);

    panel.handle_event(MachineEvent::MixingStart {
        drink_name: "Spritz".to_string(),
    });
    panel.handle_event(MachineEvent::MixingError {
        error: "reservoir empty".to_string(),
    });
    panel.handle_input(OperatorInput::AcknowledgeError);

    assert_eq!(panel.session().status(), MixingStatus::Idle);
    assert_eq!(
        panel
            .presentation()
            .count(|c| matches!(c, Rendered::HideError)),
        1
    );
}

#[test]
fn calibration_inputs_address_the_selected_pump() {
    let clock = TestClock::new();
    let mut panel = panel_with(ScriptedActions::new(), &clock);

    panel.handle_input(OperatorInput::SelectPump(3));
    panel.handle_input(OperatorInput::StartCalibration);
    panel.handle_input(OperatorInput::StopCalibration);
    panel.handle_input(OperatorInput::SubmitCalibration(42.0));

    assert_eq!(
        panel.actions().calls,
        vec![
            ActionCall::StartPump(3),
            ActionCall::StopPump(3),
            ActionCall::CalibratePump {
                pump_id: 3,
                volume: 42.0
            },
        ]
    );
}

#[test]
fn invalid_submit_volume_surfaces_validation_error_without_network() {
    let clock = TestClock::new();
    let mut panel = panel_with(ScriptedActions::new(), &clock);

    panel.handle_input(OperatorInput::SubmitCalibration(0.0));

    assert!(panel.actions().calls.is_empty());
    assert_eq!(
        panel
            .presentation()
            .count(|c| matches!(c, Rendered::ShowError(m) if m.contains("positive number"))),
        1
    );
}

#[test]
fn invalid_bottle_volumes_surface_the_offending_hose() {
    let clock = TestClock::new();
    let mut panel = panel_with(ScriptedActions::new(), &clock);

    panel.handle_input(OperatorInput::SubmitVolumes(vec![
        (700.0, 100.0),
        (500.0, 600.0),
    ]));

    assert!(panel.actions().calls.is_empty(), "validation is local-only");
    assert_eq!(
        panel
            .presentation()
            .count(|c| matches!(c, Rendered::ShowError(m) if m.contains("Hose 2"))),
        1
    );
}

#[test]
fn valid_bottle_volumes_are_accepted_without_an_error() {
    let clock = TestClock::new();
    let mut panel = panel_with(ScriptedActions::new(), &clock);

    panel.handle_input(OperatorInput::SubmitVolumes(vec![
        (700.0, 700.0),
        (1000.0, 0.0),
    ]));

    assert!(panel.actions().calls.is_empty());
    assert_eq!(
        panel
            .presentation()
            .count(|c| matches!(c, Rendered::ShowError(_))),
        0
    );
}

#[test]
fn emergency_stop_input_reaches_the_backend() {
    let clock = TestClock::new();
    let mut panel = panel_with(ScriptedActions::new(), &clock);

    panel.handle_input(OperatorInput::StartPriming);
    panel.handle_input(OperatorInput::EmergencyStop);

    assert!(panel.actions().calls.contains(&ActionCall::EmergencyStop));
}

#[test]
fn shutdown_input_stops_the_loop() {
    let clock = TestClock::new();
    let mut panel = panel_with(ScriptedActions::new(), &clock);
    assert!(!panel.handle_input(OperatorInput::Shutdown));
}

#[test]
fn poll_tick_updates_hose_display_and_failure_keeps_it() {
    let clock = TestClock::new();
    let mut levels = HoseStatusSnapshot::default();
    levels.set(1, 70.0);
    let mut panel = panel_with(
        ScriptedActions {
            hose_levels: levels,
            ..ScriptedActions::new()
        },
        &clock,
    );

    panel.handle_poll_tick();
    assert_eq!(panel.presentation().hose_percent(1), Some(70.0));
    assert_eq!(panel.hoses().last_snapshot().and_then(|s| s.get(1)), Some(70.0));
}

#[test]
fn resync_seeds_display_from_backend_report() {
    let clock = TestClock::new();
    let mut panel = panel_with(
        ScriptedActions {
            mixing_report: MixingStatusReport {
                is_mixing: true,
                progress: 0.6,
                error: None,
            },
            ..ScriptedActions::new()
        },
        &clock,
    );

    panel.resync();

    assert_eq!(panel.session().status(), MixingStatus::Active);
    assert!(panel.presentation().overlay_visible());
    assert_eq!(panel.presentation().progress_history(), vec![60]);
}

#[test]
fn resync_failure_is_logged_not_surfaced() {
    let clock = TestClock::new();
    let mut panel = panel_with(ScriptedActions::failing("unreachable"), &clock);

    panel.resync();

    assert_eq!(panel.session().status(), MixingStatus::Idle);
    assert_eq!(
        panel
            .presentation()
            .count(|c| matches!(c, Rendered::ShowError(_))),
        0,
        "startup resync failure must not block the panel with a modal"
    );
}
