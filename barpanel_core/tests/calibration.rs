use barpanel_core::mocks::{ActionCall, RecordingPresentation, Rendered, ScriptedActions};
use barpanel_core::{CalibrationController, OptimisticRollback, PumpMode};
use barpanel_traits::ControlKind;
use rstest::rstest;

#[test]
fn select_pump_is_a_pure_state_update() {
    let mut ctrl = CalibrationController::default();
    let actions = ScriptedActions::new();
    let mut pres = RecordingPresentation::new();

    ctrl.select_pump(5, &mut pres).expect("valid pump");

    assert_eq!(ctrl.selected_pump(), 5);
    assert!(actions.calls.is_empty(), "no backend call on selection");
    assert_eq!(
        pres.count(|c| matches!(c, Rendered::PumpSelected(5))),
        1,
        "selection highlight re-rendered"
    );
}

#[rstest]
#[case(0)]
#[case(9)]
fn select_pump_rejects_out_of_range(#[case] id: u8) {
    let mut ctrl = CalibrationController::default();
    let mut pres = RecordingPresentation::new();

    ctrl.select_pump(id, &mut pres).expect_err("out of range");
    assert_eq!(ctrl.selected_pump(), 1, "selection unchanged");
}

#[test]
fn start_addresses_the_selected_pump() {
    let mut ctrl = CalibrationController::default();
    let mut actions = ScriptedActions::new();
    let mut pres = RecordingPresentation::new();

    ctrl.select_pump(3, &mut pres).expect("valid pump");
    ctrl.select_pump(7, &mut pres).expect("valid pump");
    ctrl.start_calibration(&mut actions, &mut pres)
        .expect("start ok");

    // Never a previously selected pump.
    assert_eq!(actions.calls, vec![ActionCall::StartPump(7)]);
    assert_eq!(ctrl.mode(), PumpMode::Calibrating);
    assert!(pres.control_active(ControlKind::Calibrate));
}

#[test]
fn start_failure_keeps_optimistic_highlight_by_default() {
    let mut ctrl = CalibrationController::default();
    let mut actions = ScriptedActions::failing("connection refused");
    let mut pres = RecordingPresentation::new();

    let err = ctrl
        .start_calibration(&mut actions, &mut pres)
        .expect_err("transport failure");

    let msg = format!("{err}");
    assert!(msg.contains("Start pump 1 failed:"), "got: {msg}");
    assert!(msg.contains("connection refused"));
    // Stock behavior: the highlight stays lit even though the start failed.
    assert!(pres.control_active(ControlKind::Calibrate));
    assert_eq!(ctrl.mode(), PumpMode::Calibrating);
}

#[test]
fn start_failure_reverts_highlight_under_revert_policy() {
    let mut ctrl = CalibrationController::new(OptimisticRollback::Revert);
    let mut actions = ScriptedActions::failing("connection refused");
    let mut pres = RecordingPresentation::new();

    ctrl.start_priming(&mut actions, &mut pres)
        .expect_err("transport failure");

    assert!(!pres.control_active(ControlKind::Prime));
    assert_eq!(ctrl.mode(), PumpMode::Idle);
}

#[test]
fn stop_writes_elapsed_seconds_verbatim() {
    let mut ctrl = CalibrationController::default();
    let mut actions = ScriptedActions {
        stop_seconds: 12.75,
        ..ScriptedActions::new()
    };
    let mut pres = RecordingPresentation::new();

    ctrl.select_pump(2, &mut pres).expect("valid pump");
    ctrl.start_calibration(&mut actions, &mut pres)
        .expect("start ok");
    ctrl.stop_calibration(&mut actions, &mut pres)
        .expect("stop ok");

    assert_eq!(
        actions.calls,
        vec![ActionCall::StartPump(2), ActionCall::StopPump(2)]
    );
    assert_eq!(
        pres.count(
            |c| matches!(c, Rendered::ElapsedSeconds(ControlKind::Calibrate, s) if *s == 12.75)
        ),
        1
    );
    assert!(!pres.control_active(ControlKind::Calibrate));
    assert_eq!(ctrl.mode(), PumpMode::Idle);
}

#[test]
fn stop_clears_highlight_even_when_the_request_fails() {
    let mut ctrl = CalibrationController::default();
    let mut ok_actions = ScriptedActions::new();
    let mut pres = RecordingPresentation::new();

    ctrl.start_priming(&mut ok_actions, &mut pres)
        .expect("start ok");
    let mut failing = ScriptedActions::failing("timed out");
    ctrl.stop_priming(&mut failing, &mut pres)
        .expect_err("stop fails");

    // Cleared once the stop was issued, regardless of response outcome.
    assert!(!pres.control_active(ControlKind::Prime));
    assert_eq!(ctrl.mode(), PumpMode::Idle);
    assert_eq!(
        pres.count(|c| matches!(c, Rendered::ElapsedSeconds(..))),
        0,
        "no elapsed time on failure"
    );
}

#[rstest]
#[case(0.0)]
#[case(-3.0)]
#[case(f32::NAN)]
#[case(f32::INFINITY)]
fn submit_calibration_validates_before_any_network_call(#[case] volume: f32) {
    let mut ctrl = CalibrationController::default();
    let mut actions = ScriptedActions::new();
    let mut pres = RecordingPresentation::new();

    let err = ctrl
        .submit_calibration(volume, &mut actions, &mut pres)
        .expect_err("local validation error");

    assert!(actions.calls.is_empty(), "zero network calls");
    assert!(format!("{err}").contains("positive number"));
}

#[test]
fn submit_calibration_follows_backend_redirect() {
    let mut ctrl = CalibrationController::default();
    let mut actions = ScriptedActions::new();
    let mut pres = RecordingPresentation::new();

    ctrl.select_pump(4, &mut pres).expect("valid pump");
    ctrl.submit_calibration(25.5, &mut actions, &mut pres)
        .expect("submit ok");

    assert_eq!(
        actions.calls,
        vec![ActionCall::CalibratePump {
            pump_id: 4,
            volume: 25.5
        }]
    );
    assert_eq!(
        pres.count(|c| matches!(c, Rendered::Navigate(loc) if loc == "/calibration")),
        1
    );
}

#[test]
fn submit_priming_follows_redirect_without_payload() {
    let mut ctrl = CalibrationController::default();
    let mut actions = ScriptedActions::new();
    let mut pres = RecordingPresentation::new();

    ctrl.select_pump(6, &mut pres).expect("valid pump");
    ctrl.submit_priming(&mut actions, &mut pres)
        .expect("submit ok");

    assert_eq!(actions.calls, vec![ActionCall::PrimeHose(6)]);
    assert_eq!(pres.count(|c| matches!(c, Rendered::Navigate(_))), 1);
}

#[test]
fn submit_without_redirect_stays_put() {
    let mut ctrl = CalibrationController::default();
    let mut actions = ScriptedActions {
        redirect_to: None,
        ..ScriptedActions::new()
    };
    let mut pres = RecordingPresentation::new();

    ctrl.submit_calibration(10.0, &mut actions, &mut pres)
        .expect("submit ok");
    assert_eq!(pres.count(|c| matches!(c, Rendered::Navigate(_))), 0);
}

#[test]
fn failed_submit_surfaces_action_name() {
    let mut ctrl = CalibrationController::default();
    let mut actions = ScriptedActions::failing("500 Internal Server Error");
    let mut pres = RecordingPresentation::new();

    let err = ctrl
        .submit_calibration(30.0, &mut actions, &mut pres)
        .expect_err("backend failure");
    assert!(format!("{err}").starts_with("Calibration failed:"));
}

#[test]
fn emergency_stop_clears_all_highlights() {
    let mut ctrl = CalibrationController::default();
    let mut actions = ScriptedActions::new();
    let mut pres = RecordingPresentation::new();

    ctrl.start_priming(&mut actions, &mut pres)
        .expect("start ok");
    ctrl.emergency_stop(&mut actions, &mut pres)
        .expect("estop ok");

    assert!(actions.calls.contains(&ActionCall::EmergencyStop));
    assert!(!pres.control_active(ControlKind::Calibrate));
    assert!(!pres.control_active(ControlKind::Prime));
    assert_eq!(ctrl.mode(), PumpMode::Idle);
}

#[test]
fn controller_stays_usable_after_a_failure() {
    let mut ctrl = CalibrationController::default();
    let mut pres = RecordingPresentation::new();

    let mut failing = ScriptedActions::failing("unreachable");
    ctrl.start_calibration(&mut failing, &mut pres)
        .expect_err("fails");

    // Next action on a healthy transport succeeds; nothing is poisoned.
    let mut healthy = ScriptedActions::new();
    ctrl.stop_calibration(&mut healthy, &mut pres)
        .expect("recovers");
    assert_eq!(healthy.calls, vec![ActionCall::StopPump(1)]);
}
