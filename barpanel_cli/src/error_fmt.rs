//! Human-readable error descriptions for top-level failures.

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use barpanel_core::PanelError;

    // Typed matches first
    if let Some(pe) = err.downcast_ref::<PanelError>() {
        return match pe {
            PanelError::Action { action, reason } => format!(
                "What happened: {action} failed: {reason}.\nLikely causes: Machine rejected the request or the network dropped it.\nHow to fix: Check the machine is powered and reachable, then retry."
            ),
            PanelError::Validation(msg) => format!(
                "What happened: Invalid input ({msg}).\nLikely causes: A volume or pump number outside the accepted range.\nHow to fix: Correct the value and submit again."
            ),
        };
    }

    if let Some(ce) = err.downcast_ref::<barpanel_client::ClientError>() {
        return format!(
            "What happened: {ce}.\nLikely causes: Server not running, wrong base_url, or a timeout shorter than the server needs.\nHow to fix: Verify [server].base_url and timeout_ms in the config, and that the machine answers at that address."
        );
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("base_url") || lower.contains("invalid configuration") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Missing [server] section or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    if lower.contains("no such file") || lower.contains("read config") {
        return "What happened: The config file could not be read.\nLikely causes: Wrong --config path or the file does not exist yet.\nHow to fix: Pass --config <FILE> pointing at a valid TOML config.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use barpanel_core::PanelError;
    use serde_json::json;

    let reason = match err.downcast_ref::<PanelError>() {
        Some(PanelError::Action { .. }) => "Action",
        Some(PanelError::Validation(_)) => "Validation",
        None => "Error",
    };
    json!({ "reason": reason, "message": humanize(err) }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use barpanel_core::PanelError;

    #[test]
    fn action_errors_keep_the_action_name() {
        let err = eyre::Report::new(PanelError::action("Calibration", "500 Internal Server Error"));
        let text = humanize(&err);
        assert!(text.contains("Calibration failed: 500 Internal Server Error"));
    }

    #[test]
    fn json_output_carries_the_reason() {
        let err = eyre::Report::new(PanelError::Validation("volume must be positive".into()));
        let json: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(json["reason"], "Validation");
    }
}
