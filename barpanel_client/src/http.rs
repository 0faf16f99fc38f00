//! Blocking HTTP implementation of `DeviceActions` against the machine
//! backend. One request per action, no retries; redirects are reported to
//! the caller as an [`ActionOutcome`] instead of being followed, since the
//! panel decides where to navigate.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::LOCATION;
use serde::Deserialize;

use barpanel_traits::{
    ActionError, ActionOutcome, DeviceActions, HoseStatusSnapshot, MixingStatusReport,
};

use crate::error::ClientError;

pub struct HttpActions {
    base: String,
    client: Client,
}

impl HttpActions {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Ok(Self {
            base: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    fn post_empty(&self, path: &str) -> Result<Response, ActionError> {
        let resp = self.client.post(self.url(path)).send()?;
        Ok(resp.error_for_status()?)
    }
}

#[derive(Debug, Deserialize)]
struct HoseEntryWire {
    percent: f32,
}

#[derive(Debug, Deserialize)]
struct MixingStatusWire {
    is_mixing: bool,
    #[serde(default)]
    progress: f32,
    #[serde(default)]
    error: Option<String>,
}

/// Map a submit response to an outcome: 3xx carries the location to follow,
/// anything else must simply be a success status.
fn submit_outcome(resp: Response) -> Result<ActionOutcome, ActionError> {
    if resp.status().is_redirection() {
        let location = resp
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("/")
            .to_string();
        return Ok(ActionOutcome::Redirect(location));
    }
    resp.error_for_status()?;
    Ok(ActionOutcome::Done)
}

fn parse_seconds(body: &str) -> Result<f32, ActionError> {
    body.trim()
        .parse::<f32>()
        .map_err(|_| ClientError::Parse(format!("expected elapsed seconds, got {body:?}")).into())
}

impl DeviceActions for HttpActions {
    fn start_pump(&mut self, pump_id: u8) -> Result<(), ActionError> {
        self.post_empty(&format!("/start_pump/{pump_id}"))?;
        Ok(())
    }

    fn stop_pump(&mut self, pump_id: u8) -> Result<f32, ActionError> {
        let body = self.post_empty(&format!("/stop_pump/{pump_id}"))?.text()?;
        parse_seconds(&body)
    }

    fn calibrate_pump(
        &mut self,
        pump_id: u8,
        dispensed_volume: f32,
    ) -> Result<ActionOutcome, ActionError> {
        let resp = self
            .client
            .post(self.url("/calibrate_pump"))
            .form(&[
                ("pump_id", pump_id.to_string()),
                ("dispensed_volume", dispensed_volume.to_string()),
            ])
            .send()?;
        submit_outcome(resp)
    }

    fn start_prime(&mut self, pump_id: u8) -> Result<(), ActionError> {
        self.post_empty(&format!("/start_prime/{pump_id}"))?;
        Ok(())
    }

    fn stop_prime(&mut self, pump_id: u8) -> Result<f32, ActionError> {
        let body = self.post_empty(&format!("/stop_prime/{pump_id}"))?.text()?;
        parse_seconds(&body)
    }

    fn prime_hose(&mut self, pump_id: u8) -> Result<ActionOutcome, ActionError> {
        let resp = self
            .client
            .post(self.url("/prime_hose"))
            .form(&[("pump_id", pump_id.to_string())])
            .send()?;
        submit_outcome(resp)
    }

    fn hose_status(&mut self) -> Result<HoseStatusSnapshot, ActionError> {
        let resp = self.client.get(self.url("/api/hose_status")).send()?;
        let map: HashMap<String, HoseEntryWire> = resp.error_for_status()?.json()?;
        Ok(snapshot_from_map(&map))
    }

    fn mixing_status(&mut self) -> Result<MixingStatusReport, ActionError> {
        let resp = self.client.get(self.url("/api/mixing_status")).send()?;
        let wire: MixingStatusWire = resp.error_for_status()?.json()?;
        Ok(MixingStatusReport {
            is_mixing: wire.is_mixing,
            progress: wire.progress,
            error: wire.error,
        })
    }

    fn emergency_stop(&mut self) -> Result<(), ActionError> {
        let resp = self.client.post(self.url("/emergency_stop")).send()?;
        // The backend redirects back to the page that triggered the stop.
        if !resp.status().is_redirection() {
            resp.error_for_status()?;
        }
        Ok(())
    }
}

/// Hose keys arrive as strings; anything that is not a hose index in 1..=8
/// is skipped rather than failing the whole snapshot.
fn snapshot_from_map(map: &HashMap<String, HoseEntryWire>) -> HoseStatusSnapshot {
    let mut snapshot = HoseStatusSnapshot::default();
    for (key, entry) in map {
        match key.trim().parse::<u8>() {
            Ok(hose) => snapshot.set(hose, entry.percent),
            Err(_) => tracing::debug!(key, "ignoring non-numeric hose key"),
        }
    }
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("12.75\n", Some(12.75))]
    #[case("3", Some(3.0))]
    #[case("  0.0  ", Some(0.0))]
    #[case("Pump was not started", None)]
    #[case("", None)]
    fn parses_elapsed_seconds(#[case] body: &str, #[case] expected: Option<f32>) {
        assert_eq!(parse_seconds(body).ok(), expected);
    }

    #[test]
    fn snapshot_parses_numeric_keys_and_skips_others() {
        let json = r#"{"1": {"percent": 80.5}, "8": {"percent": 5.0}, "total": {"percent": 1.0}}"#;
        let map: HashMap<String, HoseEntryWire> = serde_json::from_str(json).expect("valid json");
        let snap = snapshot_from_map(&map);
        assert_eq!(snap.get(1), Some(80.5));
        assert_eq!(snap.get(8), Some(5.0));
        assert_eq!(snap.get(2), None);
    }
}
