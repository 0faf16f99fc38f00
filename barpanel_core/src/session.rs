//! Mixing-session state machine.
//!
//! Translates an unordered, possibly duplicated notification stream into a
//! coherent progress display. Every handler is idempotent: a terminal event
//! with no session in flight still performs the terminal UI transition, and
//! progress for an absent session is absorbed silently. The display always
//! reflects the latest received progress value; no monotonic floor is
//! applied, mirroring the eventually-consistent feed.

use std::time::{Duration, Instant};

use barpanel_traits::{Clock, MixingStatusReport, MonotonicClock, Presentation};

/// Lifecycle state of the (at most one) mixing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixingStatus {
    Idle,
    Active,
    /// Terminal; waiting for the success acknowledgment to clear.
    Completed,
    /// Terminal; waiting for the error acknowledgment to clear.
    Failed,
}

/// The single in-flight drink-mixing operation.
#[derive(Debug, Clone)]
pub struct MixingSession {
    drink_name: String,
    progress: f32,
}

impl MixingSession {
    pub fn drink_name(&self) -> &str {
        &self.drink_name
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }
}

/// Owns the session lifecycle and drives the progress overlay.
///
/// The success acknowledgment races a fixed auto-dismiss deadline against an
/// explicit operator ack; whichever fires first wins and the other becomes a
/// no-op. The deadline is checked from the panel loop via [`Self::tick`].
pub struct MixingSessionController<C: Clock = MonotonicClock> {
    status: MixingStatus,
    session: Option<MixingSession>,
    dismiss_at: Option<Instant>,
    dismiss_after: Duration,
    clock: C,
}

impl MixingSessionController<MonotonicClock> {
    pub fn new(dismiss_after: Duration) -> Self {
        Self::with_clock(dismiss_after, MonotonicClock::new())
    }
}

impl<C: Clock> MixingSessionController<C> {
    pub fn with_clock(dismiss_after: Duration, clock: C) -> Self {
        Self {
            status: MixingStatus::Idle,
            session: None,
            dismiss_at: None,
            dismiss_after,
            clock,
        }
    }

    pub fn status(&self) -> MixingStatus {
        self.status
    }

    pub fn session(&self) -> Option<&MixingSession> {
        self.session.as_ref()
    }

    /// Discard all session state without touching the display.
    pub fn reset(&mut self) {
        self.status = MixingStatus::Idle;
        self.session = None;
        self.dismiss_at = None;
    }

    /// A new mixing operation started. Last start wins: any prior session is
    /// discarded unconditionally, even mid-progress.
    pub fn on_start<P: Presentation>(&mut self, drink_name: &str, pres: &mut P) {
        if self.session.is_some() {
            tracing::info!(drink_name, "mixing restarted, discarding prior session");
        } else {
            tracing::info!(drink_name, "mixing started");
        }
        self.session = Some(MixingSession {
            drink_name: drink_name.to_string(),
            progress: 0.0,
        });
        self.status = MixingStatus::Active;
        self.clear_pending_success(pres);
        pres.show_progress_overlay(drink_name);
        pres.update_progress(0);
    }

    /// Progress report. Clamped to [0, 1]; stale or unsolicited values
    /// (no active session, non-finite input) are absorbed silently.
    pub fn on_progress<P: Presentation>(&mut self, progress: f32, pres: &mut P) {
        if self.status != MixingStatus::Active {
            tracing::debug!(progress, "progress without active session, ignoring");
            return;
        }
        if !progress.is_finite() {
            tracing::debug!("non-finite progress, ignoring");
            return;
        }
        let clamped = progress.clamp(0.0, 1.0);
        if let Some(session) = self.session.as_mut() {
            session.progress = clamped;
        }
        pres.update_progress(Self::percent(clamped));
    }

    /// The mixing operation finished. Idempotent: a redelivered or late
    /// completion performs the same terminal transition.
    pub fn on_complete<P: Presentation>(&mut self, pres: &mut P) {
        tracing::info!("mixing complete");
        self.session = None;
        self.status = MixingStatus::Completed;
        pres.hide_progress_overlay();
        pres.show_success();
        self.dismiss_at = Some(self.clock.now() + self.dismiss_after);
    }

    /// The backend reported a mixing failure; surfaced verbatim. Idempotent
    /// like [`Self::on_complete`].
    pub fn on_error<P: Presentation>(&mut self, message: &str, pres: &mut P) {
        tracing::warn!(error = message, "mixing failed");
        self.session = None;
        self.status = MixingStatus::Failed;
        self.clear_pending_success(pres);
        pres.hide_progress_overlay();
        pres.show_error(message);
    }

    /// Check the auto-dismiss deadline; called from the panel loop heartbeat.
    pub fn tick<P: Presentation>(&mut self, pres: &mut P) {
        if let Some(deadline) = self.dismiss_at
            && self.clock.deadline_passed(deadline)
        {
            self.dismiss_at = None;
            pres.hide_success();
            if self.status == MixingStatus::Completed {
                self.status = MixingStatus::Idle;
            }
        }
    }

    /// Explicit operator ack of the success message. No-op when the
    /// auto-dismiss deadline already fired.
    pub fn acknowledge_success<P: Presentation>(&mut self, pres: &mut P) {
        if self.dismiss_at.take().is_some() {
            pres.hide_success();
            if self.status == MixingStatus::Completed {
                self.status = MixingStatus::Idle;
            }
        }
    }

    /// Operator ack of the error surface; returns a Failed session to Idle.
    pub fn acknowledge_error(&mut self) {
        if self.status == MixingStatus::Failed {
            self.status = MixingStatus::Idle;
        }
    }

    /// Seed the display from the backend's mixing status, used once at
    /// startup so a client restart mid-mix shows the overlay again. The
    /// drink name is unknown until the next start event.
    pub fn resync<P: Presentation>(&mut self, report: &MixingStatusReport, pres: &mut P) {
        if !report.is_mixing {
            // A failure that happened while the client was away still wants
            // acknowledging.
            if let Some(error) = &report.error {
                self.on_error(error, pres);
            }
            return;
        }
        let progress = if report.progress.is_finite() {
            report.progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        tracing::info!(progress, "resynchronized to mixing in progress");
        self.session = Some(MixingSession {
            drink_name: String::new(),
            progress,
        });
        self.status = MixingStatus::Active;
        self.clear_pending_success(pres);
        pres.show_progress_overlay("");
        pres.update_progress(Self::percent(progress));
    }

    /// A superseding start or an error must not leave a stale success
    /// message waiting on a deadline that was just cancelled.
    fn clear_pending_success<P: Presentation>(&mut self, pres: &mut P) {
        if self.dismiss_at.take().is_some() {
            pres.hide_success();
        }
    }

    fn percent(progress: f32) -> u8 {
        (progress * 100.0).round() as u8
    }
}
