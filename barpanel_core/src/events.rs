//! Typed events delivered by the machine's push feed.
//!
//! The feed is fire-and-forget with no acknowledgment back-channel, and
//! delivery order is not guaranteed to match emission order. Handlers must
//! therefore be idempotent and order-tolerant; see the session controller.

/// One notification from the backend about the mixing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum MachineEvent {
    /// A new mixing operation started; supersedes any session in flight.
    MixingStart { drink_name: String },
    /// Progress in [0, 1]; may arrive duplicated or out of order.
    MixingProgress { progress: f32 },
    MixingComplete,
    /// Backend-reported failure, terminal for the session.
    MixingError { error: String },
}
