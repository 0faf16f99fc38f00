#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Transport-agnostic panel logic for the drink machine's operator client.
//!
//! All machine interaction goes through `barpanel_traits::DeviceActions`
//! and all rendering through `barpanel_traits::Presentation`.
//!
//! ## Architecture
//!
//! - **Session**: mixing-session state machine tolerant of unordered and
//!   duplicated push events (`session` module)
//! - **Calibration**: pump selection plus calibrate/prime round-trips with
//!   optimistic control highlighting (`calibration` module)
//! - **Hoses**: periodic read-only fill-level refresh (`hoses` module)
//! - **Panel**: the single-threaded event loop serializing all of the above
//!   (`panel` module)
//!
//! Handlers never retry: feed events are fire-and-forget, and failed device
//! actions are surfaced once through the shared error surface.

pub mod calibration;
pub mod config;
pub mod error;
pub mod events;
pub mod hoses;
pub mod mocks;
pub mod panel;
pub mod session;

pub use calibration::{
    CalibrationController, OptimisticRollback, PUMP_MAX, PUMP_MIN, PumpMode,
    validate_bottle_volumes,
};
pub use config::PanelCfg;
pub use error::{PanelError, Result};
pub use events::MachineEvent;
pub use hoses::HoseStatusPoller;
pub use panel::{OperatorInput, Panel};
pub use session::{MixingSession, MixingSessionController, MixingStatus};
