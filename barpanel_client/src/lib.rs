#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Transport layer for the panel: blocking HTTP device actions, the
//! server-push notification feed, and a simulated backend.

pub mod error;
pub mod feed;
pub mod http;
pub mod sim;

pub use error::ClientError;
pub use feed::NotificationFeed;
pub use http::HttpActions;
pub use sim::SimulatedActions;
