use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum PanelError {
    /// A device action failed in transport or was rejected by the backend.
    /// Renders as "<Action> failed: <reason>" for the error surface.
    #[error("{action} failed: {reason}")]
    Action { action: String, reason: String },
    #[error("{0}")]
    Validation(String),
}

impl PanelError {
    pub fn action(action: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Action {
            action: action.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
