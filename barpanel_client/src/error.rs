use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http client error: {0}")]
    Http(String),
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
