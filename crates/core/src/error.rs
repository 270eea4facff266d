use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoghookError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("log source error: {0}")]
    Source(String),

    #[error("delivery error: {0}")]
    Delivery(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl LoghookError {
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    pub fn is_delivery(&self) -> bool {
        matches!(self, Self::Delivery(_))
    }
}

pub type Result<T> = std::result::Result<T, LoghookError>;
