//! Upstream error taxonomy.

/// Failures a connector call can produce.
///
/// The three variants are deliberately distinguishable by their display
/// strings so callers can tell a business rejection from a connectivity
/// problem from a contract drift.
#[derive(thiserror::Error, Debug)]
pub enum ConnectorError {
    /// The service answered with an error payload.
    #[error("upstream service error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// No response was received at all (timeout, refused connection, DNS).
    #[error("no response from upstream service: {0}")]
    NoResponse(String),

    /// The service answered, but the payload did not match the expected shape.
    #[error("unexpected upstream response shape: {0}")]
    UnexpectedShape(String),
}

impl ConnectorError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ConnectorError::Upstream {
            status: 404,
            message: what.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ConnectorError::Upstream {
            status: 401,
            message: message.into(),
        }
    }

    /// True when the upstream reported "no such entity".
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConnectorError::Upstream { status: 404, .. })
    }
}

pub type ConnectorResult<T> = Result<T, ConnectorError>;
