/// Error types for pool polling and setup
///
/// Three kinds of failure reach callers:
/// - `Connection`: upstream unreachable, non-200 status or undecodable body (transient)
/// - `UnsupportedSource`: unknown pool source key (configuration error)
/// - `Unexpected`: anything else, e.g. a response missing a required field
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("{message}")]
    Connection {
        message: String,
        #[source]
        source: Option<TransportError>,
    },

    #[error("Unsupported pool source: {0}")]
    UnsupportedSource(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Low-level cause kept behind a connection error for diagnostics
#[derive(Error, Debug)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

impl PoolError {
    /// Connection error without an underlying cause
    pub fn connection(message: impl Into<String>) -> Self {
        PoolError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Connection error wrapping a transport-level cause
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl Into<TransportError>,
    ) -> Self {
        PoolError::Connection {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        PoolError::Unexpected(message.into())
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, PoolError::Connection { .. })
    }

    /// Transient failures worth trying again on the next poll
    pub fn is_recoverable(&self) -> bool {
        match self {
            PoolError::Connection { .. } => true,
            PoolError::UnsupportedSource(_) => false,
            PoolError::Unexpected(_) => false,
        }
    }
}

pub type PoolResult<T> = std::result::Result<T, PoolError>;

/// Errors surfaced by the setup validation flow
///
/// Maps onto the fixed vocabulary shown next to a configuration form.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Cannot connect: {0}")]
    CannotConnect(#[source] PoolError),

    #[error("Unknown error: {0}")]
    Unknown(#[source] PoolError),
}

impl SetupError {
    pub fn error_key(&self) -> &'static str {
        match self {
            SetupError::CannotConnect(_) => "cannot_connect",
            SetupError::Unknown(_) => "unknown",
        }
    }
}

impl From<PoolError> for SetupError {
    fn from(error: PoolError) -> Self {
        if error.is_connection() {
            SetupError::CannotConnect(error)
        } else {
            SetupError::Unknown(error)
        }
    }
}
