use thiserror::Error;

/// Unified error taxonomy for every public entry point.
///
/// Each call resolves exactly once with either a success value or a single
/// `LastFmError`; the crate never retries on the caller's behalf.
#[derive(Error, Debug)]
pub enum LastFmError {
    /// Transport-level failure: connectivity, DNS, TLS or timeout.
    #[error("network error: {0}")]
    Network(String),

    /// Failure declared by the remote service in its error envelope,
    /// regardless of the HTTP status it arrived with.
    #[error("service error {code}: {message}")]
    Service { code: i32, message: String },

    /// The response body did not match the expected shape.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// A privileged method was called while signed out.
    #[error("authentication required: sign in before calling privileged methods")]
    AuthenticationRequired,

    /// Caller-supplied argument rejected, before or after dispatch.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The secure session store failed to read, write or delete an entry.
    #[error("session storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(#[from] crate::core::config::ConfigError),
}

impl LastFmError {
    /// Shorthand for caller-misuse errors raised before dispatch.
    pub fn invalid_parameter(name: &str, reason: &str) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}
