use thiserror::Error;

/// Top-level error type for the `ptzctl-api` crate.
///
/// Covers every failure mode of a device exchange: transport, SOAP
/// faults, authentication, and malformed responses. `ptzctl-core`
/// surfaces these to callers as driver errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The camera rejected the WS-Security credentials.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── SOAP ────────────────────────────────────────────────────────
    /// The device answered with a SOAP fault.
    #[error("Device fault ({code}): {reason}")]
    Fault { code: String, reason: String },

    /// Non-success HTTP status without a parseable fault body.
    #[error("Device returned HTTP {status}")]
    Http { status: u16 },

    /// The response was well-formed but lacked an expected element.
    #[error("Unexpected device response: {message}")]
    Protocol { message: String },

    // ── Capability ──────────────────────────────────────────────────
    /// The device does not offer the service this operation needs.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}

impl Error {
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}
