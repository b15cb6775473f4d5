//! Error taxonomy for the FactFlow client.
//!
//! Variants map to the handling policy at each boundary: validation and
//! extraction failures never reach the network, `AuthExpired` forces a
//! sign-out wherever it surfaces, and raw HTTP failures (`Api`) are converted
//! to the operation-specific variant at the call site.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad user input. Handled locally, never sent over the wire.
    #[error("{0}")]
    Validation(String),

    /// Page content inaccessible or too short to analyze.
    #[error("{0}")]
    Extraction(String),

    /// The analysis endpoint answered with a non-2xx status.
    #[error("analysis request failed (HTTP {status})")]
    Analysis { status: u16 },

    /// Sign-in or registration rejected by the server.
    #[error("{0}")]
    Auth(String),

    /// A 401 from any authenticated endpoint. The session is over.
    #[error("session expired, please sign in again")]
    AuthExpired,

    /// Vote submission failed; the optimistic update has been rolled back.
    #[error("vote not recorded: {0}")]
    Vote(String),

    /// Non-2xx HTTP response that has not been classified yet.
    #[error("server error (HTTP {status}){}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Api { status: u16, detail: Option<String> },

    /// The request never reached the server (DNS, refused, timeout).
    #[error("network error: {0}")]
    Transport(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        // A reqwest error carrying a status means the server answered; keep
        // the status so callers can classify it. Anything else is transport.
        match e.status() {
            Some(status) => Error::Api {
                status: status.as_u16(),
                detail: None,
            },
            None => Error::Transport(e.to_string()),
        }
    }
}

impl Error {
    /// True when the server was never reached. The mock-data fallback is
    /// allowed only for these failures, never for a real 4xx/5xx.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}
