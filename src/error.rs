//! Error taxonomy for log retrieval and tailing.
//!
//! Only validation and first-connect failures are meant to reach the user.
//! Dropped connections and malformed frames never show up here: they are
//! absorbed by the tail session and the historical fetcher.

use thiserror::Error;

/// Errors surfaced by [`crate::logs::tail_logs`] and its collaborators.
#[derive(Debug, Error)]
pub enum LogsError {
    /// A filter term matched none of the application's process types.
    #[error(
        "{term} is not a valid container filter\n\nEXAMPLES:\n\
         \"apptail logs -F web\": logs of every web containers\n\
         \"apptail logs -F web-1\": logs of web container 1\n\
         \"apptail logs -F web|worker\": logs of every web and worker containers\n"
    )]
    InvalidFilter { term: String },

    /// The historical log request answered with a non-2xx status.
    #[error("fail to query logs: {status}")]
    FetchFailed { status: String },

    /// The very first live connection could not be established.
    #[error("fail to connect to the log stream: {0}")]
    ConnectFailed(String),

    /// The live stream broke in a way a reconnect cannot fix.
    #[error("log stream failed: {0}")]
    StreamFailed(String),

    /// The configured reconnect budget ran out.
    #[error("gave up after {attempts} reconnection attempts")]
    ReconnectExhausted { attempts: u32 },

    /// The upstream API refused a request.
    #[error("fail to {what}: {status}")]
    Api { what: &'static str, status: String },

    /// The upstream API answered with a body we could not decode.
    #[error("invalid API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid log endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = LogsError> = std::result::Result<T, E>;
