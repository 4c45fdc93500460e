//! Live log transports.
//!
//! A [`Connector`] opens an [`EventSource`] for a live URL; the tail session
//! only ever sees these two traits. Two implementations exist because the
//! log service has exposed both over time:
//! - [`socket`]: a WebSocket carrying JSON envelopes
//! - [`event_stream`]: a long-lived HTTP response of `name: payload` frames

pub mod event_stream;
pub mod socket;

use crate::endpoint::TransportKind;
use std::fmt;
use url::Url;

pub use event_stream::EventStreamConnector;
pub use socket::WebSocketConnector;

/// Origin announced when opening a live stream.
pub fn client_origin() -> String {
    format!("http://apptail-cli.local/{}", env!("CARGO_PKG_VERSION"))
}

/// User agent sent on every request.
pub fn user_agent() -> String {
    format!("apptail/{}", env!("CARGO_PKG_VERSION"))
}

/// One decoded live event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEvent {
    /// Keepalive; carries nothing.
    Ping,
    /// Raw log payload, possibly several lines.
    Log(String),
    /// Any other named event. Ignored by the session.
    Other(String),
}

/// Why an event could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The server closed the stream cleanly (or the peer went away).
    Closed,
    /// An envelope could not be decoded.
    Malformed(String),
    /// Anything a reconnect will not fix.
    Fatal(String),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Closed => write!(f, "stream closed by remote"),
            StreamError::Malformed(msg) => write!(f, "malformed frame: {}", msg),
            StreamError::Fatal(msg) => write!(f, "{}", msg),
        }
    }
}

/// A connection could not be opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectError(pub String);

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConnectError {}

/// An open live stream, read one event at a time. Reads block.
pub trait EventSource {
    fn next_event(&mut self) -> Result<LiveEvent, StreamError>;
}

/// Opens live streams.
pub trait Connector {
    fn connect(&self, url: &Url) -> Result<Box<dyn EventSource>, ConnectError>;
}

/// Connector for a transport kind chosen at session start.
pub fn connector_for(kind: TransportKind) -> Result<Box<dyn Connector>, ConnectError> {
    Ok(match kind {
        TransportKind::WebSocket => Box::new(WebSocketConnector::new()),
        TransportKind::EventStream => Box::new(EventStreamConnector::new()?),
    })
}

/// I/O errors that mean the peer went away rather than something broke.
pub(crate) fn is_disconnect(err: &std::io::Error) -> bool {
    use std::io::ErrorKind;
    matches!(
        err.kind(),
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
    )
}
