//! Event-stream transport: a never-ending HTTP body of `name: payload`
//! lines, payloads HTML-escaped.

use super::{is_disconnect, user_agent, ConnectError, Connector, EventSource, LiveEvent, StreamError};
use crate::frame;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use std::io::{BufRead, BufReader, Read};
use std::time::Duration;
use url::Url;

/// Decode one non-blank line of an event stream.
pub fn decode_line(line: &str) -> Result<LiveEvent, StreamError> {
    if frame::is_comment(line) {
        return Ok(LiveEvent::Ping);
    }
    let frame = frame::parse_frame(line)
        .ok_or_else(|| StreamError::Malformed(format!("no frame prefix in {:?}", line)))?;
    if frame.is_keepalive() {
        Ok(LiveEvent::Ping)
    } else if frame.is_control() {
        Ok(LiveEvent::Other(frame.name))
    } else {
        Ok(LiveEvent::Log(frame.payload))
    }
}

/// Reads frames from any byte stream. Split out from the HTTP plumbing so
/// it can be driven from memory.
pub struct FrameReader<R> {
    reader: BufReader<R>,
    line: String,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            line: String::new(),
        }
    }
}

impl<R: Read> EventSource for FrameReader<R> {
    fn next_event(&mut self) -> Result<LiveEvent, StreamError> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return Err(StreamError::Closed),
                Ok(_) => {
                    let line = self.line.trim_end_matches(['\r', '\n']);
                    // Blank lines separate events.
                    if line.is_empty() {
                        continue;
                    }
                    return decode_line(line);
                }
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    return Err(StreamError::Malformed(e.to_string()))
                }
                Err(e) if is_disconnect(&e) => return Err(StreamError::Closed),
                Err(e) => return Err(StreamError::Fatal(e.to_string())),
            }
        }
    }
}

/// Opens event streams over HTTP with no read timeout.
#[derive(Debug, Clone)]
pub struct EventStreamConnector {
    client: Client,
}

impl EventStreamConnector {
    pub fn new() -> Result<Self, ConnectError> {
        let client = Client::builder()
            .user_agent(user_agent())
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| ConnectError(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Connector for EventStreamConnector {
    fn connect(&self, url: &Url) -> Result<Box<dyn EventSource>, ConnectError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "text/event-stream")
            .send()
            .map_err(|e| ConnectError(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ConnectError(format!("server answered {}", response.status())));
        }
        tracing::debug!(%url, "event stream connected");
        Ok(Box::new(FrameReader::new(response)))
    }
}
