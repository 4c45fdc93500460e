//! WebSocket transport: one JSON envelope per text message.

use super::{client_origin, is_disconnect, ConnectError, Connector, EventSource, LiveEvent, StreamError};
use serde::Deserialize;
use std::net::TcpStream;
use tungstenite::client::IntoClientRequest;
use tungstenite::error::ProtocolError;
use tungstenite::http::header::{HeaderValue, ORIGIN, USER_AGENT};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Error as WsError, Message, WebSocket};
use url::Url;

/// Wire envelope: `{"event": "log", "log": "...", "timestamp": "..."}`.
/// The timestamp is already part of the log text and is not read.
#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    log: String,
}

/// Decode one envelope into a live event.
pub fn decode_envelope(text: &str) -> Result<LiveEvent, StreamError> {
    let envelope: Envelope =
        serde_json::from_str(text).map_err(|e| StreamError::Malformed(e.to_string()))?;
    Ok(match envelope.event.as_str() {
        "ping" => LiveEvent::Ping,
        "log" => LiveEvent::Log(envelope.log),
        _ => LiveEvent::Other(envelope.event),
    })
}

/// Opens WebSocket connections with the client origin header set.
#[derive(Debug, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for WebSocketConnector {
    fn connect(&self, url: &Url) -> Result<Box<dyn EventSource>, ConnectError> {
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| ConnectError(e.to_string()))?;
        let headers = request.headers_mut();
        for (name, value) in [(ORIGIN, client_origin()), (USER_AGENT, super::user_agent())] {
            let value = HeaderValue::from_str(&value).map_err(|e| ConnectError(e.to_string()))?;
            headers.insert(name, value);
        }

        let (socket, _response) = tungstenite::connect(request).map_err(|e| match e {
            WsError::Http(response) => ConnectError(format!("server answered {}", response.status())),
            other => ConnectError(other.to_string()),
        })?;
        tracing::debug!(%url, "websocket connected");
        Ok(Box::new(WebSocketSource { socket }))
    }
}

struct WebSocketSource {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
}

impl EventSource for WebSocketSource {
    fn next_event(&mut self) -> Result<LiveEvent, StreamError> {
        loop {
            match self.socket.read() {
                Ok(Message::Text(text)) => return decode_envelope(&text),
                Ok(Message::Binary(bytes)) => {
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|e| StreamError::Malformed(e.to_string()))?;
                    return decode_envelope(text);
                }
                Ok(Message::Close(_)) => return Err(StreamError::Closed),
                // Control frames are answered by tungstenite itself.
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => continue,
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                    return Err(StreamError::Closed)
                }
                Err(WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake)) => {
                    return Err(StreamError::Closed)
                }
                Err(WsError::Io(e)) if is_disconnect(&e) => return Err(StreamError::Closed),
                Err(e) => return Err(StreamError::Fatal(e.to_string())),
            }
        }
    }
}
