//! Signed log endpoints and the URL variants derived from them.

use crate::error::Result;
use serde::Deserialize;
use std::fmt;
use url::Url;

/// Which live transport a tail session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Full-duplex socket carrying JSON envelopes.
    WebSocket,
    /// One-way `name: payload` event stream over plain HTTP.
    EventStream,
}

/// Transport requested by configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportPreference {
    /// Decide from the endpoint handed out by the API.
    #[default]
    Auto,
    #[serde(alias = "socket")]
    Websocket,
    EventStream,
}

impl fmt::Display for TransportPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportPreference::Auto => write!(f, "auto"),
            TransportPreference::Websocket => write!(f, "websocket"),
            TransportPreference::EventStream => write!(f, "event-stream"),
        }
    }
}

/// A signed, time-limited log URL returned by the upstream API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEndpoint {
    url: Url,
}

impl StreamEndpoint {
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(Self {
            url: Url::parse(raw)?,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Scheme as returned upstream.
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    fn is_secure(&self) -> bool {
        matches!(self.scheme(), "https" | "wss")
    }

    /// URL for a one-shot historical fetch.
    ///
    /// Socket schemes are mapped back to their HTTP counterparts. `n` is only
    /// sent for positive counts so the server default applies otherwise.
    pub fn history_url(&self, max_lines: i64, filter: &str) -> Url {
        let mut url = self.url.clone();
        set_scheme(&mut url, if self.is_secure() { "https" } else { "http" });
        let count = max_lines.to_string();
        let mut params = Vec::new();
        if max_lines > 0 {
            params.push(("n", count.as_str()));
        }
        if !filter.is_empty() {
            params.push(("filter", filter));
        }
        append_params(&mut url, &params);
        url
    }

    /// URL for a live tail over the given transport.
    ///
    /// Only `https` upgrades to `wss`; every other scheme becomes `ws`.
    pub fn live_url(&self, kind: TransportKind, filter: &str) -> Url {
        let mut url = self.url.clone();
        let scheme = match kind {
            TransportKind::WebSocket if self.scheme() == "https" || self.scheme() == "wss" => "wss",
            TransportKind::WebSocket => "ws",
            TransportKind::EventStream if self.is_secure() => "https",
            TransportKind::EventStream => "http",
        };
        set_scheme(&mut url, scheme);
        let mut params = vec![("stream", "true")];
        if !filter.is_empty() {
            params.push(("filter", filter));
        }
        append_params(&mut url, &params);
        url
    }
}

/// Append query pairs after the signature parameters. An endpoint without
/// a query stays without one when there is nothing to add.
fn append_params(url: &mut Url, params: &[(&str, &str)]) {
    if params.is_empty() {
        return;
    }
    url.query_pairs_mut().extend_pairs(params);
}

/// Switch between http(s) and ws(s). Both are "special" schemes in the URL
/// standard, so `Url::set_scheme` accepts the change.
fn set_scheme(url: &mut Url, scheme: &str) {
    if url.set_scheme(scheme).is_err() {
        tracing::debug!(from = url.scheme(), to = scheme, "scheme rewrite rejected");
    }
}

impl TransportKind {
    /// Pick the live transport once for a session.
    ///
    /// The API hands out the history URL (`http(s)`) for live tailing too;
    /// the log service serves its socket on that same URL once upgraded to
    /// `ws(s)`. So with `Auto` both HTTP and socket schemes select the
    /// socket, and the event stream is only used when configured.
    ///
    /// Returns `None` for schemes neither transport can speak.
    pub fn select(endpoint: &StreamEndpoint, preference: TransportPreference) -> Option<Self> {
        if !matches!(endpoint.scheme(), "http" | "https" | "ws" | "wss") {
            return None;
        }
        Some(match preference {
            TransportPreference::EventStream => TransportKind::EventStream,
            TransportPreference::Auto | TransportPreference::Websocket => TransportKind::WebSocket,
        })
    }
}
