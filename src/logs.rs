//! `tail_logs`: validate, dump the backlog, then optionally follow.

use crate::api::LogsApi;
use crate::endpoint::{TransportKind, TransportPreference};
use crate::error::{LogsError, Result};
use crate::fetch::{self, FetchOutcome};
use crate::filter;
use crate::render::Renderer;
use crate::tail::{ReconnectPolicy, TailSession};
use std::fmt;
use std::io::Write;

/// Whose logs to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    App(String),
    /// Logs of a database or other add-on attached to `app`. Not filterable.
    Addon { app: String, addon: String },
}

impl fmt::Display for LogTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogTarget::App(app) => write!(f, "{}", app),
            LogTarget::Addon { app, addon } => write!(f, "{}/{}", app, addon),
        }
    }
}

/// Caller-chosen behaviour for one invocation.
#[derive(Debug, Clone)]
pub struct TailOptions {
    /// Follow the live stream after the backlog.
    pub stream: bool,
    /// Backlog size; zero or negative leaves it to the server.
    pub max_lines: i64,
    /// `|`-separated process filter, empty for none.
    pub filter: String,
    pub transport: TransportPreference,
    pub reconnect: ReconnectPolicy,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            stream: false,
            max_lines: 20,
            filter: String::new(),
            transport: TransportPreference::Auto,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

/// Print the last `max_lines` lines for `target`, then keep following the
/// live stream if `options.stream` is set.
///
/// The filter is checked against the live process list before any log
/// request is made. With `stream` set, this only returns on error.
pub fn tail_logs<A, O, E>(
    api: &A,
    target: &LogTarget,
    options: &TailOptions,
    renderer: &mut Renderer<O, E>,
) -> Result<()>
where
    A: LogsApi + ?Sized,
    O: Write,
    E: Write,
{
    let filter = match target {
        LogTarget::App(app) => {
            filter::check_filter(api, app, &options.filter)?;
            options.filter.as_str()
        }
        LogTarget::Addon { .. } => {
            if !options.filter.is_empty() {
                tracing::debug!(%target, "add-on logs cannot be filtered, ignoring filter");
            }
            ""
        }
    };

    let endpoint = api.log_endpoint(target)?;
    tracing::debug!(%target, scheme = endpoint.scheme(), "log endpoint resolved");

    if let FetchOutcome::Rendered(count) =
        fetch::dump_logs(api, &endpoint, options.max_lines, filter, renderer)?
    {
        tracing::debug!(count, "historical logs rendered");
    }

    if !options.stream || renderer.is_closed() {
        return Ok(());
    }

    let kind = TransportKind::select(&endpoint, options.transport).ok_or_else(|| {
        LogsError::ConnectFailed(format!(
            "unsupported log endpoint scheme '{}'",
            endpoint.scheme()
        ))
    })?;
    let connector = api
        .live_connector(kind)
        .map_err(|e| LogsError::ConnectFailed(e.to_string()))?;
    let url = endpoint.live_url(kind, filter);
    tracing::debug!(?kind, "starting live tail");

    TailSession::new(connector.as_ref(), url, options.reconnect).run(renderer)
}
