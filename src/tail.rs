//! Live tail session.
//!
//! ```text
//! Connecting ──ok──▶ Streaming ──closed / malformed──▶ Reconnecting
//!     ▲                  │                                  │
//!     └──────────────────┼───────── sleep(interval) ────────┘
//!                        └──fatal──▶ Stopped
//! ```
//!
//! The first connection is never retried: an endpoint that cannot be reached
//! at all is reported straight away. After that, clean closures and
//! undecodable envelopes are retried at a fixed interval for as long as it
//! takes (unless a cap is configured). The loop blocks the calling thread and
//! only ends on a fatal error or when the process is terminated.

use crate::error::{LogsError, Result};
use crate::render::Renderer;
use crate::transport::{Connector, EventSource, LiveEvent, StreamError};
use std::io::Write;
use std::time::Duration;
use url::Url;

/// Default pause between reconnection attempts.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(1);

/// How dropped streams are re-established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Fixed delay before every attempt. Never grows.
    pub interval: Duration,
    /// Consecutive failed attempts tolerated; `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_RECONNECT_INTERVAL,
            max_attempts: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Streaming,
    Reconnecting,
    Stopped,
}

/// Blocks between reconnection attempts.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<T: Sleeper + ?Sized> Sleeper for &mut T {
    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration);
    }
}

/// A live tail bound to one URL and one transport.
pub struct TailSession<'a, S = ThreadSleeper> {
    connector: &'a dyn Connector,
    url: Url,
    policy: ReconnectPolicy,
    sleeper: S,
    state: SessionState,
    reconnects: u64,
}

impl<'a> TailSession<'a> {
    pub fn new(connector: &'a dyn Connector, url: Url, policy: ReconnectPolicy) -> Self {
        Self::with_sleeper(connector, url, policy, ThreadSleeper)
    }
}

impl<'a, S: Sleeper> TailSession<'a, S> {
    pub fn with_sleeper(
        connector: &'a dyn Connector,
        url: Url,
        policy: ReconnectPolicy,
        sleeper: S,
    ) -> Self {
        Self {
            connector,
            url,
            policy,
            sleeper,
            state: SessionState::Connecting,
            reconnects: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Successful reconnections so far.
    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }

    /// Run until a fatal error or until the output is closed (a broken pipe
    /// on stdout). Otherwise a healthy tail only ends with the process.
    pub fn run<O: Write, E: Write>(&mut self, renderer: &mut Renderer<O, E>) -> Result<()> {
        self.state = SessionState::Connecting;
        let mut source = self.connector.connect(&self.url).map_err(|e| {
            self.state = SessionState::Stopped;
            LogsError::ConnectFailed(e.to_string())
        })?;

        loop {
            self.state = SessionState::Streaming;
            let Some(end) = self.stream(source.as_mut(), renderer) else {
                self.state = SessionState::Stopped;
                return Ok(());
            };
            match end {
                StreamError::Closed => {
                    tracing::debug!("remote server broke the connection, reconnecting");
                }
                StreamError::Malformed(reason) => {
                    tracing::debug!(%reason, "undecodable event, reconnecting");
                }
                StreamError::Fatal(reason) => {
                    self.state = SessionState::Stopped;
                    return Err(LogsError::StreamFailed(reason));
                }
            }
            drop(source);
            source = self.reconnect()?;
        }
    }

    /// Pump events into the renderer until the stream gives out. Returns
    /// `None` when the output went away instead.
    fn stream<O: Write, E: Write>(
        &mut self,
        source: &mut dyn EventSource,
        renderer: &mut Renderer<O, E>,
    ) -> Option<StreamError> {
        loop {
            match source.next_event() {
                Ok(LiveEvent::Ping) => {}
                Ok(LiveEvent::Log(payload)) => {
                    renderer.render_raw(payload.trim());
                    renderer.flush();
                    if renderer.is_closed() {
                        return None;
                    }
                }
                Ok(LiveEvent::Other(name)) => {
                    tracing::debug!(event = %name, "ignoring event");
                }
                Err(e) => return Some(e),
            }
        }
    }

    fn reconnect(&mut self) -> Result<Box<dyn EventSource>> {
        self.state = SessionState::Reconnecting;
        let mut attempts: u32 = 0;
        loop {
            if let Some(max) = self.policy.max_attempts {
                if attempts >= max {
                    self.state = SessionState::Stopped;
                    return Err(LogsError::ReconnectExhausted { attempts });
                }
            }
            self.sleeper.sleep(self.policy.interval);
            attempts += 1;

            match self.connector.connect(&self.url) {
                Ok(source) => {
                    self.reconnects += 1;
                    tracing::debug!(attempts, total = self.reconnects, "reconnected");
                    return Ok(source);
                }
                Err(e) => {
                    tracing::debug!(attempt = attempts, error = %e, "reconnection failed");
                }
            }
        }
    }
}
