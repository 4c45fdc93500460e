//! In-memory collaborators for unit tests.

use crate::api::{HistoryResponse, LogsApi};
use crate::endpoint::{StreamEndpoint, TransportKind};
use crate::error::Result;
use crate::logs::LogTarget;
use crate::tail::Sleeper;
use crate::transport::{ConnectError, Connector, EventSource, LiveEvent, StreamError};
use reqwest::StatusCode;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{self, Cursor, Write};
use std::rc::Rc;
use std::time::Duration;
use url::Url;

/// Shared, ordered record of collaborator calls.
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<&'static str>>>);

impl Journal {
    pub fn record(&self, entry: &'static str) {
        self.0.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<&'static str> {
        self.0.borrow().clone()
    }
}

/// Writer whose reader has gone away, like stdout piped into `head`.
pub struct ClosedPipe;

impl Write for ClosedPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }
}

type Script = VecDeque<std::result::Result<LiveEvent, StreamError>>;

/// Event source that replays a fixed script, then fails fatally.
pub struct ScriptedSource {
    events: Script,
}

impl EventSource for ScriptedSource {
    fn next_event(&mut self) -> std::result::Result<LiveEvent, StreamError> {
        self.events
            .pop_front()
            .unwrap_or_else(|| Err(StreamError::Fatal("script exhausted".to_string())))
    }
}

/// Connector whose successive `connect` calls follow a script.
///
/// Once the script runs out every connection succeeds with a source that
/// fails fatally, so a session under test always terminates.
#[derive(Clone)]
pub struct ScriptedConnector {
    journal: Journal,
    attempts: Rc<RefCell<VecDeque<std::result::Result<Script, String>>>>,
    urls: Rc<RefCell<Vec<Url>>>,
}

impl ScriptedConnector {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            attempts: Rc::default(),
            urls: Rc::default(),
        }
    }

    /// Next connection succeeds and replays `events`.
    pub fn accept(self, events: Vec<std::result::Result<LiveEvent, StreamError>>) -> Self {
        self.attempts.borrow_mut().push_back(Ok(events.into()));
        self
    }

    /// Next connection fails with `reason`.
    pub fn refuse(self, reason: &str) -> Self {
        self.attempts.borrow_mut().push_back(Err(reason.to_string()));
        self
    }

    /// URLs every connection attempt was made to.
    pub fn urls(&self) -> Vec<Url> {
        self.urls.borrow().clone()
    }
}

impl Connector for ScriptedConnector {
    fn connect(&self, url: &Url) -> std::result::Result<Box<dyn EventSource>, ConnectError> {
        self.journal.record("connect");
        self.urls.borrow_mut().push(url.clone());
        match self.attempts.borrow_mut().pop_front() {
            Some(Ok(events)) => Ok(Box::new(ScriptedSource { events })),
            Some(Err(reason)) => Err(ConnectError(reason)),
            None => Ok(Box::new(ScriptedSource {
                events: VecDeque::new(),
            })),
        }
    }
}

/// Sleeper that records instead of sleeping.
pub struct RecordingSleeper {
    journal: Journal,
    sleeps: Vec<Duration>,
}

impl RecordingSleeper {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            sleeps: Vec::new(),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, duration: Duration) {
        self.journal.record("sleep");
        self.sleeps.push(duration);
    }
}

/// Platform API double.
pub struct FakeApi {
    journal: Journal,
    endpoint: String,
    processes: Vec<String>,
    history_status: StatusCode,
    history_body: String,
    connector: ScriptedConnector,
    process_lookups: Cell<usize>,
    history_urls: RefCell<Vec<Url>>,
    targets: RefCell<Vec<LogTarget>>,
    live_kinds: RefCell<Vec<TransportKind>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::with_journal(Journal::default())
    }

    pub fn with_journal(journal: Journal) -> Self {
        Self {
            connector: ScriptedConnector::new(journal.clone()),
            journal,
            endpoint: "https://logs.example.com/apps/my-app/logs?token=signed".to_string(),
            processes: Vec::new(),
            history_status: StatusCode::OK,
            history_body: String::new(),
            process_lookups: Cell::new(0),
            history_urls: RefCell::default(),
            targets: RefCell::default(),
            live_kinds: RefCell::default(),
        }
    }

    pub fn with_processes(mut self, names: &[&str]) -> Self {
        self.processes = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_history(mut self, status: StatusCode, body: &str) -> Self {
        self.history_status = status;
        self.history_body = body.to_string();
        self
    }

    pub fn with_connector(mut self, connector: ScriptedConnector) -> Self {
        self.connector = connector;
        self
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn process_lookups(&self) -> usize {
        self.process_lookups.get()
    }

    pub fn history_urls(&self) -> Vec<Url> {
        self.history_urls.borrow().clone()
    }

    pub fn targets(&self) -> Vec<LogTarget> {
        self.targets.borrow().clone()
    }

    pub fn live_kinds(&self) -> Vec<TransportKind> {
        self.live_kinds.borrow().clone()
    }
}

impl LogsApi for FakeApi {
    fn log_endpoint(&self, target: &LogTarget) -> Result<StreamEndpoint> {
        self.journal.record("endpoint");
        self.targets.borrow_mut().push(target.clone());
        StreamEndpoint::parse(&self.endpoint)
    }

    fn list_process_types(&self, _app: &str) -> Result<Vec<String>> {
        self.journal.record("processes");
        self.process_lookups.set(self.process_lookups.get() + 1);
        Ok(self.processes.clone())
    }

    fn open_history(&self, url: &Url) -> Result<HistoryResponse> {
        self.journal.record("history");
        self.history_urls.borrow_mut().push(url.clone());
        Ok(HistoryResponse {
            status: self.history_status,
            body: Box::new(Cursor::new(self.history_body.clone().into_bytes())),
        })
    }

    fn live_connector(
        &self,
        kind: TransportKind,
    ) -> std::result::Result<Box<dyn Connector>, ConnectError> {
        self.journal.record("live");
        self.live_kinds.borrow_mut().push(kind);
        Ok(Box::new(self.connector.clone()))
    }
}
