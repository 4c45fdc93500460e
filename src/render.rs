//! Line rendering: header parsing and per-source coloring.
//!
//! Upstream log lines look like
//! `2024-05-02 10:11:12.123456789 +0200 CEST [web-1] GET / 200`: four
//! timestamp tokens, a bracketed source label, then the message. Anything
//! that does not fit that shape is printed untouched.

use colored::{Color, Colorize};
use std::io::{self, Stderr, Stdout, Write};
use xxhash_rust::xxh3::xxh3_64;

/// Number of space-separated tokens in a log header (timestamp + source).
const HEADER_TOKENS: usize = 5;

/// Number of those tokens that make up the timestamp.
const TIMESTAMP_TOKENS: usize = 4;

/// Color used for every timestamp.
pub const TIMESTAMP_COLOR: Color = Color::Yellow;

/// Colors a source label can be drawn in.
pub const PALETTE: [Color; 11] = [
    Color::Blue,
    Color::Cyan,
    Color::Green,
    Color::Magenta,
    Color::Red,
    Color::BrightYellow,
    Color::BrightBlue,
    Color::BrightCyan,
    Color::BrightGreen,
    Color::BrightMagenta,
    Color::BrightRed,
];

/// One decoded log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub timestamp: Option<String>,
    pub source: Option<String>,
    pub message: String,
}

impl LogLine {
    /// Split a raw line into timestamp, source and message.
    ///
    /// Never fails: lines with fewer than five tokens come back with only
    /// `message` set, holding the raw input.
    pub fn parse(raw: &str) -> Self {
        let tokens: Vec<&str> = raw.splitn(HEADER_TOKENS + 1, ' ').collect();
        if tokens.len() < HEADER_TOKENS {
            return Self::unparsed(raw);
        }

        let label = tokens[TIMESTAMP_TOKENS];
        let source = label
            .strip_prefix('[')
            .and_then(|l| l.strip_suffix(']'))
            .unwrap_or(label);

        Self {
            timestamp: Some(tokens[..TIMESTAMP_TOKENS].join(" ")),
            source: Some(source.to_string()),
            message: tokens.get(HEADER_TOKENS).copied().unwrap_or("").to_string(),
        }
    }

    fn unparsed(raw: &str) -> Self {
        Self {
            timestamp: None,
            source: None,
            message: raw.to_string(),
        }
    }
}

/// Palette index for a source label.
///
/// Pure function of the label bytes, so a given container keeps its color
/// across lines, reconnects and separate runs.
pub fn color_index(label: &str) -> usize {
    (xxh3_64(label.as_bytes()) % PALETTE.len() as u64) as usize
}

/// Display color for a source label.
pub fn source_color(label: &str) -> Color {
    PALETTE[color_index(label)]
}

/// Format a line without the trailing newline.
pub fn format_line(line: &LogLine, colorize: bool) -> String {
    match (&line.timestamp, &line.source) {
        (Some(timestamp), Some(source)) if colorize => format!(
            "{} [{}] {}",
            timestamp.color(TIMESTAMP_COLOR),
            source.color(source_color(source)),
            line.message
        ),
        (Some(timestamp), Some(source)) => {
            format!("{} [{}] {}", timestamp, source, line.message)
        }
        _ => line.message.clone(),
    }
}

/// Severity of a user-facing advisory written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    Warning,
    Info,
}

/// Writes rendered log lines to `out` and advisories to `err`.
///
/// The renderer is the only writer of `out`, so lines are emitted in the
/// order they are handed in.
pub struct Renderer<O = Stdout, E = Stderr> {
    out: O,
    err: E,
    colorize: bool,
    closed: bool,
}

impl Renderer {
    /// Renderer bound to the process stdout/stderr.
    pub fn stdio(colorize: bool) -> Self {
        Self::new(io::stdout(), io::stderr(), colorize)
    }
}

impl<O: Write, E: Write> Renderer<O, E> {
    pub fn new(out: O, err: E, colorize: bool) -> Self {
        Self {
            out,
            err,
            colorize,
            closed: false,
        }
    }

    /// Render every non-empty line of a raw record.
    ///
    /// Returns the number of lines written.
    pub fn render_raw(&mut self, raw: &str) -> usize {
        let mut count = 0;
        for line in raw.split('\n').filter(|l| !l.is_empty()) {
            self.render(&LogLine::parse(line));
            if self.closed {
                break;
            }
            count += 1;
        }
        count
    }

    /// Render one decoded line.
    ///
    /// Nothing is written once the reader of `out` has gone away.
    pub fn render(&mut self, line: &LogLine) {
        if self.closed {
            return;
        }
        let formatted = format_line(line, self.colorize);
        if let Err(e) = writeln!(self.out, "{}", formatted) {
            self.write_failed(e);
        }
    }

    /// Write an advisory message for the user.
    pub fn advise(&mut self, advice: Advice, message: &str) {
        let prefix = match (advice, self.colorize) {
            (Advice::Warning, true) => "warning:".yellow().bold().to_string(),
            (Advice::Warning, false) => "warning:".to_string(),
            (Advice::Info, true) => "info:".cyan().to_string(),
            (Advice::Info, false) => "info:".to_string(),
        };
        if let Err(e) = writeln!(self.err, "{} {}", prefix, message) {
            tracing::debug!(error = %e, "failed to write advisory");
        }
    }

    pub fn flush(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.out.flush() {
            self.write_failed(e);
        }
    }

    /// The reader of `out` is gone (broken pipe). Callers stop producing.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn write_failed(&mut self, e: io::Error) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            tracing::debug!("output closed");
            self.closed = true;
        } else {
            tracing::debug!(error = %e, "failed to write log line");
        }
    }

    /// Consume the renderer and hand back its writers.
    pub fn into_parts(self) -> (O, E) {
        (self.out, self.err)
    }
}
