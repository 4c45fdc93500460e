//! Historical log fetch: one bounded request, rendered in order.

use crate::api::LogsApi;
use crate::endpoint::StreamEndpoint;
use crate::error::{LogsError, Result};
use crate::frame;
use crate::render::{Advice, LogLine, Renderer};
use reqwest::StatusCode;
use std::io::{BufRead, BufReader, Read, Write};

/// What a historical fetch produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// This many lines were rendered.
    Rendered(usize),
    /// The server has nothing for this application yet.
    NoLogsYet,
}

/// Body encoding, decided from the first non-empty line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyMode {
    Flat,
    Framed,
}

/// Fetch the last `max_lines` lines (server default when not positive) and
/// render them.
///
/// 204 and 404 mean the application has not logged anything yet: the user
/// gets an advisory and the call succeeds.
pub fn dump_logs<A, O, E>(
    api: &A,
    endpoint: &StreamEndpoint,
    max_lines: i64,
    filter: &str,
    renderer: &mut Renderer<O, E>,
) -> Result<FetchOutcome>
where
    A: LogsApi + ?Sized,
    O: Write,
    E: Write,
{
    let url = endpoint.history_url(max_lines, filter);
    let response = api.open_history(&url)?;

    if response.status == StatusCode::NO_CONTENT || response.status == StatusCode::NOT_FOUND {
        renderer.advise(Advice::Warning, "There is no log for this application");
        renderer.advise(
            Advice::Info,
            "Ensure your application is writing to the standard output",
        );
        return Ok(FetchOutcome::NoLogsYet);
    }
    if !response.status.is_success() {
        return Err(LogsError::FetchFailed {
            status: response.status.to_string(),
        });
    }

    let rendered = render_body(response.body, renderer);
    renderer.flush();
    Ok(FetchOutcome::Rendered(rendered))
}

/// Render a historical body, flat or framed.
///
/// Malformed frames are skipped. A read error ends the body early; whatever
/// was already rendered stays.
pub fn render_body<R: Read, O: Write, E: Write>(body: R, renderer: &mut Renderer<O, E>) -> usize {
    let reader = BufReader::new(body);
    let mut mode = None;
    let mut rendered = 0;

    for chunk in reader.split(b'\n') {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(error = %e, "historical body interrupted");
                break;
            }
        };
        let text = String::from_utf8_lossy(&bytes);
        let line = text.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let current = *mode.get_or_insert_with(|| {
            if frame::has_frame_prefix(line) {
                BodyMode::Framed
            } else {
                BodyMode::Flat
            }
        });

        match current {
            BodyMode::Flat => {
                renderer.render(&LogLine::parse(line));
                if !renderer.is_closed() {
                    rendered += 1;
                }
            }
            BodyMode::Framed => rendered += render_frame(line, renderer),
        }
        if renderer.is_closed() {
            tracing::debug!("output closed, dropping the rest of the body");
            break;
        }
    }
    rendered
}

fn render_frame<O: Write, E: Write>(line: &str, renderer: &mut Renderer<O, E>) -> usize {
    if frame::is_comment(line) {
        return 0;
    }
    match frame::parse_frame(line) {
        Some(frame) if frame.is_keepalive() || frame.is_control() => 0,
        Some(frame) => renderer.render_raw(frame.payload.trim()),
        None => {
            tracing::debug!(line, "skipping malformed frame");
            0
        }
    }
}
