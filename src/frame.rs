//! Colon-prefixed `name: payload` frames.
//!
//! Used by the event-stream transport and by the historical fetcher, which
//! switches to framed decoding when the first non-empty body line looks like
//! a frame.

/// One decoded frame. `payload` is already HTML-unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub name: String,
    pub payload: String,
}

impl Frame {
    /// Keepalive frames carry no log content.
    pub fn is_keepalive(&self) -> bool {
        self.name == "ping" || (self.name == "event" && self.payload == "ping")
    }

    /// Stream control fields (`id:`, `retry:`) steer the connection and are
    /// never log content.
    pub fn is_control(&self) -> bool {
        matches!(self.name.as_str(), "id" | "retry")
    }
}

/// Length of the frame name if `line` starts with `name:` followed by a
/// space or the end of the line.
///
/// Names start with an ASCII letter and continue with letters, digits, `_`
/// or `-`, which keeps timestamps like `2024-05-02 10:11:12` from being
/// mistaken for frames.
fn prefix_len(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    if !bytes.first()?.is_ascii_alphabetic() {
        return None;
    }
    let end = bytes
        .iter()
        .position(|b| !(b.is_ascii_alphanumeric() || *b == b'_' || *b == b'-'))?;
    if bytes[end] != b':' {
        return None;
    }
    match bytes.get(end + 1) {
        None | Some(b' ') => Some(end),
        _ => None,
    }
}

/// Whether a line carries a frame prefix.
pub fn has_frame_prefix(line: &str) -> bool {
    prefix_len(line).is_some()
}

/// SSE comment lines (`: keepalive`) are used as heartbeats.
pub fn is_comment(line: &str) -> bool {
    line.starts_with(':')
}

/// Parse one frame line. Returns `None` when the line has no frame prefix.
pub fn parse_frame(line: &str) -> Option<Frame> {
    let line = line.trim_end_matches(['\r', '\n']);
    let end = prefix_len(line)?;
    let rest = &line[end + 1..];
    let payload = rest.strip_prefix(' ').unwrap_or(rest);
    Some(Frame {
        name: line[..end].to_string(),
        payload: unescape_html(payload),
    })
}

/// Replace HTML entities (named ones the log server emits plus numeric
/// references) with the characters they stand for. Unknown or malformed
/// entities are left as-is.
pub fn unescape_html(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match rest.find(';').and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi))) {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}
