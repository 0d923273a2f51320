//! ICS generation and parsing.
//!
//! Events are stored one VEVENT per `VCALENDAR` document (RFC 5545); a feed
//! bundles every event of a collection into a single document.

mod generate;
mod parse;

pub use generate::{generate_feed, generate_ics};
pub use parse::{parse_event, parse_events};

/// Basic ISO form used for DTSTART/DTEND.
pub(crate) const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Escape a TEXT value (backslash, semicolon, comma, newline).
///
/// CRLF and lone CR are written as a newline, matching `Task::fields`.
pub(crate) fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {
                chars.next_if_eq(&'\n');
                out.push_str("\\n");
            }
            _ => out.push(c),
        }
    }
    out
}

pub(crate) fn unescape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
