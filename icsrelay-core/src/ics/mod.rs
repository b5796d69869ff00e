//! iCalendar sanitizing.
//!
//! Works on content lines (RFC 5545 section 3.1) rather than on a parsed
//! calendar, so that everything which is kept leaves the relay byte-for-byte
//! as it arrived, folding included.

mod clean;
mod line;

pub use clean::{CleanRules, clean};
pub use line::{ContentLine, content_lines};

/// Line terminator mandated by RFC 5545.
pub const CRLF: &str = "\r\n";
