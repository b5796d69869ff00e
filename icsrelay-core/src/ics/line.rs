//! Splitting .ics text into content lines.

use std::borrow::Cow;

use icalendar::parser::unfold;

use super::CRLF;

/// One logical line of an .ics file: a head line plus the continuation
/// lines (starting with a space or tab) folded beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine<'a> {
    physical: Vec<&'a str>,
}

impl<'a> ContentLine<'a> {
    /// The physical lines as they appeared in the input, without terminators.
    pub fn physical_lines(&self) -> &[&'a str] {
        &self.physical
    }

    /// The content line with folding removed.
    pub fn unfolded(&self) -> Cow<'a, str> {
        match self.physical.as_slice() {
            [single] => Cow::Borrowed(single),
            lines => Cow::Owned(unfold(&lines.join(CRLF))),
        }
    }

    /// Upper-cased property name, i.e. everything before the first `;` or `:`.
    pub fn name(&self) -> String {
        let unfolded = self.unfolded();
        let end = unfolded.find([';', ':']).unwrap_or(unfolded.len());
        unfolded[..end].to_ascii_uppercase()
    }

    /// Everything after the first `:`. Only meaningful for lines without
    /// quoted parameters, such as `BEGIN:VEVENT`.
    pub fn value(&self) -> String {
        let unfolded = self.unfolded();
        unfolded
            .split_once(':')
            .map(|(_, value)| value.to_string())
            .unwrap_or_default()
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        for line in &self.physical {
            out.push_str(line);
            out.push_str(CRLF);
        }
    }
}

/// Split .ics text into content lines.
///
/// Accepts both CRLF and bare LF terminators. Empty lines are skipped.
/// A continuation line with no preceding head line is kept as a line of its own.
pub fn content_lines(text: &str) -> Vec<ContentLine<'_>> {
    let mut lines: Vec<ContentLine<'_>> = Vec::new();

    for physical in text.split('\n') {
        let physical = physical.strip_suffix('\r').unwrap_or(physical);
        if physical.is_empty() {
            continue;
        }

        let is_continuation = physical.starts_with([' ', '\t']);
        match lines.last_mut() {
            Some(current) if is_continuation => current.physical.push(physical),
            _ => lines.push(ContentLine {
                physical: vec![physical],
            }),
        }
    }

    lines
}
