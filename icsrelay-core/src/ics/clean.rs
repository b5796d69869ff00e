//! Removal of unwanted properties and components from .ics files.

use std::sync::LazyLock;

use serde::Deserialize;

use super::line::content_lines;
use crate::error::{RelayError, RelayResult};

static DEFAULT_RULES: LazyLock<CleanRules> = LazyLock::new(CleanRules::default);

/// Which properties and components are stripped from a calendar.
///
/// Names are matched case-insensitively. A property rule ending in `*`
/// matches every property starting with the given prefix, e.g. `X-*`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CleanRules {
    pub remove_properties: Vec<String>,
    /// Components dropped together with everything nested inside, e.g. `VALARM`.
    pub remove_components: Vec<String>,
}

impl Default for CleanRules {
    fn default() -> Self {
        CleanRules {
            remove_properties: vec![
                "ORGANIZER".to_string(),
                "ATTENDEE".to_string(),
                "DESCRIPTION".to_string(),
            ],
            remove_components: Vec::new(),
        }
    }
}

impl CleanRules {
    /// Strip matching content lines from a raw calendar.
    ///
    /// The input must be UTF-8 (a leading BOM is dropped). Kept lines are
    /// written back unchanged and in order, each terminated by CRLF.
    pub fn clean(&self, raw: &[u8]) -> RelayResult<Vec<u8>> {
        let text = std::str::from_utf8(raw).map_err(|e| RelayError::Decode(e.to_string()))?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut out = String::with_capacity(text.len());
        // Nesting depth inside a component being dropped
        let mut skip_depth = 0usize;

        for line in content_lines(text) {
            let name = line.name();

            if skip_depth > 0 {
                match name.as_str() {
                    "BEGIN" => skip_depth += 1,
                    "END" => skip_depth -= 1,
                    _ => {}
                }
                continue;
            }

            if name == "BEGIN" && self.removes_component(&line.value()) {
                skip_depth = 1;
                continue;
            }

            if self.removes_property(&name) {
                continue;
            }

            line.write_to(&mut out);
        }

        Ok(out.into_bytes())
    }

    /// BEGIN and END are structural and never removed by property rules.
    pub fn removes_property(&self, name: &str) -> bool {
        if name.eq_ignore_ascii_case("BEGIN") || name.eq_ignore_ascii_case("END") {
            return false;
        }
        self.remove_properties
            .iter()
            .any(|rule| rule_matches(rule, name))
    }

    pub fn removes_component(&self, name: &str) -> bool {
        self.remove_components
            .iter()
            .any(|rule| rule.trim().eq_ignore_ascii_case(name.trim()))
    }
}

/// Clean a calendar with the default rules.
pub fn clean(raw: &[u8]) -> RelayResult<Vec<u8>> {
    DEFAULT_RULES.clean(raw)
}

fn rule_matches(rule: &str, name: &str) -> bool {
    match rule.strip_suffix('*') {
        Some(prefix) => name
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix)),
        None => rule.eq_ignore_ascii_case(name),
    }
}
