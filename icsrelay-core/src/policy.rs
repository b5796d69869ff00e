//! URL allow-list.
//!
//! The relay only fetches calendar exports that match a [`UrlPolicy`] exactly.
//! Matching is done on the components of the parsed URL, never on substrings,
//! so that URLs like `https://evil.example/?u=https://www.fh-muenster.de:443/...`
//! or `https://www.fh-muenster.de:443.evil.example/...` are refused.

use std::sync::LazyLock;

use http::Uri;
use serde::Deserialize;

/// Export endpoint of the FH Münster timetable (QIS) used by the default policy.
pub const DEFAULT_EXPORT_URL: &str = "https://www.fh-muenster.de:443/qisserver/pages/cm/exa/timetable/individualTimetableCalendarExport.faces?user=&hash=";

static DEFAULT_POLICY: LazyLock<UrlPolicy> = LazyLock::new(UrlPolicy::default);

/// Fixed origin, path and required query keys a calendar URL must have.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UrlPolicy {
    pub scheme: String,
    /// Host and port exactly as they must appear in the URL, e.g. `example.org:443`.
    pub authority: String,
    pub path: String,
    /// Query keys that must be present. Their values are not checked.
    pub required_params: Vec<String>,
}

impl Default for UrlPolicy {
    fn default() -> Self {
        UrlPolicy {
            scheme: "https".to_string(),
            authority: "www.fh-muenster.de:443".to_string(),
            path: "/qisserver/pages/cm/exa/timetable/individualTimetableCalendarExport.faces"
                .to_string(),
            required_params: vec!["user".to_string(), "hash".to_string()],
        }
    }
}

impl UrlPolicy {
    /// Build a policy from an example URL.
    ///
    /// Scheme, authority and path are taken literally; every key of the query
    /// string becomes a required parameter. Returns `None` if the template is
    /// not an absolute URL.
    pub fn from_template(template: &str) -> Option<Self> {
        let uri: Uri = template.parse().ok()?;

        Some(UrlPolicy {
            scheme: uri.scheme_str()?.to_string(),
            authority: uri.authority()?.as_str().to_string(),
            path: uri.path().to_string(),
            required_params: query_keys(uri.query().unwrap_or_default()),
        })
    }

    /// Check a candidate URL against the policy.
    ///
    /// Anything that does not parse as an absolute URL is refused.
    pub fn is_allowed(&self, url: &str) -> bool {
        let Ok(uri) = url.parse::<Uri>() else {
            return false;
        };
        let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) else {
            return false;
        };

        if scheme != self.scheme || authority.as_str() != self.authority || uri.path() != self.path
        {
            return false;
        }

        let keys = query_keys(uri.query().unwrap_or_default());
        self.required_params
            .iter()
            .all(|required| keys.iter().any(|key| key == required))
    }
}

/// Check a candidate URL against the default FH Münster policy.
pub fn is_allowed(url: &str) -> bool {
    DEFAULT_POLICY.is_allowed(url)
}

fn query_keys(query: &str) -> Vec<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(key, _)| key.into_owned())
        .collect()
}
