//! Shared text helpers for the command-output parsers.

use regex::Regex;

use crate::domain::Bssid;

/// Locates the first MAC address anywhere in a line of free-form output.
#[derive(Debug, Clone)]
pub struct MacFinder {
    pattern: Regex,
}

impl MacFinder {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(r"(?i)\b[0-9a-f]{2}(?::[0-9a-f]{2}){5}\b")?,
        })
    }

    pub fn find(&self, line: &str) -> Option<Bssid> {
        let m = self.pattern.find(line)?;
        Bssid::parse(m.as_str()).ok()
    }
}

/// Strip one pair of surrounding double quotes, if present.
pub(super) fn unquote(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(s)
}

/// Value of a `key=value` line, or `None` when the key differs.
pub(super) fn key_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let (k, v) = line.split_once('=')?;
    (k.trim() == key).then(|| v.trim())
}
