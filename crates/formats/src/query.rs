//! Query-string handling for viewer URLs.
//!
//! Values are taken verbatim: pairs are split on `&`, then each pair on its
//! first `=`. No percent-decoding is applied.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    base_url: String,
    values: BTreeMap<String, String>,
}

impl QueryParams {
    /// Parses a full URL (`base?query`) or a bare query string.
    ///
    /// A URL containing more than one `?` is treated as having no
    /// parameters.
    pub fn parse(href: &str) -> Self {
        let mut segments = href.split('?');
        let base_url = segments.next().unwrap_or_default().to_string();
        let query = match (segments.next(), segments.next()) {
            (Some(q), None) => Some(q),
            _ => None,
        };

        let mut values = BTreeMap::new();
        if let Some(query) = query {
            for pair in query.split('&') {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                values.insert(key.to_string(), value.to_string());
            }
        }
        Self { base_url, values }
    }

    /// Parses just the query part, as found in `location.search` without
    /// its leading `?`.
    pub fn from_query(query: &str) -> Self {
        Self::parse(&format!("?{query}"))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Value for `key`. Empty values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

/// Leading `t` or `T` means true; anything else is false.
pub fn parse_flag(value: &str) -> bool {
    value.starts_with(['t', 'T'])
}
