//! Route path and shareable fragment.

use std::fmt;

use crate::phase::normalize_path;

/// A parsed page location: route path plus optional section fragment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    /// Normalised route path.
    pub path: String,
    /// Section id from the URL fragment, without the leading `#`.
    pub fragment: Option<String>,
}

impl Location {
    /// Parses `"/path#fragment"`. Query strings are discarded and an empty
    /// fragment (`"/#"`) counts as no fragment.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (before_fragment, fragment) = match raw.split_once('#') {
            Some((head, frag)) => (head, Some(frag.trim())),
            None => (raw, None),
        };
        let path = before_fragment
            .split_once('?')
            .map_or(before_fragment, |(p, _)| p);
        Self {
            path: normalize_path(path),
            fragment: fragment.filter(|f| !f.is_empty()).map(str::to_owned),
        }
    }

    /// Whether the location carries a deep link to a section.
    #[must_use]
    pub fn has_deep_link(&self) -> bool {
        self.fragment.is_some()
    }

    /// Returns the same path with its fragment replaced.
    #[must_use]
    pub fn with_fragment(&self, fragment: &str) -> Self {
        Self {
            path: self.path.clone(),
            fragment: Some(fragment.to_owned()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fragment {
            Some(fragment) => write!(f, "{}#{fragment}", self.path),
            None => f.write_str(&self.path),
        }
    }
}
