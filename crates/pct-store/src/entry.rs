//! Entries, filters and search requests.

use crate::dn::Dn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Object class of organizational branch entries.
pub const ORGANIZATIONAL_UNIT: &str = "organizationalUnit";

/// A flat directory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub dn: Dn,
    pub object_class: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Entry {
    pub fn new(dn: Dn, object_class: impl Into<String>) -> Self {
        Self {
            dn,
            object_class: object_class.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// An organizational branch entry named `ou`.
    pub fn branch(dn: Dn, ou: &str) -> Self {
        Self::new(dn, ORGANIZATIONAL_UNIT).with("ou", ou)
    }
}

/// Attribute predicate used to select entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Attribute equals the value exactly.
    Equals(String, String),
    /// Attribute is lexicographically at or before the value.
    ///
    /// Correct for fixed-width encodings such as generalized time.
    LessOrEqual(String, String),
    /// Attribute is present with any value.
    Present(String),
    /// All inner filters match.
    And(Vec<Filter>),
}

impl Filter {
    pub fn equals(attr: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equals(attr.into(), value.into())
    }

    pub fn less_or_equal(attr: impl Into<String>, value: impl Into<String>) -> Self {
        Self::LessOrEqual(attr.into(), value.into())
    }

    pub fn present(attr: impl Into<String>) -> Self {
        Self::Present(attr.into())
    }

    /// Evaluate the filter against an entry.
    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            Filter::Equals(attr, value) => entry.get(attr) == Some(value.as_str()),
            Filter::LessOrEqual(attr, value) => {
                entry.get(attr).is_some_and(|v| v <= value.as_str())
            }
            Filter::Present(attr) => entry.attributes.contains_key(attr),
            Filter::And(filters) => filters.iter().all(|f| f.matches(entry)),
        }
    }
}

/// How far below the base a search reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// The base entry only.
    Base,
    /// Immediate children of the base.
    One,
    /// The base and everything below it.
    #[default]
    Sub,
}

impl SearchScope {
    /// Whether an entry at `depth` levels below the base is in scope.
    pub fn includes_depth(self, depth: usize) -> bool {
        match self {
            SearchScope::Base => depth == 0,
            SearchScope::One => depth == 1,
            SearchScope::Sub => true,
        }
    }
}

/// A paginated search.
///
/// Results are ordered by DN; `offset` and `limit` select a chunk of them.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub base: Dn,
    pub object_class: Option<String>,
    pub filter: Filter,
    pub scope: SearchScope,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl SearchRequest {
    /// A subtree search of `base` for entries matching `filter`.
    pub fn new(base: Dn, filter: Filter) -> Self {
        Self {
            base,
            object_class: None,
            filter,
            scope: SearchScope::Sub,
            offset: 0,
            limit: None,
        }
    }

    pub fn object_class(mut self, object_class: impl Into<String>) -> Self {
        self.object_class = Some(object_class.into());
        self
    }

    pub fn scope(mut self, scope: SearchScope) -> Self {
        self.scope = scope;
        self
    }

    /// Select the chunk starting at `offset` with at most `limit` entries.
    pub fn chunk(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    /// Whether `entry` satisfies class, scope and filter.
    pub fn accepts(&self, entry: &Entry) -> bool {
        if let Some(class) = &self.object_class {
            if &entry.object_class != class {
                return false;
            }
        }
        let in_scope = entry
            .dn
            .depth_below(&self.base)
            .is_some_and(|depth| self.scope.includes_depth(depth));
        in_scope && self.filter.matches(entry)
    }
}
