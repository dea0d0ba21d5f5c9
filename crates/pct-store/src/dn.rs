//! Distinguished names: paths in the hierarchical namespace.

use serde::{Deserialize, Serialize};
use std::fmt;

const SPECIAL: &[char] = &[',', '+', '"', '\\', '<', '>', ';', '='];

/// A distinguished name such as `tokenCode=abc,ou=pct,ou=uma,o=gluu`.
///
/// The leftmost component is the entry's own RDN; everything after the
/// first unescaped comma is its parent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dn(String);

impl Dn {
    /// Wrap an already well-formed DN string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Build the DN of a child entry `attr=value` below `self`.
    ///
    /// Special characters in `value` are backslash-escaped.
    pub fn child(&self, attr: &str, value: &str) -> Dn {
        let rdn = format!("{}={}", attr, escape_value(value));
        if self.0.is_empty() {
            Dn(rdn)
        } else {
            Dn(format!("{},{}", rdn, self.0))
        }
    }

    /// The parent DN, or `None` for a single-component DN.
    pub fn parent(&self) -> Option<Dn> {
        split_first_unescaped(&self.0).map(|(_, rest)| Dn(rest.to_string()))
    }

    /// The leftmost RDN (`attr=value`), still escaped.
    pub fn rdn(&self) -> &str {
        split_first_unescaped(&self.0)
            .map(|(rdn, _)| rdn)
            .unwrap_or(&self.0)
    }

    /// Number of levels between `base` and `self`, or `None` if `self`
    /// is not `base` or below it.
    pub fn depth_below(&self, base: &Dn) -> Option<usize> {
        let mut depth = 0;
        let mut current = Some(self.clone());
        while let Some(dn) = current {
            if &dn == base {
                return Some(depth);
            }
            depth += 1;
            current = dn.parent();
        }
        None
    }

    /// Whether `self` is strictly below `base`.
    pub fn is_descendant_of(&self, base: &Dn) -> bool {
        matches!(self.depth_below(base), Some(d) if d > 0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Dn {
    fn from(raw: &str) -> Self {
        Dn::new(raw)
    }
}

fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn split_first_unescaped(raw: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (i, c) in raw.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ',' => return Some((&raw[..i], &raw[i + 1..])),
            _ => {}
        }
    }
    None
}
