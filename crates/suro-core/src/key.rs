//! # Composite Keys
//!
//! A [`ComplexKey`] is the identity of a row or column that is described by
//! several fields of a solution entry, e.g. `(specialty, week)`. It is an
//! ordered, immutable tuple of strings. Two keys are equal only when they have
//! the same number of components and every component matches position by
//! position, so `("a", "b")` and `("b", "a")` are different keys.

use serde::{Deserialize, Serialize};

/// An ordered, immutable tuple of string components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComplexKey(Box<[String]>);

impl ComplexKey {
    /// Build a key from its components, in order.
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// A key with exactly one component.
    pub fn single(part: impl Into<String>) -> Self {
        Self(Box::new([part.into()]))
    }

    /// The components in order.
    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key has no components.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Components joined by a single space. This is the form used for column
/// headers and category names.
impl std::fmt::Display for ComplexKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

impl<S: Into<String>> FromIterator<S> for ComplexKey {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}
