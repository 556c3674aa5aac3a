//! Document references

use std::fmt;

/// Opaque reference to a stored document (scan of a declaration, bulletin,
/// receipt or release order)
///
/// Produced by a [`DocumentStore`](crate::traits::DocumentStore); the engine
/// stores and returns it without interpreting it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef(String);

impl DocumentRef {
    /// Wrap a reference returned by a document store
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The reference as stored
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}
