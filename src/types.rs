//! Supporting type used in error structures.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Error, Serialize)]
/// Error indicating the found value differs from the expected one.
pub struct Mismatch<T> {
    /// Value expected.
    pub expected: T,
    /// Value found.
    pub found: T,
}

impl<T> Mismatch<T> {
    pub fn new(expected: T, found: T) -> Self {
        Self { expected, found }
    }
}

impl<T: fmt::Display> fmt::Display for Mismatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "expected {}, found {}", self.expected, self.found)
    }
}
