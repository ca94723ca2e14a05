//! Multi-error aggregation.
//!
//! Collects failures from independent units of work (shutdown steps,
//! validation checks, background tasks) and reduces them to a single
//! reportable error.

use std::fmt;

use super::{report, BoxError};

/// Accumulates errors from a fan-out and resolves them once.
///
/// Not synchronized: share it behind a `Mutex` when several tasks feed it.
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    /// First error ever added. Frozen once set.
    first: Option<BoxError>,
    /// Every error after the first, in insertion order.
    rest: Vec<BoxError>,
}

impl ErrorAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `err` if present. `None` leaves the aggregator untouched.
    pub fn add<E: Into<BoxError>>(&mut self, err: Option<E>) {
        let Some(err) = err else {
            return;
        };

        if self.first.is_none() {
            self.first = Some(err.into());
        } else {
            self.rest.push(err.into());
        }
    }

    /// Record the error side of `result`, passing the success value through.
    pub fn add_result<T, E: Into<BoxError>>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.add(Some(err));
                None
            }
        }
    }

    /// Number of errors recorded so far.
    pub fn len(&self) -> usize {
        match self.first {
            Some(_) => 1 + self.rest.len(),
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// Reduce the recorded errors to one.
    ///
    /// - no errors: `None`
    /// - one error: that exact error, not wrapped
    /// - several: a [`MultiError`] listing all of them in insertion order
    pub fn resolve(self) -> Option<BoxError> {
        let first = self.first?;
        if self.rest.is_empty() {
            return Some(first);
        }

        let mut errors = Vec::with_capacity(1 + self.rest.len());
        errors.push(first);
        errors.extend(self.rest);
        Some(Box::new(MultiError { errors }))
    }
}

/// Composite error produced when more than one failure was recorded.
///
/// Renders as a numbered list where every entry carries the full cause chain
/// of the error it stands for.
#[derive(Debug)]
pub struct MultiError {
    errors: Vec<BoxError>,
}

impl MultiError {
    /// The individual errors, in the order they were added.
    pub fn errors(&self) -> &[BoxError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("multiple errors occurred:")?;
        for (i, err) in self.errors.iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, report(err.as_ref()))?;
        }
        Ok(())
    }
}

impl std::error::Error for MultiError {}
