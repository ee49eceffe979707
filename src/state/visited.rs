use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Identifiers already scheduled within one keyword run
///
/// Shared between concurrent detail dispatches; check-and-mark happens under
/// one lock so an identifier is admitted exactly once.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as visited
    ///
    /// Returns true the first time an identifier is seen and false on every
    /// later call with the same identifier.
    pub fn mark_if_new(&self, id: &str) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        if seen.contains(id) {
            return false;
        }
        seen.insert(id.to_string())
    }

    /// Number of distinct identifiers seen so far
    pub fn len(&self) -> usize {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
