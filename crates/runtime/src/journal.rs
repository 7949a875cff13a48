use std::cell::RefCell;
use std::rc::Rc;

/// Shared, append-only log of side effects.
///
/// Test doubles on both sides of a seam (host, graphics backend) write into
/// one journal so the relative order of their calls can be asserted.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Rc<RefCell<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.entries.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    /// Position of the first entry starting with `prefix`.
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.entries.borrow().iter().position(|e| e.starts_with(prefix))
    }
}
