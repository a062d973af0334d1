use std::sync::Arc;

use parking_lot::RwLock;

/// Latest extracted assistant text. Cloning shares the same buffer.
#[derive(Clone, Debug, Default)]
pub struct ResponseBuffer {
    inner: Arc<RwLock<String>>,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> String {
        self.inner.read().clone()
    }

    /// Replaces the content; returns `false` when it was already equal.
    pub fn replace(&self, text: &str) -> bool {
        let mut guard = self.inner.write();
        if *guard == text {
            return false;
        }
        guard.clear();
        guard.push_str(text);
        true
    }

    pub fn char_len(&self) -> usize {
        self.inner.read().chars().count()
    }
}
