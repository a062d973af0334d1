/// Verdict for one length sample.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stability {
    Changed,
    Unchanged(u32),
    Stable,
}

/// Counts consecutive samples with an unchanged length.
#[derive(Clone, Debug)]
pub struct StabilityTracker {
    last_len: usize,
    unchanged: u32,
    required: u32,
}

impl StabilityTracker {
    pub fn new(required: u32) -> Self {
        Self {
            last_len: 0,
            unchanged: 0,
            required: required.max(1),
        }
    }

    pub fn observe(&mut self, len: usize) -> Stability {
        if len != self.last_len {
            self.last_len = len;
            self.unchanged = 0;
            return Stability::Changed;
        }
        self.unchanged += 1;
        if self.unchanged >= self.required {
            Stability::Stable
        } else {
            Stability::Unchanged(self.unchanged)
        }
    }

    pub fn last_len(&self) -> usize {
        self.last_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_resets_the_counter() {
        let mut tracker = StabilityTracker::new(3);
        assert_eq!(tracker.observe(4), Stability::Changed);
        assert_eq!(tracker.observe(4), Stability::Unchanged(1));
        assert_eq!(tracker.observe(4), Stability::Unchanged(2));
        assert_eq!(tracker.observe(9), Stability::Changed);
        assert_eq!(tracker.observe(9), Stability::Unchanged(1));
        assert_eq!(tracker.observe(9), Stability::Unchanged(2));
        assert_eq!(tracker.observe(9), Stability::Stable);
        assert_eq!(tracker.last_len(), 9);
    }

    #[test]
    fn empty_buffer_counts_as_unchanged() {
        let mut tracker = StabilityTracker::new(2);
        assert_eq!(tracker.observe(0), Stability::Unchanged(1));
        assert_eq!(tracker.observe(0), Stability::Stable);
    }
}
