#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreTracker {
    current: u64,
    best: u64,
}

impl ScoreTracker {
    pub fn new(current: u64, best: u64) -> Self {
        Self {
            current,
            best: best.max(current),
        }
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    /// Adds a merge result to the current score. Returns true when the best score was raised.
    pub fn apply_merge(&mut self, value: u64) -> bool {
        self.current = self.current.saturating_add(value);
        if self.current > self.best {
            self.best = self.current;
            return true;
        }
        false
    }

    /// Starts a new game; the best score is kept.
    pub fn reset(&mut self) {
        self.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_raises_best_only_when_exceeded() {
        let mut score = ScoreTracker::new(0, 10);
        assert!(!score.apply_merge(4));
        assert_eq!(score.current(), 4);
        assert_eq!(score.best(), 10);
        assert!(score.apply_merge(8));
        assert_eq!(score.best(), 12);
    }

    #[test]
    fn reset_keeps_best() {
        let mut score = ScoreTracker::new(0, 0);
        score.apply_merge(16);
        score.reset();
        assert_eq!(score.current(), 0);
        assert_eq!(score.best(), 16);
    }

    #[test]
    fn new_normalises_best_below_current() {
        let score = ScoreTracker::new(40, 12);
        assert_eq!(score.best(), 40);
    }

    #[test]
    fn huge_scores_saturate_instead_of_wrapping() {
        let mut score = ScoreTracker::new(u64::MAX - 1, u64::MAX - 1);
        score.apply_merge(8);
        assert_eq!(score.current(), u64::MAX);
        assert_eq!(score.best(), u64::MAX);
    }
}
