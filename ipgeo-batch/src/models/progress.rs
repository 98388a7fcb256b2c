//! Batch progress counter

/// Completed count out of a fixed total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    pub completed: usize,
    pub total: usize,
}

impl ProgressState {
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// Whole-number percentage, rounded down (0 for an empty batch)
    pub fn percentage(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed.min(self.total) * 100) / self.total) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(ProgressState::new(1, 3).percentage(), 33);
        assert_eq!(ProgressState::new(3, 3).percentage(), 100);
        assert_eq!(ProgressState::new(0, 0).percentage(), 0);
    }
}
