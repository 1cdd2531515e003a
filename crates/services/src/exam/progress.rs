/// Aggregated view of exam progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamProgress {
    pub total: usize,
    pub answered: usize,
    /// Zero-based index of the question on screen.
    pub current: usize,
    pub is_last: bool,
}

impl ExamProgress {
    /// Share of the exam reached, counting the question on screen, in percent.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.current + 1) as f64 / self.total as f64 * 100.0
    }
}
