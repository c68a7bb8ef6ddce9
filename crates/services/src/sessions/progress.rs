/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    /// Zero-based index of the question on screen.
    pub position: usize,
    pub answered: usize,
    pub remaining_secs: u32,
    pub is_complete: bool,
}

impl SessionProgress {
    /// One-based question number for headers like "Question 2 of 5".
    #[must_use]
    pub fn question_number(&self) -> usize {
        (self.position + 1).min(self.total)
    }
}
