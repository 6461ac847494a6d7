//! Compilation options

/// What to do when a grammar defines the same rule name twice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DuplicateRules {
    /// Fail with [`CompileError::DuplicateRule`](crate::CompileError::DuplicateRule)
    #[default]
    Reject,
    /// The later definition replaces the earlier one
    LastWins,
}

/// Options controlling grammar compilation
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub duplicate_rules: DuplicateRules,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duplicate_rules(mut self, policy: DuplicateRules) -> Self {
        self.duplicate_rules = policy;
        self
    }
}
