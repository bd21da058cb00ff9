//! Human-readable record of the steps taken to answer one message.

/// Ordered step descriptions, returned to the caller when verbose output is
/// requested. Steps never include message text or employee data beyond
/// what the reply itself shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatTrace {
    steps: Vec<String>,
}

impl ChatTrace {
    /// Creates an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step.
    pub fn step(&mut self, description: impl Into<String>) {
        self.steps.push(description.into());
    }

    /// The steps so far.
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Consumes the trace, returning its steps.
    pub fn into_steps(self) -> Vec<String> {
        self.steps
    }
}
