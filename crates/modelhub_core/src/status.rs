/// One diagnostic record from a failed translation, flattened out of the
/// manifest's nested derivative/child structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: Option<String>,
    pub message: String,
}

/// Observed state of a translation job. Owned by the external backend;
/// this system only polls it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationStatus {
    /// No job record exists for the subject.
    Absent,
    /// Job queued, not started yet.
    Pending,
    /// Job running; `progress` is a human-readable backend string.
    InProgress { progress: String },
    /// Terminal failure with the flattened diagnostic list.
    Failed { messages: Vec<Diagnostic> },
    /// Terminal success (or any unrecognized terminal status).
    Complete,
}
