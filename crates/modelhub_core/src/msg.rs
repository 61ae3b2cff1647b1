#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a model, or a persisted fragment restored one on load.
    SubjectSelected { urn: String },
    /// A status query for `urn` completed.
    StatusArrived {
        urn: String,
        status: crate::TranslationStatus,
    },
    /// A status query for `urn` failed at the transport level.
    QueryFailed { urn: String, error: String },
    /// The single-shot re-query timer armed for `urn` fired.
    RetryTimerFired { urn: String },
    /// Selection cleared (user navigated away from all models).
    SubjectCleared,
}
