use std::time::Duration;

use crate::Diagnostic;

/// User-facing notice derived from the latest poll result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Model uploaded but never submitted for translation.
    NotTranslated,
    /// Translation running; carries the backend's progress text.
    Progress(String),
    /// Translation failed; carries the flattened diagnostic list.
    TranslationFailed(Vec<Diagnostic>),
    /// The status query itself failed.
    QueryError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Abort the pending re-query timer, if any. Always emitted before any
    /// effect that could supersede it.
    CancelRetryTimer,
    /// Issue a status query for the subject.
    QueryStatus { urn: String },
    /// Arm the single-shot re-query timer for the subject.
    ArmRetryTimer { urn: String, delay: Duration },
    /// Update the persisted location fragment (`None` clears it).
    UpdateFragment { urn: Option<String> },
    /// Show a notice to the user.
    ShowNotice(Notice),
    /// Clear any visible notice.
    ClearNotice,
    /// Hand the subject off to the external viewer loader.
    LoadViewer { urn: String },
}
