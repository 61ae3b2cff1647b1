use crate::{Notice, PollPhase};

/// Render snapshot of the poll session, for whatever surface displays it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewerViewModel {
    pub subject: Option<String>,
    pub phase: PollPhase,
    pub notice: Option<Notice>,
    pub timer_armed: bool,
}
