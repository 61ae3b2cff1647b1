use std::time::Duration;

use crate::view_model::ViewerViewModel;
use crate::Notice;

/// Reference delay between an in-progress result and the next query.
pub const RETRY_DELAY: Duration = Duration::from_millis(5000);

/// Where the poller currently stands for the selected subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPhase {
    /// No subject selected, or the last query failed outright.
    #[default]
    Idle,
    /// A status query is in flight.
    Querying,
    /// Terminal for this subject: no translation job exists.
    NotTranslated,
    /// Non-terminal: translation running, re-query timer armed.
    InProgress,
    /// Terminal for this subject: translation failed.
    Failed,
    /// Terminal: handed off to the viewer.
    Ready,
}

/// Poll-session state for one viewer instance.
///
/// Invariant: at most one re-query timer is armed at any time. `timer_armed`
/// tracks it; [`crate::update`] emits `Effect::CancelRetryTimer` before any
/// transition that supersedes the armed timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerState {
    subject: Option<String>,
    phase: PollPhase,
    timer_armed: bool,
    notice: Option<Notice>,
    retry_delay: Duration,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            subject: None,
            phase: PollPhase::Idle,
            timer_armed: false,
            notice: None,
            retry_delay: RETRY_DELAY,
        }
    }
}

impl ViewerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same as [`ViewerState::new`] with a custom re-query delay.
    pub fn with_retry_delay(retry_delay: Duration) -> Self {
        Self {
            retry_delay,
            ..Self::default()
        }
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    pub fn timer_armed(&self) -> bool {
        self.timer_armed
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    pub fn view(&self) -> ViewerViewModel {
        ViewerViewModel {
            subject: self.subject.clone(),
            phase: self.phase,
            notice: self.notice.clone(),
            timer_armed: self.timer_armed,
        }
    }

    /// True when `urn` is the currently selected subject. Used as the
    /// stale-response guard: results for anything else are discarded.
    pub(crate) fn is_current(&self, urn: &str) -> bool {
        self.subject.as_deref() == Some(urn)
    }

    pub(crate) fn begin_query(&mut self, urn: String) {
        self.subject = Some(urn);
        self.phase = PollPhase::Querying;
        self.timer_armed = false;
        self.notice = None;
    }

    pub(crate) fn requery(&mut self) {
        self.phase = PollPhase::Querying;
        self.timer_armed = false;
    }

    pub(crate) fn settle(&mut self, phase: PollPhase, notice: Option<Notice>) {
        self.phase = phase;
        self.timer_armed = false;
        self.notice = notice;
    }

    pub(crate) fn await_retry(&mut self, notice: Notice) {
        self.phase = PollPhase::InProgress;
        self.timer_armed = true;
        self.notice = Some(notice);
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::with_retry_delay(self.retry_delay);
    }
}
