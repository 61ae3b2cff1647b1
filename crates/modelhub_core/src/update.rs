use crate::{Effect, Msg, Notice, PollPhase, TranslationStatus, ViewerState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ViewerState, msg: Msg) -> (ViewerState, Vec<Effect>) {
    let effects = match msg {
        Msg::SubjectSelected { urn } => {
            let mut effects = Vec::with_capacity(3);
            if state.timer_armed() {
                // Never let a stale timer re-query a subject the user has
                // navigated away from.
                effects.push(Effect::CancelRetryTimer);
            }
            state.begin_query(urn.clone());
            effects.push(Effect::UpdateFragment {
                urn: Some(urn.clone()),
            });
            effects.push(Effect::QueryStatus { urn });
            effects
        }
        Msg::StatusArrived { urn, status } => {
            if !state.is_current(&urn) {
                // Late response for a superseded subject.
                return (state, Vec::new());
            }
            apply_status(&mut state, urn, status)
        }
        Msg::QueryFailed { urn, error } => {
            if !state.is_current(&urn) {
                return (state, Vec::new());
            }
            // Transport failures are surfaced once; only in-progress results
            // schedule an automatic retry.
            let notice = Notice::QueryError(error);
            state.settle(PollPhase::Idle, Some(notice.clone()));
            vec![Effect::ShowNotice(notice)]
        }
        Msg::RetryTimerFired { urn } => {
            if !state.timer_armed() || !state.is_current(&urn) {
                return (state, Vec::new());
            }
            state.requery();
            vec![Effect::QueryStatus { urn }]
        }
        Msg::SubjectCleared => {
            let mut effects = Vec::with_capacity(3);
            if state.timer_armed() {
                effects.push(Effect::CancelRetryTimer);
            }
            state.reset();
            effects.push(Effect::UpdateFragment { urn: None });
            effects.push(Effect::ClearNotice);
            effects
        }
    };

    (state, effects)
}

fn apply_status(state: &mut ViewerState, urn: String, status: TranslationStatus) -> Vec<Effect> {
    match status {
        TranslationStatus::Absent => {
            let notice = Notice::NotTranslated;
            state.settle(PollPhase::NotTranslated, Some(notice.clone()));
            vec![Effect::ShowNotice(notice)]
        }
        TranslationStatus::Pending => {
            let notice = Notice::Progress("queued for translation".to_string());
            schedule_retry(state, urn, notice)
        }
        TranslationStatus::InProgress { progress } => {
            schedule_retry(state, urn, Notice::Progress(progress))
        }
        TranslationStatus::Failed { messages } => {
            let notice = Notice::TranslationFailed(messages);
            state.settle(PollPhase::Failed, Some(notice.clone()));
            vec![Effect::ShowNotice(notice)]
        }
        TranslationStatus::Complete => {
            state.settle(PollPhase::Ready, None);
            vec![Effect::ClearNotice, Effect::LoadViewer { urn }]
        }
    }
}

fn schedule_retry(state: &mut ViewerState, urn: String, notice: Notice) -> Vec<Effect> {
    let delay = state.retry_delay();
    state.await_retry(notice.clone());
    vec![
        Effect::ShowNotice(notice),
        Effect::ArmRetryTimer { urn, delay },
    ]
}
