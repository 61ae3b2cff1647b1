use std::sync::Once;

use modelhub_core::{
    update, Diagnostic, Effect, Msg, Notice, PollPhase, TranslationStatus, ViewerState,
    RETRY_DELAY,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(hub_logging::initialize_for_tests);
}

fn select(state: ViewerState, urn: &str) -> (ViewerState, Vec<Effect>) {
    update(
        state,
        Msg::SubjectSelected {
            urn: urn.to_string(),
        },
    )
}

fn arrive(state: ViewerState, urn: &str, status: TranslationStatus) -> (ViewerState, Vec<Effect>) {
    update(
        state,
        Msg::StatusArrived {
            urn: urn.to_string(),
            status,
        },
    )
}

fn in_progress(text: &str) -> TranslationStatus {
    TranslationStatus::InProgress {
        progress: text.to_string(),
    }
}

#[test]
fn selecting_a_subject_updates_fragment_and_queries() {
    init_logging();
    let state = ViewerState::new();

    let (state, effects) = select(state, "URN-A");

    assert_eq!(state.phase(), PollPhase::Querying);
    assert_eq!(state.subject(), Some("URN-A"));
    assert!(!state.timer_armed());
    assert_eq!(
        effects,
        vec![
            Effect::UpdateFragment {
                urn: Some("URN-A".to_string()),
            },
            Effect::QueryStatus {
                urn: "URN-A".to_string(),
            },
        ]
    );
}

#[test]
fn scripted_in_progress_sequence_polls_then_loads_once() {
    init_logging();
    let state = ViewerState::new();
    let script = [
        in_progress("25% complete"),
        in_progress("80% complete"),
        TranslationStatus::Complete,
    ];

    let (mut state, effects) = select(state, "URN-A");
    let mut queries = effects
        .iter()
        .filter(|e| matches!(e, Effect::QueryStatus { .. }))
        .count();
    let mut timers = 0;
    let mut loads = 0;

    for status in script {
        let (next, effects) = arrive(state, "URN-A", status);
        state = next;
        for effect in &effects {
            match effect {
                Effect::ArmRetryTimer { urn, delay } => {
                    assert_eq!(urn, "URN-A");
                    assert_eq!(*delay, RETRY_DELAY);
                    timers += 1;
                }
                Effect::LoadViewer { urn } => {
                    assert_eq!(urn, "URN-A");
                    loads += 1;
                }
                _ => {}
            }
        }
        if state.timer_armed() {
            let (next, effects) = update(
                state,
                Msg::RetryTimerFired {
                    urn: "URN-A".to_string(),
                },
            );
            state = next;
            queries += effects
                .iter()
                .filter(|e| matches!(e, Effect::QueryStatus { .. }))
                .count();
        }
    }

    assert_eq!(queries, 3, "exactly one query per status in the script");
    assert_eq!(timers, 2, "only in-progress results arm the timer");
    assert_eq!(loads, 1, "viewer handoff happens exactly once");
    assert_eq!(state.phase(), PollPhase::Ready);
}

#[test]
fn switching_subject_cancels_the_pending_timer() {
    init_logging();
    let state = ViewerState::new();
    let (state, _) = select(state, "URN-A");
    let (state, _) = arrive(state, "URN-A", in_progress("10% complete"));
    assert!(state.timer_armed());

    let (state, effects) = select(state, "URN-B");
    assert_eq!(effects[0], Effect::CancelRetryTimer);
    assert!(!state.timer_armed());

    // Even if the runtime failed to abort it, a late fire for the old
    // subject must not trigger a query.
    let (state, effects) = update(
        state,
        Msg::RetryTimerFired {
            urn: "URN-A".to_string(),
        },
    );
    assert_eq!(effects, Vec::new());
    assert_eq!(state.subject(), Some("URN-B"));
    assert_eq!(state.phase(), PollPhase::Querying);
}

#[test]
fn stale_status_response_is_ignored() {
    init_logging();
    let state = ViewerState::new();
    let (state, _) = select(state, "URN-A");
    let (state, _) = select(state, "URN-B");

    // The old query completes after the user moved on.
    let (state, effects) = arrive(state, "URN-A", TranslationStatus::Complete);
    assert_eq!(effects, Vec::new());
    assert_eq!(state.phase(), PollPhase::Querying);
    assert_eq!(state.subject(), Some("URN-B"));
}

#[test]
fn absent_status_is_a_passive_terminal_notice() {
    init_logging();
    let state = ViewerState::new();
    let (state, _) = select(state, "URN-A");

    let (state, effects) = arrive(state, "URN-A", TranslationStatus::Absent);
    assert_eq!(state.phase(), PollPhase::NotTranslated);
    assert!(!state.timer_armed());
    assert_eq!(effects, vec![Effect::ShowNotice(Notice::NotTranslated)]);
}

#[test]
fn pending_status_schedules_a_retry_like_in_progress() {
    init_logging();
    let state = ViewerState::new();
    let (state, _) = select(state, "URN-A");

    let (state, effects) = arrive(state, "URN-A", TranslationStatus::Pending);
    assert_eq!(state.phase(), PollPhase::InProgress);
    assert!(state.timer_armed());
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::ArmRetryTimer { .. })));
}

#[test]
fn failed_status_is_terminal_with_full_message_list() {
    init_logging();
    let messages = vec![
        Diagnostic {
            code: Some("TranslationWorker-InternalFailure".to_string()),
            message: "translation failed".to_string(),
        },
        Diagnostic {
            code: None,
            message: "missing reference file".to_string(),
        },
    ];
    let state = ViewerState::new();
    let (state, _) = select(state, "URN-A");

    let (state, effects) = arrive(
        state,
        "URN-A",
        TranslationStatus::Failed {
            messages: messages.clone(),
        },
    );
    assert_eq!(state.phase(), PollPhase::Failed);
    assert!(!state.timer_armed());
    assert_eq!(
        effects,
        vec![Effect::ShowNotice(Notice::TranslationFailed(messages))]
    );
}

#[test]
fn query_failure_returns_to_idle_without_retry() {
    init_logging();
    let state = ViewerState::new();
    let (state, _) = select(state, "URN-A");

    let (state, effects) = update(
        state,
        Msg::QueryFailed {
            urn: "URN-A".to_string(),
            error: "backend transport error: connection refused".to_string(),
        },
    );
    assert_eq!(state.phase(), PollPhase::Idle);
    assert!(!state.timer_armed());
    assert_eq!(
        effects,
        vec![Effect::ShowNotice(Notice::QueryError(
            "backend transport error: connection refused".to_string()
        ))]
    );

    // No timer was armed, so a spurious fire does nothing.
    let (_, effects) = update(
        state,
        Msg::RetryTimerFired {
            urn: "URN-A".to_string(),
        },
    );
    assert_eq!(effects, Vec::new());
}

#[test]
fn clearing_the_subject_resets_fragment_and_notice() {
    init_logging();
    let state = ViewerState::new();
    let (state, _) = select(state, "URN-A");
    let (state, _) = arrive(state, "URN-A", in_progress("10% complete"));

    let (state, effects) = update(state, Msg::SubjectCleared);
    assert_eq!(state, ViewerState::new());
    assert_eq!(
        effects,
        vec![
            Effect::CancelRetryTimer,
            Effect::UpdateFragment { urn: None },
            Effect::ClearNotice,
        ]
    );
}

#[test]
fn view_model_mirrors_the_session() {
    init_logging();
    let state = ViewerState::new();
    let (state, _) = select(state, "URN-A");
    let (state, _) = arrive(state, "URN-A", in_progress("50% complete"));

    let view = state.view();
    assert_eq!(view.subject.as_deref(), Some("URN-A"));
    assert_eq!(view.phase, PollPhase::InProgress);
    assert_eq!(
        view.notice,
        Some(Notice::Progress("50% complete".to_string()))
    );
    assert!(view.timer_armed);
}
