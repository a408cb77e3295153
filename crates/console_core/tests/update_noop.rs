use console_core::{update, AppState, Msg};

#[test]
fn update_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn answering_without_question_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::ConfirmationAnswered(true));

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
