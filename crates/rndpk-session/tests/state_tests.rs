use proptest::prelude::*;
use rndpk_session::{allowed_transitions, validate_transition, SessionError, SessionState};

fn any_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![
        Just(SessionState::Empty),
        Just(SessionState::Ready),
        Just(SessionState::Randomizing),
    ]
}

#[test]
fn test_load_transitions() {
    assert!(validate_transition(SessionState::Empty, SessionState::Ready).is_ok());
    assert!(validate_transition(SessionState::Ready, SessionState::Ready).is_ok());

    // Nothing returns to empty
    assert!(validate_transition(SessionState::Ready, SessionState::Empty).is_err());
}

#[test]
fn test_illegal_transition_error() {
    let err = validate_transition(SessionState::Empty, SessionState::Randomizing).unwrap_err();
    assert!(matches!(
        err,
        SessionError::IllegalTransition {
            from: SessionState::Empty,
            to: SessionState::Randomizing
        }
    ));
    assert_eq!(err.to_string(), "illegal session transition empty -> randomizing");
}

proptest! {
    #[test]
    fn prop_transitions_match_allowed(from in any_state(), to in any_state()) {
        let allowed = allowed_transitions(from).contains(&to);
        prop_assert_eq!(validate_transition(from, to).is_ok(), allowed);
    }
}
