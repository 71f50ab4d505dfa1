//! Authentication state machine using rust-fsm.
//!
//! ```text
//!            SessionRestored
//!   ┌──────────────────────────────────┐
//!   │                                  ▼
//! NotLoggedIn ──LoginAttempt──► LoggingIn ──LoginSuccess──► LoggedIn
//!   ▲                              │                          │  │
//!   │  LoginRejected / LoginFailed │          LoginAttempt ◄──┘  │ LogoutRequested
//!   └──────────────────────────────┘                             ▼
//!   ▲                                                       LoggingOut
//!   └──────────────────────LogoutComplete────────────────────────┘
//! ```

use rust_fsm::*;
use serde::{Deserialize, Serialize};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub auth_machine(NotLoggedIn)

    NotLoggedIn => {
        SessionRestored => LoggedIn,
        LoginAttempt => LoggingIn
    },
    LoggingIn => {
        LoginSuccess => LoggedIn,
        // Provider answered with a non-zero status
        LoginRejected => NotLoggedIn,
        // Transport or parse failure
        LoginFailed => NotLoggedIn
    },
    LoggedIn => {
        LoginAttempt => LoggingIn,
        LogoutRequested => LoggingOut
    },
    LoggingOut => {
        LogoutComplete => NotLoggedIn
    }
}

pub use auth_machine::Input as AuthMachineInput;
pub use auth_machine::State as AuthMachineState;
pub use auth_machine::StateMachine as AuthMachine;

/// Simplified view of the FSM state for callers and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    NotLoggedIn,
    LoggingIn,
    LoggedIn,
    LoggingOut,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::LoggedIn)
    }
}

impl From<&AuthMachineState> for AuthState {
    fn from(state: &AuthMachineState) -> Self {
        match state {
            AuthMachineState::NotLoggedIn => AuthState::NotLoggedIn,
            AuthMachineState::LoggingIn => AuthState::LoggingIn,
            AuthMachineState::LoggedIn => AuthState::LoggedIn,
            AuthMachineState::LoggingOut => AuthState::LoggingOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_not_logged_in() {
        let machine = AuthMachine::new();
        assert_eq!(*machine.state(), AuthMachineState::NotLoggedIn);
    }

    #[test]
    fn test_login_flow() {
        let mut machine = AuthMachine::new();

        machine.consume(&AuthMachineInput::LoginAttempt).unwrap();
        assert_eq!(*machine.state(), AuthMachineState::LoggingIn);

        machine.consume(&AuthMachineInput::LoginSuccess).unwrap();
        assert_eq!(*machine.state(), AuthMachineState::LoggedIn);
    }

    #[test]
    fn test_rejection_and_failure_return_to_not_logged_in() {
        for input in [AuthMachineInput::LoginRejected, AuthMachineInput::LoginFailed] {
            let mut machine = AuthMachine::new();
            machine.consume(&AuthMachineInput::LoginAttempt).unwrap();
            machine.consume(&input).unwrap();
            assert_eq!(*machine.state(), AuthMachineState::NotLoggedIn);
        }
    }

    #[test]
    fn test_restored_session_is_logged_in() {
        let mut machine = AuthMachine::new();
        machine.consume(&AuthMachineInput::SessionRestored).unwrap();
        assert_eq!(*machine.state(), AuthMachineState::LoggedIn);
    }

    #[test]
    fn test_relogin_from_logged_in() {
        let mut machine = AuthMachine::new();
        machine.consume(&AuthMachineInput::SessionRestored).unwrap();

        machine.consume(&AuthMachineInput::LoginAttempt).unwrap();
        assert_eq!(*machine.state(), AuthMachineState::LoggingIn);
    }

    #[test]
    fn test_logout_flow() {
        let mut machine = AuthMachine::new();
        machine.consume(&AuthMachineInput::LoginAttempt).unwrap();
        machine.consume(&AuthMachineInput::LoginSuccess).unwrap();

        machine.consume(&AuthMachineInput::LogoutRequested).unwrap();
        assert_eq!(*machine.state(), AuthMachineState::LoggingOut);

        machine.consume(&AuthMachineInput::LogoutComplete).unwrap();
        assert_eq!(*machine.state(), AuthMachineState::NotLoggedIn);
    }

    #[test]
    fn test_invalid_transition_returns_error() {
        let mut machine = AuthMachine::new();

        assert!(machine.consume(&AuthMachineInput::LogoutRequested).is_err());
        assert!(machine.consume(&AuthMachineInput::LoginSuccess).is_err());
        assert_eq!(*machine.state(), AuthMachineState::NotLoggedIn);
    }

    #[test]
    fn test_auth_state_conversion() {
        assert_eq!(AuthState::from(&AuthMachineState::NotLoggedIn), AuthState::NotLoggedIn);
        assert_eq!(AuthState::from(&AuthMachineState::LoggingIn), AuthState::LoggingIn);
        assert_eq!(AuthState::from(&AuthMachineState::LoggedIn), AuthState::LoggedIn);
        assert_eq!(AuthState::from(&AuthMachineState::LoggingOut), AuthState::LoggingOut);
    }

    #[test]
    fn test_auth_state_predicates() {
        assert!(AuthState::LoggedIn.is_authenticated());
        assert!(!AuthState::LoggingIn.is_authenticated());
        assert!(!AuthState::LoggingOut.is_authenticated());
        assert!(!AuthState::NotLoggedIn.is_authenticated());
    }
}
