//! Session lifecycle on top of the LibreLinkUp client.
//!
//! `SessionManager` tracks auth state with an explicit FSM, persists the
//! session through an injected [`CredentialStore`] and restores it on
//! construction.

use crate::auth_fsm::{AuthMachine, AuthMachineInput, AuthState};
use crate::{AuthError, AuthOutcome, AuthResult, CgmData, Connection, LinkUpClient, LoginRequest, Session};
use chrono::{DateTime, Utc};
use glucolink_storage::{CredentialStore, SessionMeta};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Authentication status for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthStatus {
    LoggedIn {
        account_id: String,
        region: String,
        logged_in_at: DateTime<Utc>,
    },
    NotLoggedIn,
}

#[derive(Clone)]
struct ActiveSession {
    session: Session,
    logged_in_at: DateTime<Utc>,
}

/// Owns the client, the credential store and the current session.
pub struct SessionManager {
    client: LinkUpClient,
    credentials: CredentialStore,
    default_region: String,
    fsm: Mutex<AuthMachine>,
    active: Mutex<Option<ActiveSession>>,
}

impl SessionManager {
    /// Create a manager, restoring a stored session if one exists.
    pub fn new(client: LinkUpClient, credentials: CredentialStore, default_region: &str) -> Self {
        let manager = Self {
            client,
            credentials,
            default_region: default_region.to_string(),
            fsm: Mutex::new(AuthMachine::new()),
            active: Mutex::new(None),
        };
        manager.restore();
        manager
    }

    fn restore(&self) {
        let Some(token) = self.credentials.get_api_token() else {
            debug!("No stored session");
            return;
        };

        let meta = match self.credentials.get_session_meta() {
            Ok(Some(meta)) => meta,
            Ok(None) => {
                info!("Stored token has no session metadata, ignoring it");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Stored session metadata unreadable, ignoring it");
                return;
            }
        };

        let restored = ActiveSession {
            session: Session {
                token,
                account_id: meta.account_id,
                region: meta.region,
            },
            logged_in_at: meta.logged_in_at,
        };

        if self.transition(&AuthMachineInput::SessionRestored).is_ok() {
            info!(region = %restored.session.region, "Restored stored session");
            *self.active.lock() = Some(restored);
        }
    }

    /// Current FSM state.
    pub fn state(&self) -> AuthState {
        AuthState::from(self.fsm.lock().state())
    }

    fn transition(&self, input: &AuthMachineInput) -> AuthResult<AuthState> {
        let mut fsm = self.fsm.lock();
        let old_state = AuthState::from(fsm.state());

        fsm.consume(input).map_err(|_| {
            AuthError::InvalidStateTransition(format!(
                "Cannot apply {:?} in state {:?}",
                input,
                fsm.state()
            ))
        })?;

        let new_state = AuthState::from(fsm.state());
        if old_state != new_state {
            debug!(old_state = ?old_state, new_state = ?new_state, "Auth state transition");
        }
        Ok(new_state)
    }

    pub fn client(&self) -> &LinkUpClient {
        &self.client
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Region the next login should start from: the stored session's, else the default.
    pub fn preferred_region(&self) -> String {
        match self.credentials.get_session_meta() {
            Ok(Some(meta)) => meta.region,
            _ => self.default_region.clone(),
        }
    }

    fn persist(&self, session: &Session, logged_in_at: DateTime<Utc>) -> AuthResult<()> {
        self.credentials.store_api_token(&session.token)?;
        self.credentials.store_session_meta(&SessionMeta {
            account_id: session.account_id.clone(),
            region: session.region.clone(),
            logged_in_at,
        })?;
        Ok(())
    }

    /// Enter `LoggingIn`, dropping the in-memory session.
    fn begin_attempt(&self) -> AuthResult<Option<ActiveSession>> {
        self.transition(&AuthMachineInput::LoginAttempt)?;
        Ok(self.active.lock().take())
    }

    fn clear_stored_session(&self, context: &'static str) {
        if let Err(e) = self.credentials.clear_session() {
            warn!(error = %e, context, "Stored session could not be cleared");
        }
    }

    /// Apply the result of an authentication attempt started with
    /// [`begin_attempt`](Self::begin_attempt).
    fn finish_attempt(
        &self,
        attempt: AuthResult<AuthOutcome>,
        request: &LoginRequest,
        remember: bool,
    ) -> AuthResult<AuthOutcome> {
        let outcome = match attempt {
            Ok(outcome) => outcome,
            Err(e) => {
                self.transition(&AuthMachineInput::LoginFailed)?;
                return Err(e);
            }
        };

        let session = match outcome {
            AuthOutcome::Success(session) => session,
            AuthOutcome::Failure { status } => {
                self.transition(&AuthMachineInput::LoginRejected)?;
                return Ok(AuthOutcome::Failure { status });
            }
            AuthOutcome::Unknown => {
                self.transition(&AuthMachineInput::LoginFailed)?;
                return Ok(AuthOutcome::Unknown);
            }
        };

        let logged_in_at = Utc::now();
        let stored = self.persist(&session, logged_in_at).and_then(|()| {
            if remember {
                self.credentials
                    .store_credentials(&request.username, &request.password)?;
            } else {
                self.credentials.delete_credentials();
            }
            Ok(())
        });

        if let Err(e) = stored {
            self.clear_stored_session("persist failed");
            self.transition(&AuthMachineInput::LoginFailed)?;
            return Err(e);
        }

        *self.active.lock() = Some(ActiveSession {
            session: session.clone(),
            logged_in_at,
        });
        self.transition(&AuthMachineInput::LoginSuccess)?;
        Ok(AuthOutcome::Success(session))
    }

    /// Log in and persist the resulting session.
    ///
    /// A new attempt replaces the current session. With `remember` the
    /// username and password are stored for [`relogin`](Self::relogin);
    /// without it any stored credentials are removed.
    pub async fn login(&self, request: &LoginRequest, remember: bool) -> AuthResult<AuthOutcome> {
        self.begin_attempt()?;
        self.clear_stored_session("new login");

        let attempt = self.client.authenticate(request).await;
        self.finish_attempt(attempt, request, remember)
    }

    fn saved_request(&self) -> Option<LoginRequest> {
        let credentials = self.credentials.get_credentials()?;
        Some(LoginRequest::new(
            self.preferred_region(),
            credentials.username,
            credentials.password,
        ))
    }

    /// Log in again with stored credentials, starting from the preferred region.
    pub async fn relogin(&self) -> AuthResult<AuthOutcome> {
        let request = self.saved_request().ok_or(AuthError::NotLoggedIn)?;
        self.login(&request, true).await
    }

    /// Replace the session using stored credentials.
    ///
    /// The stored token is only discarded once the provider has answered.
    /// If it cannot be reached the previous session stays in place.
    async fn refresh_session(&self) -> Option<Session> {
        let request = self.saved_request()?;
        info!(region = %request.region, "Refreshing session with stored credentials");

        let previous = match self.begin_attempt() {
            Ok(previous) => previous,
            Err(e) => {
                warn!(error = %e, "Cannot refresh session now");
                return None;
            }
        };

        let outcome = self.client.authenticate_or_unknown(&request).await;
        if matches!(outcome, AuthOutcome::Failure { .. }) {
            self.clear_stored_session("stored credentials rejected");
        }

        match self.finish_attempt(Ok(outcome), &request, true) {
            Ok(AuthOutcome::Success(session)) => Some(session),
            Ok(AuthOutcome::Failure { status }) => {
                warn!(status, "Stored credentials were rejected");
                None
            }
            Ok(AuthOutcome::Unknown) => {
                if let Some(previous) = previous {
                    if self.transition(&AuthMachineInput::SessionRestored).is_ok() {
                        *self.active.lock() = Some(previous);
                    }
                }
                None
            }
            Err(e) => {
                warn!(error = %e, "Session refresh failed");
                None
            }
        }
    }

    /// Status of the in-memory session.
    pub fn status(&self) -> AuthStatus {
        match self.active.lock().as_ref() {
            Some(active) => AuthStatus::LoggedIn {
                account_id: active.session.account_id.clone(),
                region: active.session.region.clone(),
                logged_in_at: active.logged_in_at,
            },
            None => AuthStatus::NotLoggedIn,
        }
    }

    pub fn current_session(&self) -> Option<Session> {
        self.active.lock().as_ref().map(|active| active.session.clone())
    }

    fn require_session(&self) -> AuthResult<Session> {
        self.current_session().ok_or(AuthError::NotLoggedIn)
    }

    /// Drop the session; with `forget_credentials` also the stored username and password.
    ///
    /// Fails if the stored token could not be removed, since the next start
    /// would otherwise restore it.
    pub fn logout(&self, forget_credentials: bool) -> AuthResult<()> {
        let logged_in = self.state().is_authenticated();
        if logged_in {
            self.transition(&AuthMachineInput::LogoutRequested)?;
        }

        self.active.lock().take();
        let cleared = self.credentials.clear_session();
        if forget_credentials {
            self.credentials.delete_credentials();
        }

        if logged_in {
            self.transition(&AuthMachineInput::LogoutComplete)?;
        }
        cleared?;
        info!(forget_credentials, "Logged out");
        Ok(())
    }

    /// Active connection for the current session.
    pub async fn fetch_connection(&self) -> AuthResult<Option<Connection>> {
        let session = self.require_session()?;
        Ok(self.client.fetch_connection(&session).await)
    }

    /// Glucose graph for the current session.
    pub async fn fetch_cgm_data(&self) -> AuthResult<Option<CgmData>> {
        let session = self.require_session()?;
        Ok(self.client.fetch_cgm_data(&session).await)
    }

    /// Current session, or a fresh one from stored credentials. The flag
    /// tells whether it was just issued.
    async fn session_or_refresh(&self) -> AuthResult<(Session, bool)> {
        if let Some(session) = self.current_session() {
            return Ok((session, false));
        }
        let fresh = self.refresh_session().await.ok_or(AuthError::NotLoggedIn)?;
        Ok((fresh, true))
    }

    /// Like [`fetch_connection`](Self::fetch_connection), logging in with
    /// stored credentials first when there is no session.
    ///
    /// An empty result is not retried: it also means "no connection".
    pub async fn fetch_connection_or_refresh(&self) -> AuthResult<Option<Connection>> {
        let (session, _) = self.session_or_refresh().await?;
        Ok(self.client.fetch_connection(&session).await)
    }

    /// Like [`fetch_cgm_data`](Self::fetch_cgm_data), re-authenticating once
    /// with stored credentials when there is no session or the fetch fails.
    pub async fn fetch_cgm_data_or_refresh(&self) -> AuthResult<Option<CgmData>> {
        let (session, just_issued) = self.session_or_refresh().await?;
        if let Some(data) = self.client.fetch_cgm_data(&session).await {
            return Ok(Some(data));
        }
        if just_issued {
            return Ok(None);
        }

        match self.refresh_session().await {
            Some(fresh) => Ok(self.client.fetch_cgm_data(&fresh).await),
            None => Ok(None),
        }
    }
}
