//! Session state: who is signed in and which token authorises requests.
//!
//! Tokens live in memory and in the [`TokenStore`]; the two are written
//! together under the state lock. Every reset bumps an epoch counter, and
//! remote completions that started under an older epoch are discarded so a
//! slow login cannot resurrect a session the user already ended.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::customer_store::LoadingGuard;
use super::ports::{AuthApi, TokenSlot, TokenStore, TokenStoreError};
use super::session::{AccessToken, FetchUserOutcome, GUEST_NAME, SessionPhase, SessionUser};
use super::{Error, LoginCredentials};

#[derive(Debug, Default)]
struct SessionState {
    user: Option<SessionUser>,
    token: Option<AccessToken>,
    logging_in: bool,
    error: Option<String>,
}

/// Session store.
pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    tokens: Arc<dyn TokenStore>,
    state: Mutex<SessionState>,
    epoch: AtomicU64,
    in_flight: AtomicUsize,
}

impl SessionStore {
    /// Create a store and rehydrate the access token from `tokens`.
    pub fn new(api: Arc<dyn AuthApi>, tokens: Arc<dyn TokenStore>) -> Self {
        let store = Self {
            api,
            tokens,
            state: Mutex::new(SessionState::default()),
            epoch: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        };
        store.rehydrate();
        store
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Reload the access token from durable storage.
    ///
    /// A read failure leaves the session anonymous. Returns whether a token
    /// was found.
    pub fn rehydrate(&self) -> bool {
        let token = match self.tokens.load(TokenSlot::Access) {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "could not read stored access token");
                None
            }
        };
        let found = token.is_some();
        let mut state = self.state();
        if state.token.is_none() {
            state.token = token;
        }
        debug!(found, "session rehydrated");
        found
    }

    /// Sign in with raw form input.
    ///
    /// Blank input is rejected locally with [`crate::domain::ErrorCode::InvalidRequest`].
    /// A remote failure clears both token slots, moves the session to
    /// [`SessionPhase::Error`], retains the message and is returned.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, Error> {
        let credentials = LoginCredentials::try_from_parts(email, password).map_err(|err| {
            let message = err.to_string();
            self.state().error = Some(message.clone());
            Error::invalid_request(message)
        })?;

        let epoch = self.current_epoch();
        {
            let mut state = self.state();
            state.logging_in = true;
            state.error = None;
        }
        let _loading = LoadingGuard::new(&self.in_flight);
        let result = self.api.login(&credentials).await;

        let mut state = self.state();
        if self.current_epoch() != epoch {
            debug!(email = credentials.email(), "discarding login that finished after a reset");
            return Err(Error::session_invalid("session was reset while signing in"));
        }
        state.logging_in = false;

        match result {
            Ok(response) => {
                self.persist(TokenSlot::Access, Some(&response.access_token));
                self.persist(TokenSlot::Refresh, response.refresh_token.as_ref());
                state.token = Some(response.access_token);
                state.user = Some(response.user.clone());
                info!(user_id = %response.user.id, role = %response.user.role, "signed in");
                Ok(response.user)
            }
            Err(err) => {
                self.persist(TokenSlot::Access, None);
                self.persist(TokenSlot::Refresh, None);
                state.token = None;
                state.user = None;
                let message = format!("Login failed: {err}");
                state.error = Some(message.clone());
                warn!(error = %err, "sign-in rejected");
                Err(Error::new(err.code(), message))
            }
        }
    }

    fn persist(&self, slot: TokenSlot, token: Option<&AccessToken>) {
        let result: Result<(), TokenStoreError> = match token {
            Some(token) => self.tokens.save(slot, token),
            None => self.tokens.clear(slot),
        };
        if let Err(err) = result {
            warn!(%slot, error = %err, "token storage update failed");
        }
    }

    /// Sign out.
    ///
    /// The session is anonymous as soon as this is called. The remote logout
    /// is attempted only while a token is held, and both storage slots are
    /// cleared whatever it returns.
    pub async fn logout(&self) {
        let had_token = {
            let mut state = self.state();
            self.epoch.fetch_add(1, Ordering::SeqCst);
            let had_token = state.token.is_some();
            state.token = None;
            state.user = None;
            state.logging_in = false;
            had_token
        };

        if had_token {
            let _loading = LoadingGuard::new(&self.in_flight);
            if let Err(err) = self.api.logout().await {
                debug!(error = %err, "remote logout failed");
            }
        }

        let state = self.state();
        if state.token.is_none() {
            self.persist(TokenSlot::Access, None);
            self.persist(TokenSlot::Refresh, None);
        }
        info!("signed out");
    }

    /// Confirm the session with the server and refresh the profile.
    ///
    /// Without a token nothing is fetched. A failed fetch signs the user out.
    pub async fn fetch_user(&self) -> FetchUserOutcome {
        let epoch = self.current_epoch();
        if self.state().token.is_none() {
            return FetchUserOutcome::Skipped;
        }

        let result = {
            let _loading = LoadingGuard::new(&self.in_flight);
            self.api.current_user().await
        };

        match result {
            Ok(user) => {
                let mut state = self.state();
                if self.current_epoch() != epoch {
                    return FetchUserOutcome::Superseded;
                }
                state.user = Some(user.clone());
                FetchUserOutcome::Refreshed(user)
            }
            Err(err) => {
                if self.current_epoch() != epoch {
                    return FetchUserOutcome::Superseded;
                }
                warn!(error = %err, "profile fetch failed; signing out");
                self.logout().await;
                FetchUserOutcome::SessionInvalidated
            }
        }
    }

    /// Exchange the stored refresh token for a new access token.
    pub async fn refresh_access_token(&self) -> Result<(), Error> {
        let refresh = self
            .tokens
            .load(TokenSlot::Refresh)
            .map_err(|err| Error::internal(err.to_string()))?
            .ok_or_else(|| Error::session_invalid("no refresh token is stored"))?;

        let epoch = self.current_epoch();
        let access = {
            let _loading = LoadingGuard::new(&self.in_flight);
            self.api.refresh(&refresh).await
        }
        .map_err(|err| Error::new(err.code(), format!("Token refresh failed: {err}")))?;

        let mut state = self.state();
        if self.current_epoch() != epoch {
            return Err(Error::session_invalid("session was reset while refreshing"));
        }
        self.tokens
            .save(TokenSlot::Access, &access)
            .map_err(|err| Error::internal(err.to_string()))?;
        state.token = Some(access);
        debug!("access token refreshed");
        Ok(())
    }

    /// Signed-in user, if known.
    pub fn user(&self) -> Option<SessionUser> {
        self.state().user.clone()
    }

    /// Whether an access token is held.
    pub fn is_authenticated(&self) -> bool {
        self.state().token.is_some()
    }

    /// Whether the user holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.state().user.as_ref().is_some_and(SessionUser::is_admin)
    }

    /// Display name, or `Guest` when nobody is known.
    pub fn user_name(&self) -> String {
        self.state()
            .user
            .as_ref()
            .map_or_else(|| GUEST_NAME.to_owned(), |user| user.name.clone())
    }

    /// Admins hold every permission; others need an explicit grant.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.state()
            .user
            .as_ref()
            .is_some_and(|user| user.has_permission(permission))
    }

    /// Lifecycle phase derived from the current state.
    pub fn phase(&self) -> SessionPhase {
        let state = self.state();
        if state.logging_in {
            SessionPhase::Authenticating
        } else if state.token.is_some() {
            SessionPhase::Authenticated
        } else if state.error.is_some() {
            SessionPhase::Error
        } else {
            SessionPhase::Anonymous
        }
    }

    /// Whether any session request is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Message left by the most recent failed login.
    pub fn last_error(&self) -> Option<String> {
        self.state().error.clone()
    }
}

#[cfg(test)]
#[path = "session_store_tests.rs"]
mod tests;
