//! Authentication: sign-in, sign-up, token validation, sign-out.
//!
//! The controller never leaves the session ambiguous: `check_auth_state`
//! always resolves to `SignedIn` with a fresh user or `SignedOut` with the
//! stale token discarded. Input validation happens before any network call.

use crate::api::Backend;
use crate::error::{Error, Result};
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::store::{self, KeyValueStore};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Basic `local@domain.tld` shape check, nothing more.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

pub fn valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    SignedOut,
    SignedIn(User),
}

pub struct AuthController {
    backend: Arc<dyn Backend>,
    store: Arc<dyn KeyValueStore>,
}

impl AuthController {
    pub fn new(backend: Arc<dyn Backend>, store: Arc<dyn KeyValueStore>) -> Self {
        Self { backend, store }
    }

    /// Resolve the persisted token into a definite auth state. An invalid or
    /// expired token is discarded; a transport failure keeps it for next time.
    pub async fn check_auth_state(&self) -> Result<AuthState> {
        let Some(token) = store::load_token(&*self.store)? else {
            return Ok(AuthState::SignedOut);
        };
        self.backend.set_token(Some(token));

        match self.backend.me().await {
            Ok(user) => {
                let user = match self.record_daily_login().await {
                    Ok(Some(updated)) => updated,
                    Ok(None) => user,
                    Err(e) => {
                        // Streak tracking is best-effort; the session stands.
                        eprintln!("[factflow] daily login not recorded: {e}");
                        user
                    }
                };
                Ok(AuthState::SignedIn(user))
            }
            Err(Error::AuthExpired) | Err(Error::Api { .. }) => {
                store::clear_token(&*self.store)?;
                self.backend.set_token(None);
                Ok(AuthState::SignedOut)
            }
            Err(e) => Err(e),
        }
    }

    /// Record one login per calendar day for streak tracking. Returns the
    /// refreshed user when the backend was called.
    async fn record_daily_login(&self) -> Result<Option<User>> {
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        if store::load_last_login(&*self.store)?.as_deref() == Some(today.as_str()) {
            return Ok(None);
        }
        let user = self.backend.daily_login().await?;
        store::save_last_login(&*self.store, &today)?;
        Ok(Some(user))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "email and password are required".to_string(),
            ));
        }

        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        match self.backend.login(&request).await {
            Ok(response) => {
                store::save_token(&*self.store, &response.access_token)?;
                self.backend.set_token(Some(response.access_token));
                match response.user {
                    Some(user) => Ok(user),
                    None => self.backend.me().await,
                }
            }
            // A 401 from /users/login means bad credentials, not an expired
            // session; don't trip the forced sign-out path.
            Err(Error::AuthExpired) => Err(Error::Auth(
                "sign-in failed, check your email and password".to_string(),
            )),
            Err(Error::Api { detail, .. }) => Err(Error::Auth(detail.unwrap_or_else(|| {
                "sign-in failed, check your email and password".to_string()
            }))),
            Err(e) => Err(e),
        }
    }

    /// Register a new account. Success does not authenticate; the caller
    /// gets the email back to pre-fill sign-in.
    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<String> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() || email.is_empty() || password.is_empty() || confirm.is_empty() {
            return Err(Error::Validation("all fields are required".to_string()));
        }
        if password != confirm {
            return Err(Error::Validation("passwords do not match".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if !valid_email(email) {
            return Err(Error::Validation(
                "enter a valid email address".to_string(),
            ));
        }

        let request = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            profile_photo: None,
        };
        match self.backend.register(&request).await {
            Ok(_) => Ok(email.to_string()),
            Err(Error::Api { detail, .. }) => Err(Error::Auth(
                detail.unwrap_or_else(|| "registration failed".to_string()),
            )),
            Err(e) => Err(e),
        }
    }

    /// Drop the token and detach the backend credential. Confirmation is the
    /// caller's responsibility.
    pub fn sign_out(&self) -> Result<()> {
        store::clear_token(&*self.store)?;
        self.backend.set_token(None);
        Ok(())
    }
}
