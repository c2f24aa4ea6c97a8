//! Session Manager
//!
//! Owns the authenticated session: credential submission, token persistence,
//! token refresh, profile retrieval and logout. One instance is constructed at
//! start-up and shared by reference (clones share state).

use parking_lot::RwLock;
use std::sync::Arc;

use voyage_storage::Database;
use voyage_validation::{check_email_format, validate_email, validate_password};

use crate::api::{ApiResponse, AuthApi, AuthPayload};
use crate::error::AuthError;
use crate::events::{AuthStateChange, Listeners, SubscriptionId};
use crate::session::{Credentials, ProfileUpdate, Registration, Session, UserProfile};
use crate::Result;

const TOKEN_KEY: &str = "authToken";
const USER_KEY: &str = "user";
const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Status the verify endpoint uses for an expired (but refreshable) token.
const TOKEN_EXPIRED: u16 = 419;

/// In-memory mirror of the three storage entries
#[derive(Debug, Clone, Default)]
struct AuthState {
    token: Option<String>,
    user: Option<UserProfile>,
    refresh_token: Option<String>,
}

pub struct SessionManager {
    state: Arc<RwLock<AuthState>>,
    listeners: Listeners,
    db: Database,
    api: AuthApi,
}

impl SessionManager {
    /// Build the manager and load any persisted session.
    pub fn new(db: Database, api: AuthApi) -> Result<Self> {
        let state = load_state(&db)?;

        tracing::debug!(
            has_token = state.token.is_some(),
            has_user = state.user.is_some(),
            has_refresh_token = state.refresh_token.is_some(),
            "Loaded persisted session"
        );

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            listeners: Listeners::default(),
            db,
            api,
        })
    }

    // === State ===

    pub fn is_authenticated(&self) -> bool {
        let state = self.state.read();
        state.token.as_deref().is_some_and(|t| !t.is_empty()) && state.user.is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state.read().refresh_token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.read().user.clone()
    }

    pub fn session(&self) -> Option<Session> {
        let state = self.state.read();
        state.token.clone().map(|access_token| Session {
            access_token,
            refresh_token: state.refresh_token.clone(),
            user: state.user.clone(),
        })
    }

    /// `Authorization` header value for authenticated calls to other APIs.
    pub fn auth_header(&self) -> Option<String> {
        self.state
            .read()
            .token
            .as_ref()
            .map(|token| format!("Bearer {token}"))
    }

    pub fn api(&self) -> &AuthApi {
        &self.api
    }

    // === Listeners ===

    /// Register a listener for auth state changes. It runs synchronously after
    /// every storage write, in registration order.
    pub fn on_state_change<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&AuthStateChange) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // === Persistence ===

    /// Store a full session. The only way to set the token and user.
    pub fn set_auth_data(
        &self,
        token: String,
        user: UserProfile,
        refresh_token: Option<String>,
    ) -> Result<()> {
        let user_json = serde_json::to_string(&user)?;

        self.db.write_entries(&[
            (TOKEN_KEY, Some(token.as_str())),
            (USER_KEY, Some(user_json.as_str())),
            (REFRESH_TOKEN_KEY, refresh_token.as_deref()),
        ])?;

        *self.state.write() = AuthState {
            token: Some(token),
            user: Some(user.clone()),
            refresh_token,
        };

        self.listeners.notify(&AuthStateChange {
            authenticated: true,
            user: Some(user),
        });

        Ok(())
    }

    /// Drop all three entries. The in-memory session is cleared even if the
    /// storage write fails.
    pub fn clear_auth_data(&self) -> Result<()> {
        let written = self.db.write_entries(&[
            (TOKEN_KEY, None),
            (USER_KEY, None),
            (REFRESH_TOKEN_KEY, None),
        ]);

        *self.state.write() = AuthState::default();

        self.listeners.notify(&AuthStateChange {
            authenticated: false,
            user: None,
        });

        if let Err(e) = &written {
            tracing::error!(error = %e, "Failed to clear persisted session");
        }
        written?;
        Ok(())
    }

    fn store_user(&self, user: UserProfile) -> Result<()> {
        let user_json = serde_json::to_string(&user)?;
        self.db.set_entry(USER_KEY, &user_json)?;

        self.state.write().user = Some(user.clone());

        let authenticated = self.is_authenticated();
        self.listeners.notify(&AuthStateChange {
            authenticated,
            user: Some(user),
        });

        Ok(())
    }

    // === Credential flows ===

    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        check_email_format(&credentials.email)
            .into_result()
            .map_err(AuthError::InvalidEmail)?;

        let response = self
            .api
            .login(credentials)
            .await
            .map_err(|e| network_error("login", e))?;

        let session = self.establish(response, "Login failed")?;
        tracing::info!(email = %credentials.email, "Logged in");
        Ok(session)
    }

    pub async fn register(&self, registration: &Registration) -> Result<Session> {
        validate_email(&registration.email)
            .into_result()
            .map_err(AuthError::InvalidEmail)?;
        validate_password(&registration.password)
            .into_result()
            .map_err(AuthError::WeakPassword)?;

        let response = self
            .api
            .register(registration)
            .await
            .map_err(|e| network_error("register", e))?;

        let session = self.establish(response, "Registration failed")?;
        tracing::info!(email = %registration.email, "Registered new account");
        Ok(session)
    }

    /// Persist a login/register response, or surface the server's message.
    /// A rejected response leaves the stored session untouched.
    fn establish(
        &self,
        response: ApiResponse<AuthPayload>,
        fallback: &str,
    ) -> Result<Session> {
        let payload = match response {
            ApiResponse::Success(payload) => payload,
            ApiResponse::Failure { status, message } => {
                tracing::warn!(status = %status, "Auth request rejected");
                return Err(AuthError::Rejected(
                    message.unwrap_or_else(|| fallback.to_string()),
                ));
            }
        };

        let token = payload
            .access_token()
            .ok_or_else(|| AuthError::InvalidResponse("missing access token".to_string()))?
            .to_string();
        let user = payload
            .user
            .ok_or_else(|| AuthError::InvalidResponse("missing user".to_string()))?;

        self.set_auth_data(token.clone(), user.clone(), payload.refresh_token.clone())?;

        Ok(Session {
            access_token: token,
            refresh_token: payload.refresh_token,
            user: Some(user),
        })
    }

    /// Best-effort server-side invalidation, then an unconditional local clear.
    pub async fn logout(&self) -> Result<()> {
        let (token, refresh_token) = {
            let state = self.state.read();
            (state.token.clone(), state.refresh_token.clone())
        };

        if let Some(token) = token {
            match self.api.logout(&token, refresh_token.as_deref()).await {
                Ok(status) if status.is_success() => {}
                Ok(status) => tracing::warn!(status = %status, "Logout request rejected"),
                Err(e) => tracing::warn!(error = %e, "Logout request failed"),
            }
        }

        self.clear_auth_data()?;
        tracing::info!("Logged out");
        Ok(())
    }

    // === Token lifecycle ===

    /// Exchange the refresh token for a new access token. Any failure clears
    /// the session. Returns `Ok(false)` when no refresh token is held.
    pub async fn refresh_auth_token(&self) -> Result<bool> {
        let Some(refresh_token) = self.refresh_token() else {
            return Ok(false);
        };

        let payload = match self.api.refresh(&refresh_token).await {
            Ok(ApiResponse::Success(payload)) => payload,
            Ok(ApiResponse::Failure { status, .. }) => {
                tracing::warn!(status = %status, "Token refresh rejected");
                self.clear_auth_data()?;
                return Ok(false);
            }
            Err(e) => {
                tracing::error!(error = %e, "Token refresh failed");
                self.clear_auth_data()?;
                return Ok(false);
            }
        };

        let token = payload.access_token().map(str::to_string);
        let user = payload.user.or_else(|| self.user());

        match (token, user) {
            (Some(token), Some(user)) => {
                self.set_auth_data(token, user, Some(refresh_token))?;
                tracing::debug!("Access token refreshed");
                Ok(true)
            }
            _ => {
                tracing::warn!("Token refresh response missing token or user");
                self.clear_auth_data()?;
                Ok(false)
            }
        }
    }

    /// Check the access token with the server. An expired token gets exactly
    /// one silent refresh attempt. Any failed verification clears the session.
    pub async fn verify_token(&self) -> Result<bool> {
        let Some(token) = self.token() else {
            return Ok(false);
        };

        match self.api.verify(&token).await {
            Ok(status) if status.is_success() => Ok(true),
            Ok(status) if status.as_u16() == TOKEN_EXPIRED => {
                tracing::debug!("Access token expired, attempting refresh");
                let refreshed = self.refresh_auth_token().await?;
                // A failed refresh already cleared, unless no refresh token was held
                if !refreshed && self.token().is_some() {
                    self.clear_auth_data()?;
                }
                Ok(refreshed)
            }
            Ok(status) => {
                tracing::warn!(status = %status, "Token verification rejected");
                self.clear_auth_data()?;
                Ok(false)
            }
            Err(e) => {
                tracing::error!(error = %e, "Token verification failed");
                self.clear_auth_data()?;
                Ok(false)
            }
        }
    }

    // === Profile ===

    /// Fetch the current user. Any failure invalidates the whole session.
    pub async fn get_user_profile(&self) -> Result<Option<UserProfile>> {
        let Some(token) = self.token() else {
            return Ok(None);
        };

        match self.api.profile(&token).await {
            Ok(ApiResponse::Success(envelope)) => {
                self.store_user(envelope.user.clone())?;
                Ok(Some(envelope.user))
            }
            Ok(ApiResponse::Failure { status, .. }) => {
                tracing::warn!(status = %status, "Profile fetch rejected, clearing session");
                self.clear_auth_data()?;
                Ok(None)
            }
            Err(e) => {
                tracing::error!(error = %e, "Profile fetch failed, clearing session");
                self.clear_auth_data()?;
                Ok(None)
            }
        }
    }

    /// Update the profile. Unlike a failed fetch, a failed update keeps the
    /// session.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        let token = self.token().ok_or(AuthError::NotAuthenticated)?;

        check_email_format(&update.email)
            .into_result()
            .map_err(AuthError::InvalidEmail)?;
        if let Some(new_password) = update.new_password.as_deref() {
            validate_password(new_password)
                .into_result()
                .map_err(AuthError::WeakPassword)?;
        }

        let response = self
            .api
            .update_profile(&token, update)
            .await
            .map_err(|e| network_error("update_profile", e))?;

        match response {
            ApiResponse::Success(envelope) => {
                self.store_user(envelope.user.clone())?;
                tracing::info!("Profile updated");
                Ok(envelope.user)
            }
            ApiResponse::Failure { status, message } => {
                tracing::warn!(status = %status, "Profile update rejected");
                Err(AuthError::Rejected(
                    message.unwrap_or_else(|| "Profile update failed".to_string()),
                ))
            }
        }
    }

    // === Password recovery ===

    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        check_email_format(email)
            .into_result()
            .map_err(AuthError::InvalidEmail)?;

        let response = self
            .api
            .forgot_password(email)
            .await
            .map_err(|e| network_error("forgot_password", e))?;

        message_or_rejection(
            response,
            "Password reset instructions have been sent",
            "Failed to send reset email",
        )
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<String> {
        validate_password(new_password)
            .into_result()
            .map_err(AuthError::WeakPassword)?;

        let response = self
            .api
            .reset_password(token, new_password)
            .await
            .map_err(|e| network_error("reset_password", e))?;

        message_or_rejection(
            response,
            "Password has been reset",
            "Failed to reset password",
        )
    }
}

impl Clone for SessionManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            listeners: self.listeners.clone(),
            db: self.db.clone(),
            api: self.api.clone(),
        }
    }
}

fn load_state(db: &Database) -> Result<AuthState> {
    let token = db.get_entry(TOKEN_KEY)?.filter(|t| !t.is_empty());
    let refresh_token = db.get_entry(REFRESH_TOKEN_KEY)?.filter(|t| !t.is_empty());

    let user = match db.get_entry(USER_KEY)? {
        Some(json) => match serde_json::from_str::<UserProfile>(&json) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable stored user");
                None
            }
        },
        None => None,
    };

    Ok(AuthState {
        token,
        user,
        refresh_token,
    })
}

fn network_error(operation: &'static str, err: reqwest::Error) -> AuthError {
    tracing::error!(operation, error = %err, "Auth request failed");
    AuthError::Network(err)
}

fn message_or_rejection(
    response: ApiResponse<crate::api::MessageBody>,
    success: &str,
    fallback: &str,
) -> Result<String> {
    match response {
        ApiResponse::Success(body) => Ok(body.message.unwrap_or_else(|| success.to_string())),
        ApiResponse::Failure { status, message } => {
            tracing::warn!(status = %status, "Password recovery request rejected");
            Err(AuthError::Rejected(
                message.unwrap_or_else(|| fallback.to_string()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn manager(db: &Database) -> SessionManager {
        // Nothing in these tests reaches the network
        let api = AuthApi::new(Url::parse("http://127.0.0.1:9").unwrap());
        SessionManager::new(db.clone(), api).unwrap()
    }

    fn traveller() -> UserProfile {
        UserProfile {
            first_name: Some("Ana".to_string()),
            last_name: Some("Lima".to_string()),
            email: Some("ana@example.com".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_set_auth_data_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let manager = manager(&db);
        assert!(!manager.is_authenticated());

        manager
            .set_auth_data("tok".to_string(), traveller(), Some("ref".to_string()))
            .unwrap();

        assert!(manager.is_authenticated());
        assert_eq!(db.get_entry(TOKEN_KEY).unwrap().as_deref(), Some("tok"));
        assert_eq!(
            db.get_entry(REFRESH_TOKEN_KEY).unwrap().as_deref(),
            Some("ref")
        );
        let stored: UserProfile =
            serde_json::from_str(&db.get_entry(USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored, traveller());

        // A fresh manager over the same storage sees the same session
        let reloaded = self::manager(&db);
        assert_eq!(reloaded.session(), manager.session());
        assert_eq!(reloaded.auth_header().as_deref(), Some("Bearer tok"));
    }

    #[test]
    fn test_clear_auth_data_removes_everything() {
        let db = Database::open_in_memory().unwrap();
        let manager = manager(&db);
        manager
            .set_auth_data("tok".to_string(), traveller(), Some("ref".to_string()))
            .unwrap();

        manager.clear_auth_data().unwrap();

        assert!(!manager.is_authenticated());
        assert!(manager.session().is_none());
        for key in [TOKEN_KEY, USER_KEY, REFRESH_TOKEN_KEY] {
            assert_eq!(db.get_entry(key).unwrap(), None);
        }
    }

    #[test]
    fn test_access_token_only_session() {
        let db = Database::open_in_memory().unwrap();
        let manager = manager(&db);
        manager
            .set_auth_data("tok".to_string(), traveller(), Some("old".to_string()))
            .unwrap();
        manager
            .set_auth_data("tok2".to_string(), traveller(), None)
            .unwrap();

        assert!(manager.is_authenticated());
        assert_eq!(manager.refresh_token(), None);
        assert_eq!(db.get_entry(REFRESH_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_token_without_user_is_not_authenticated() {
        let db = Database::open_in_memory().unwrap();
        db.set_entry(TOKEN_KEY, "tok").unwrap();
        db.set_entry(USER_KEY, "{not json").unwrap();

        let manager = manager(&db);
        assert_eq!(manager.token().as_deref(), Some("tok"));
        assert!(manager.user().is_none());
        assert!(!manager.is_authenticated());
    }

    #[test]
    fn test_listeners_fire_after_write() {
        let db = Database::open_in_memory().unwrap();
        let manager = manager(&db);
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let observer = manager.clone();
        let log = Arc::clone(&seen);
        manager.on_state_change(move |change| {
            // Storage and mirror are already updated when listeners run
            log.lock()
                .push((change.authenticated, observer.is_authenticated()));
        });

        manager
            .set_auth_data("tok".to_string(), traveller(), None)
            .unwrap();
        manager.clear_auth_data().unwrap();

        assert_eq!(*seen.lock(), vec![(true, true), (false, false)]);
    }

    #[test]
    fn test_unsubscribed_listener_stops_receiving() {
        let db = Database::open_in_memory().unwrap();
        let manager = manager(&db);
        let calls = Arc::new(parking_lot::Mutex::new(0));

        let counter = Arc::clone(&calls);
        let id = manager.on_state_change(move |_| *counter.lock() += 1);
        assert_eq!(manager.listener_count(), 1);

        manager
            .set_auth_data("tok".to_string(), traveller(), None)
            .unwrap();
        assert!(manager.unsubscribe(id));
        assert!(!manager.unsubscribe(id));
        assert_eq!(manager.listener_count(), 0);

        manager.clear_auth_data().unwrap();
        assert_eq!(*calls.lock(), 1);
    }

    #[tokio::test]
    async fn test_no_refresh_token_skips_network() {
        let db = Database::open_in_memory().unwrap();
        let manager = manager(&db);
        manager
            .set_auth_data("tok".to_string(), traveller(), None)
            .unwrap();

        assert!(!manager.refresh_auth_token().await.unwrap());
        // Nothing to refresh with is not a failure; the session stays
        assert!(manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_signed_out_calls_short_circuit() {
        let db = Database::open_in_memory().unwrap();
        let manager = manager(&db);

        assert!(!manager.verify_token().await.unwrap());
        assert_eq!(manager.get_user_profile().await.unwrap(), None);
        assert!(matches!(
            manager.update_profile(&ProfileUpdate::default()).await,
            Err(AuthError::NotAuthenticated)
        ));
    }
}
