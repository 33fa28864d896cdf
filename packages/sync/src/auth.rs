//! Authentication session and providers.
//!
//! The session is a read-only snapshot. Components ask the provider for it
//! on every operation; only `login`, `register` and `logout` replace it.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};
use crate::models::UserId;
use crate::transport::{ApiRequest, Transport, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Author,
}

impl Role {
    /// Anything other than `admin` is a regular author
    pub fn from_claim(claim: Option<&str>) -> Self {
        match claim {
            Some(role) if role.eq_ignore_ascii_case("admin") => Role::Admin,
            _ => Role::Author,
        }
    }
}

/// Snapshot of the logged-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user_id: UserId,
    pub role: Role,
    pub username: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    id: UserId,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default, rename = "firstName")]
    first_name: Option<String>,
    #[serde(default, rename = "lastName")]
    last_name: Option<String>,
}

impl AuthSession {
    /// Build a session from a JWT.
    ///
    /// Only the payload is decoded; the signature is the server's concern.
    pub fn from_token(token: &str) -> SyncResult<Self> {
        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| SyncError::Decode("Token is not a JWT".to_string()))?;

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| SyncError::Decode(format!("Token payload is not base64: {}", e)))?;

        let claims: Claims = serde_json::from_slice(&bytes)
            .map_err(|e| SyncError::Decode(format!("Token payload is invalid: {}", e)))?;

        let display_name = match (claims.first_name, claims.last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(name), None) | (None, Some(name)) => Some(name),
            (None, None) => None,
        };

        Ok(Self {
            token: token.to_string(),
            user_id: claims.id,
            role: Role::from_claim(claims.role.as_deref()),
            username: claims.username,
            display_name,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// New account details, sent as-is to `/user/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    #[serde(rename = "fname")]
    pub first_name: String,
    #[serde(rename = "lname")]
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Source of the current auth session
#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn current_session(&self) -> Option<AuthSession>;

    async fn login(&self, email: &str, password: &str) -> SyncResult<AuthSession>;

    /// Create an account.
    ///
    /// Returns the new session when the server answers with a token;
    /// otherwise the caller still has to log in.
    async fn register(&self, registration: &Registration) -> SyncResult<Option<AuthSession>>;

    /// Clear the session. The local session is gone even if this fails.
    async fn logout(&self) -> SyncResult<()>;
}

#[derive(Debug, Default)]
struct SessionSlot(RwLock<Option<AuthSession>>);

impl SessionSlot {
    fn get(&self) -> Option<AuthSession> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set(&self, session: Option<AuthSession>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = session;
    }
}

/// Provider with a fixed session, e.g. a token from configuration
#[derive(Debug, Default)]
pub struct StaticAuthProvider {
    session: SessionSlot,
}

impl StaticAuthProvider {
    pub fn new(session: Option<AuthSession>) -> Self {
        Self {
            session: SessionSlot(RwLock::new(session)),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(None)
    }

    pub fn from_token(token: &str) -> SyncResult<Self> {
        Ok(Self::new(Some(AuthSession::from_token(token)?)))
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    fn current_session(&self) -> Option<AuthSession> {
        self.session.get()
    }

    async fn login(&self, _email: &str, _password: &str) -> SyncResult<AuthSession> {
        Err(SyncError::LoginRejected(
            "Static credentials cannot log in".to_string(),
        ))
    }

    async fn register(&self, _registration: &Registration) -> SyncResult<Option<AuthSession>> {
        Err(SyncError::RegistrationRejected(
            "Static credentials cannot register".to_string(),
        ))
    }

    async fn logout(&self) -> SyncResult<()> {
        self.session.set(None);
        Ok(())
    }
}

/// Provider that logs in against `/user/login`
pub struct ApiAuthProvider {
    transport: Arc<dyn Transport>,
    session: SessionSlot,
}

impl ApiAuthProvider {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            session: SessionSlot::default(),
        }
    }

    /// Resume from a previously stored token
    pub fn with_token(transport: Arc<dyn Transport>, token: &str) -> SyncResult<Self> {
        let provider = Self::new(transport);
        provider.session.set(Some(AuthSession::from_token(token)?));
        Ok(provider)
    }
}

#[async_trait]
impl AuthProvider for ApiAuthProvider {
    fn current_session(&self) -> Option<AuthSession> {
        self.session.get()
    }

    async fn login(&self, email: &str, password: &str) -> SyncResult<AuthSession> {
        debug!(email = %email, "Logging in");

        let request = ApiRequest::post("/user/login").json(json!({
            "email": email,
            "password": password,
        }));

        let response = self.transport.request(request).await.map_err(|err| match err {
            TransportError::Http { message, .. } => SyncError::LoginRejected(message),
            other => SyncError::from(other),
        })?;

        let Some(token) = response.get("data").and_then(|data| data.as_str()) else {
            let message = response
                .get("message")
                .and_then(|message| message.as_str())
                .unwrap_or("Login failed");
            warn!(email = %email, error = %message, "Login rejected");
            return Err(SyncError::LoginRejected(message.to_string()));
        };

        let session = AuthSession::from_token(token)?;
        self.session.set(Some(session.clone()));

        info!(user_id = %session.user_id, role = ?session.role, "Logged in");
        Ok(session)
    }

    async fn register(&self, registration: &Registration) -> SyncResult<Option<AuthSession>> {
        debug!(email = %registration.email, "Registering");

        let request = ApiRequest::post("/user/register").json(serde_json::to_value(registration)?);

        let response = self.transport.request(request).await.map_err(|err| match err {
            TransportError::Http { message, .. } => SyncError::RegistrationRejected(message),
            other => SyncError::from(other),
        })?;

        // Servers answer with either a token or the created user record
        let session = match response.get("data").and_then(|data| data.as_str()) {
            Some(token) => {
                let session = AuthSession::from_token(token)?;
                self.session.set(Some(session.clone()));
                Some(session)
            }
            None => None,
        };

        info!(
            email = %registration.email,
            logged_in = session.is_some(),
            "Registered"
        );
        Ok(session)
    }

    async fn logout(&self) -> SyncResult<()> {
        let bearer = self.current_session().map(|session| session.token);
        self.session.set(None);

        let request = ApiRequest::post("/user/logout").bearer(bearer);
        match self.transport.request(request).await {
            Ok(_) => {
                info!("Logged out");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Logout request failed, local session cleared anyway");
                Err(err.into())
            }
        }
    }
}
