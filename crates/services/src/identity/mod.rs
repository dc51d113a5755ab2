//! Account registration, login, and observation of the signed-in user.

mod hosted;
mod memory;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use vocab_core::model::UserId;

use crate::error::IdentityError;

pub use hosted::{DEFAULT_IDENTITY_BASE_URL, HostedIdentityConfig, HostedIdentityProvider};
pub use memory::InMemoryIdentityProvider;

/// Minimum password length accepted by the hosted provider.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A signed-in user as reported by the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: UserId,
    pub email: String,
    pub display_name: Option<String>,
    /// Provider session token, when the provider issues one.
    pub id_token: Option<String>,
}

impl fmt::Debug for AuthUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthUser")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("id_token", &self.id_token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterRequest {
    /// "First Last", or `None` when both names are blank.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        let joined = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let joined = joined.trim();
        (!joined.is_empty()).then(|| joined.to_string())
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

#[derive(Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Contract for a remote (or local) identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` when the provider rejects the account.
    async fn register(&self, request: &RegisterRequest) -> Result<AuthUser, IdentityError>;

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidCredentials` for unknown accounts or wrong passwords.
    async fn login(&self, request: &LoginRequest) -> Result<AuthUser, IdentityError>;

    /// End the provider session. Token-based providers have nothing to revoke.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` if the provider fails to end the session.
    async fn logout(&self, _user: &AuthUser) -> Result<(), IdentityError> {
        Ok(())
    }
}

pub(crate) fn validate_email(email: &str) -> Result<(), IdentityError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace) =>
        {
            Ok(())
        }
        _ => Err(IdentityError::InvalidEmail),
    }
}

pub(crate) fn validate_password(password: &str) -> Result<(), IdentityError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(IdentityError::WeakPassword {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Owns the signed-in user and lets observers follow changes to it.
pub struct IdentityService {
    provider: Arc<dyn IdentityProvider>,
    current: watch::Sender<Option<AuthUser>>,
}

impl IdentityService {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (current, _) = watch::channel(None);
        Self { provider, current }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryIdentityProvider::new()))
    }

    #[must_use]
    pub fn current_user(&self) -> Option<AuthUser> {
        self.current.borrow().clone()
    }

    /// Receiver that observes every sign-in and sign-out.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.current.subscribe()
    }

    /// Register a new account and make it the current user.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidEmail` / `WeakPassword` before contacting the
    /// provider, or the provider's error.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthUser, IdentityError> {
        validate_email(&request.email)?;
        validate_password(&request.password)?;

        let user = self.provider.register(request).await?;
        tracing::info!(uid = %user.uid, "account registered");
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }

    /// Sign in and make the account the current user.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidEmail` for malformed input, or the provider's error.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthUser, IdentityError> {
        validate_email(&request.email)?;

        let user = self.provider.login(request).await?;
        tracing::info!(uid = %user.uid, "signed in");
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }

    /// Sign out the current user, if any.
    ///
    /// # Errors
    ///
    /// Returns the provider's error; the local user is cleared either way.
    pub async fn logout(&self) -> Result<(), IdentityError> {
        let Some(user) = self.current.send_replace(None) else {
            return Ok(());
        };
        tracing::info!(uid = %user.uid, "signed out");
        self.provider.logout(&user).await
    }
}
