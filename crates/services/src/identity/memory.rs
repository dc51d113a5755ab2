use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;
use vocab_core::model::UserId;

use super::{AuthUser, IdentityProvider, LoginRequest, RegisterRequest};
use crate::error::IdentityError;

struct Account {
    uid: UserId,
    email: String,
    password: String,
    display_name: Option<String>,
}

impl Account {
    fn to_user(&self) -> AuthUser {
        AuthUser {
            uid: self.uid.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            id_token: None,
        }
    }
}

/// Process-local accounts keyed by lowercased email.
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
}

impl InMemoryIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn account_key(email: &str) -> String {
    email.trim().to_lowercase()
}

fn poisoned<T>(_: T) -> IdentityError {
    IdentityError::Provider("account store lock poisoned".into())
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthUser, IdentityError> {
        let mut accounts = self.accounts.lock().map_err(poisoned)?;
        let key = account_key(&request.email);
        if accounts.contains_key(&key) {
            return Err(IdentityError::EmailInUse);
        }

        let account = Account {
            uid: UserId::new(Uuid::new_v4().to_string()),
            email: request.email.trim().to_string(),
            password: request.password.clone(),
            display_name: request.display_name(),
        };
        let user = account.to_user();
        accounts.insert(key, account);
        Ok(user)
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthUser, IdentityError> {
        let accounts = self.accounts.lock().map_err(poisoned)?;
        match accounts.get(&account_key(&request.email)) {
            Some(account) if account.password == request.password => Ok(account.to_user()),
            _ => Err(IdentityError::InvalidCredentials),
        }
    }
}
