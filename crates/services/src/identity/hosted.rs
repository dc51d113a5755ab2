use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use vocab_core::model::UserId;

use super::{AuthUser, IdentityProvider, LoginRequest, RegisterRequest};
use crate::error::IdentityError;

pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

#[derive(Clone)]
pub struct HostedIdentityConfig {
    pub base_url: String,
    pub api_key: String,
}

impl HostedIdentityConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_IDENTITY_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }
}

impl fmt::Debug for HostedIdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostedIdentityConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .finish()
    }
}

/// Identity provider backed by a hosted email/password REST API.
#[derive(Clone)]
pub struct HostedIdentityProvider {
    client: Client,
    config: HostedIdentityConfig,
}

impl HostedIdentityProvider {
    #[must_use]
    pub fn new(config: HostedIdentityConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn call<B, R>(&self, action: &str, body: &B) -> Result<R, IdentityError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!(
            "{}/v1/accounts:{action}",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => {
                tracing::debug!(%status, code = %envelope.error.message, "identity request rejected");
                Err(map_error_code(&envelope.error.message))
            }
            Err(_) => Err(IdentityError::HttpStatus(status)),
        }
    }
}

#[async_trait]
impl IdentityProvider for HostedIdentityProvider {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthUser, IdentityError> {
        let created: AccountResponse = self
            .call(
                "signUp",
                &CredentialsBody {
                    email: request.email.trim(),
                    password: &request.password,
                    return_secure_token: true,
                },
            )
            .await?;

        let Some(display_name) = request.display_name() else {
            return Ok(created.into_user());
        };

        let id_token = created.id_token.clone().unwrap_or_default();
        let updated: Result<AccountResponse, IdentityError> = self
            .call(
                "update",
                &ProfileBody {
                    id_token: &id_token,
                    display_name: &display_name,
                    return_secure_token: false,
                },
            )
            .await;

        // The account already exists at this point; a failed profile update leaves it nameless.
        match updated {
            Ok(updated) => Ok(AuthUser {
                display_name: updated.display_name.or(Some(display_name)),
                ..created.into_user()
            }),
            Err(err) => {
                tracing::warn!(%err, "display name update failed after sign-up");
                Ok(created.into_user())
            }
        }
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthUser, IdentityError> {
        let account: AccountResponse = self
            .call(
                "signInWithPassword",
                &CredentialsBody {
                    email: request.email.trim(),
                    password: &request.password,
                    return_secure_token: true,
                },
            )
            .await?;
        Ok(account.into_user())
    }
}

/// Provider error codes may carry a suffix, e.g. `WEAK_PASSWORD : Password should be ...`.
fn map_error_code(message: &str) -> IdentityError {
    let code = message.split([' ', ':']).next().unwrap_or_default();
    match code {
        "EMAIL_EXISTS" => IdentityError::EmailInUse,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            IdentityError::InvalidCredentials
        }
        "WEAK_PASSWORD" => IdentityError::WeakPassword {
            min: super::MIN_PASSWORD_LEN,
        },
        "INVALID_EMAIL" => IdentityError::InvalidEmail,
        "USER_DISABLED" => IdentityError::Disabled,
        _ => IdentityError::Provider(message.to_string()),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileBody<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

impl AccountResponse {
    fn into_user(self) -> AuthUser {
        AuthUser {
            uid: UserId::new(self.local_id),
            email: self.email,
            display_name: self.display_name.filter(|name| !name.trim().is_empty()),
            id_token: self.id_token,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> HostedIdentityProvider {
        HostedIdentityProvider::new(HostedIdentityConfig {
            base_url: server.uri(),
            api_key: "test-key".into(),
        })
    }

    fn error_response(message: &str) -> ResponseTemplate {
        ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": message }
        }))
    }

    #[test]
    fn error_codes_map_to_variants() {
        assert!(matches!(map_error_code("EMAIL_EXISTS"), IdentityError::EmailInUse));
        assert!(matches!(
            map_error_code("INVALID_LOGIN_CREDENTIALS"),
            IdentityError::InvalidCredentials
        ));
        assert!(matches!(
            map_error_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            IdentityError::WeakPassword { min: 6 }
        ));
        assert!(matches!(map_error_code("USER_DISABLED"), IdentityError::Disabled));
        assert!(matches!(
            map_error_code("TOO_MANY_ATTEMPTS_TRY_LATER"),
            IdentityError::Provider(ref m) if m == "TOO_MANY_ATTEMPTS_TRY_LATER"
        ));
    }

    #[test]
    fn config_debug_masks_api_key() {
        let rendered = format!("{:?}", HostedIdentityConfig::new("secret-key"));
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains(DEFAULT_IDENTITY_BASE_URL));
    }

    #[tokio::test]
    async fn login_returns_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "email": "dana@example.com",
                "returnSecureToken": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "localId": "uid-1",
                "email": "dana@example.com",
                "displayName": "Dana Levi",
                "idToken": "token-1",
                "registered": true
            })))
            .mount(&server)
            .await;

        let user = provider(&server)
            .login(&LoginRequest {
                email: " dana@example.com ".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();

        assert_eq!(user.uid, UserId::new("uid-1"));
        assert_eq!(user.display_name.as_deref(), Some("Dana Levi"));
        assert_eq!(user.id_token.as_deref(), Some("token-1"));
    }

    #[tokio::test]
    async fn login_maps_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .respond_with(error_response("INVALID_LOGIN_CREDENTIALS"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .login(&LoginRequest {
                email: "dana@example.com".into(),
                password: "wrong-pass".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::InvalidCredentials));
    }

    #[tokio::test]
    async fn register_sets_display_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signUp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "localId": "uid-2",
                "email": "new@example.com",
                "idToken": "token-2"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:update"))
            .and(body_partial_json(json!({
                "idToken": "token-2",
                "displayName": "Noa Cohen"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "localId": "uid-2",
                "email": "new@example.com",
                "displayName": "Noa Cohen"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let user = provider(&server)
            .register(&RegisterRequest {
                email: "new@example.com".into(),
                password: "secret1".into(),
                first_name: "Noa".into(),
                last_name: "Cohen".into(),
            })
            .await
            .unwrap();

        assert_eq!(user.uid, UserId::new("uid-2"));
        assert_eq!(user.display_name.as_deref(), Some("Noa Cohen"));
        assert_eq!(user.id_token.as_deref(), Some("token-2"));
    }

    #[tokio::test]
    async fn register_survives_profile_update_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signUp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "localId": "uid-9",
                "idToken": "t"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:update"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let user = provider(&server)
            .register(&RegisterRequest {
                email: "late@example.com".into(),
                password: "secret1".into(),
                first_name: "Avi".into(),
                last_name: "Levi".into(),
            })
            .await
            .unwrap();

        assert_eq!(user.uid, UserId::new("uid-9"));
        assert_eq!(user.id_token.as_deref(), Some("t"));
        assert_eq!(user.display_name, None);
    }

    #[tokio::test]
    async fn register_maps_email_in_use() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signUp"))
            .respond_with(error_response("EMAIL_EXISTS"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .register(&RegisterRequest {
                email: "taken@example.com".into(),
                password: "secret1".into(),
                first_name: String::new(),
                last_name: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::EmailInUse));
    }

    #[tokio::test]
    async fn non_json_failure_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .login(&LoginRequest {
                email: "dana@example.com".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::HttpStatus(s) if s.as_u16() == 503));
    }
}
