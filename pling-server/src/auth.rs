use std::collections::{HashMap, HashSet};
use std::time::Duration;

use axum::http::{header, HeaderMap, StatusCode};
use serde::Deserialize;
use thiserror::Error;

/// Identity returned by the provider for a valid credential.
#[derive(Debug, Clone)]
pub struct VerifiedUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Credential missing, malformed, expired, or unknown to the provider.
    #[error("missing or invalid credentials")]
    Invalid,
    /// The provider itself failed (network, non-auth HTTP error, bad body).
    #[error("identity provider request failed")]
    Provider(#[source] anyhow::Error),
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    email: Option<String>,
}

/// Credential verification collaborator.
///
/// `Http` talks to a Supabase-compatible auth endpoint; `Fixed` resolves
/// from a static token table and backs tests plus the unconfigured case
/// (empty table, every credential rejected).
#[derive(Debug, Clone)]
pub enum Verifier {
    Http {
        client: reqwest::Client,
        base_url: String,
        anon_key: String,
    },
    Fixed {
        tokens: HashMap<String, VerifiedUser>,
    },
}

impl Verifier {
    pub fn http(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self::Http {
            client,
            base_url: base_url.into(),
            anon_key: anon_key.into(),
        }
    }

    pub fn fixed(tokens: impl IntoIterator<Item = (String, VerifiedUser)>) -> Self {
        Self::Fixed {
            tokens: tokens.into_iter().collect(),
        }
    }

    /// Resolve a bearer token to a user identity.
    pub async fn verify(&self, token: &str) -> Result<VerifiedUser, AuthError> {
        match self {
            Self::Fixed { tokens } => tokens.get(token).cloned().ok_or(AuthError::Invalid),
            Self::Http {
                client,
                base_url,
                anon_key,
            } => {
                let response = client
                    .get(format!("{}/auth/v1/user", base_url.trim_end_matches('/')))
                    .header("apikey", anon_key)
                    .bearer_auth(token)
                    .send()
                    .await
                    .map_err(|e| AuthError::Provider(e.into()))?;

                match response.status() {
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::Invalid),
                    status if status.is_success() => {
                        let user: ProviderUser = response
                            .json()
                            .await
                            .map_err(|e| AuthError::Provider(e.into()))?;
                        Ok(VerifiedUser {
                            id: user.id,
                            email: user.email,
                        })
                    }
                    status => Err(AuthError::Provider(anyhow::anyhow!(
                        "identity provider returned {status}"
                    ))),
                }
            }
        }
    }
}

/// Authorization predicate: who may post notifications.
///
/// Matched against the verified user's id or email. An empty allowlist
/// authorizes everyone: no policy configured means no restriction.
#[derive(Debug, Default)]
pub struct AdminPolicy {
    admins: HashSet<String>,
}

impl AdminPolicy {
    /// Parse a comma-separated allowlist, e.g. the `ADMIN_USERS` env var.
    pub fn from_list(list: &str) -> Self {
        Self {
            admins: list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn is_authorized(&self, user: &VerifiedUser) -> bool {
        self.admins.is_empty()
            || self.admins.contains(&user.id)
            || user
                .email
                .as_deref()
                .is_some_and(|email| self.admins.contains(email))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
