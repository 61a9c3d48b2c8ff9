use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::config::Config;
use crate::error::{Error, Result};

/// Header the Whop proxy uses to forward the signed user token.
pub const USER_TOKEN_HEADER: &str = "x-whop-user-token";

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("request carries no user token")]
    MissingToken,

    #[error("user token header is not valid UTF-8")]
    MalformedHeader,

    #[error("user token verification is not configured")]
    NotConfigured,

    #[error("user token rejected: {0}")]
    Rejected(#[from] jsonwebtoken::errors::Error),

    #[error("user token has an empty subject")]
    EmptySubject,
}

/// Turns request credentials into a Whop user id.
#[cfg_attr(test, mockall::automock)]
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, headers: &HeaderMap) -> std::result::Result<String, IdentityError>;
}

/// Collapses every verification failure to "no identity".
pub fn resolve_user_id(verifier: &dyn IdentityVerifier, headers: &HeaderMap) -> Option<String> {
    match verifier.verify(headers) {
        Ok(user_id) => Some(user_id),
        Err(IdentityError::MissingToken) => {
            tracing::debug!("request carries no user token");
            None
        }
        Err(err) => {
            tracing::warn!(error = %err, "user token validation failed");
            None
        }
    }
}

/// Whose profile or access is being looked up.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    /// An explicit user id.
    User(&'a str),
    /// Whoever the request's credentials identify.
    Request(&'a HeaderMap),
}

impl Subject<'_> {
    pub fn user_id(&self, verifier: &dyn IdentityVerifier) -> Option<String> {
        match self {
            Subject::User(id) => Some(id.trim())
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            Subject::Request(headers) => resolve_user_id(verifier, headers),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserTokenClaims {
    sub: String,
}

/// Validates the ES256 token the Whop proxy attaches to every app request.
pub struct WhopTokenVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl WhopTokenVerifier {
    pub fn new(public_key_pem: Option<&str>, issuer: &str, app_id: Option<&str>) -> Result<Self> {
        let key = match public_key_pem {
            Some(pem) => Some(DecodingKey::from_ec_pem(pem.as_bytes()).map_err(|e| {
                Error::Config(format!("Invalid WHOP_TOKEN_PUBLIC_KEY: {}", e))
            })?),
            None => {
                tracing::warn!(
                    "WHOP_TOKEN_PUBLIC_KEY not set; every request will be treated as unauthenticated"
                );
                None
            }
        };

        let mut validation = Validation::new(Algorithm::ES256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        match app_id {
            Some(app_id) => validation.set_audience(&[app_id]),
            None => validation.validate_aud = false,
        }

        Ok(Self { key, validation })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.whop_token_public_key.as_deref(),
            &config.whop_token_issuer,
            config.whop_app_id.as_deref(),
        )
    }
}

impl IdentityVerifier for WhopTokenVerifier {
    fn verify(&self, headers: &HeaderMap) -> std::result::Result<String, IdentityError> {
        let raw = headers
            .get(USER_TOKEN_HEADER)
            .ok_or(IdentityError::MissingToken)?;
        let token = raw
            .to_str()
            .map_err(|_| IdentityError::MalformedHeader)?
            .trim();
        if token.is_empty() {
            return Err(IdentityError::MissingToken);
        }

        let key = self.key.as_ref().ok_or(IdentityError::NotConfigured)?;
        let data = decode::<UserTokenClaims>(token, key, &self.validation)?;

        let user_id = data.claims.sub.trim().to_string();
        if user_id.is_empty() {
            return Err(IdentityError::EmptySubject);
        }
        Ok(user_id)
    }
}
