// src/auth.rs
use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

const ACCESS_TTL_MINUTES: i64 = 60;
const REFRESH_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub token_type: TokenType,
    pub jti: Uuid,
    pub exp: i64,
}

#[derive(Debug)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issues and verifies the JWT session pair. The refresh token's `jti`
/// lands in the revocation table on logout; access tokens simply expire.
pub struct Sessions {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl Sessions {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::minutes(ACCESS_TTL_MINUTES),
            refresh_ttl: Duration::days(REFRESH_TTL_DAYS),
        }
    }

    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access: self.issue(user, TokenType::Access, self.access_ttl)?,
            refresh: self.issue(user, TokenType::Refresh, self.refresh_ttl)?,
        })
    }

    fn issue(&self, user: &User, token_type: TokenType, ttl: Duration) -> Result<String, AppError> {
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            token_type,
            jti: Uuid::new_v4(),
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|e| AppError::Auth {
            message: "Could not issue session tokens".to_string(),
            details: e.to_string(),
        })
    }

    /// Verify a bearer token presented on a protected endpoint.
    pub fn verify_access(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.verify(token).map_err(|_| AppError::Unauthorized)?;
        if claims.token_type != TokenType::Access {
            return Err(AppError::Unauthorized);
        }
        Ok(claims)
    }

    /// Verify the refresh token presented on logout.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.verify(token).map_err(|e| AppError::Auth {
            message: "Invalid token".to_string(),
            details: e.to_string(),
        })?;
        if claims.token_type != TokenType::Refresh {
            return Err(AppError::Auth {
                message: "Invalid token".to_string(),
                details: "refresh token required".to_string(),
            });
        }
        Ok(claims)
    }

    fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        Ok(decode::<Claims>(token, &self.decoding, &validation)?.claims)
    }
}

/// The authenticated caller, resolved from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        let claims = state.sessions.verify_access(token)?;
        Ok(CurrentUser {
            id: claims.sub,
            username: claims.username,
        })
    }
}
