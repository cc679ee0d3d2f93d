use anyhow::{Context, Result};
use axum::{
    Json, RequestPartsExt,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{users::User, users_repo::UsersRepository, web::AppState};

/// How long an issued token stays valid.
const TOKEN_LIFETIME_DAYS: i64 = 7;

/// Token payload: enough to identify the account and short-circuit the
/// admin check without a lookup. Authorization still re-reads the user
/// row on every request so deactivated accounts lose access immediately.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    fn for_user(user: &User) -> Self {
        let now = Utc::now();
        Self {
            sub: user.id,
            email: user.email.clone(),
            is_admin: user.is_admin,
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_LIFETIME_DAYS)).timestamp(),
        }
    }
}

/// Signs and verifies logbook session tokens. Built once at startup and
/// shared through [`AppState`] so the secret is read a single time.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    pub fn from_env() -> Result<Self> {
        let secret =
            std::env::var("JWT_SECRET").context("JWT_SECRET environment variable not set")?;
        Ok(Self::new(&secret))
    }

    pub fn issue_token(&self, user: &User) -> Result<String> {
        encode(&Header::default(), &Claims::for_user(user), &self.encoding_key)
            .context("failed to sign session token")
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .context("session token rejected")?;
        Ok(data.claims)
    }
}

/// Any authenticated account.
#[derive(Debug)]
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::BearerMissing)?;

        let claims = state
            .jwt
            .verify_token(bearer.token())
            .map_err(|_| AuthError::TokenRejected)?;

        let user = UsersRepository::new(state.pool.clone())
            .get_by_id(claims.sub)
            .await
            .map_err(AuthError::Lookup)?
            .ok_or(AuthError::AccountGone)?;

        Ok(AuthUser(user))
    }
}

/// An authenticated account with the admin flag set.
#[derive(Debug)]
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if !user.is_admin {
            return Err(AuthError::AdminRequired);
        }

        Ok(AdminUser(user))
    }
}

#[derive(Debug)]
pub enum AuthError {
    BearerMissing,
    TokenRejected,
    AccountGone,
    AdminRequired,
    Lookup(anyhow::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::BearerMissing => (StatusCode::UNAUTHORIZED, "Authorization header required"),
            AuthError::TokenRejected => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::AccountGone => (StatusCode::UNAUTHORIZED, "Account no longer exists"),
            AuthError::AdminRequired => (StatusCode::FORBIDDEN, "Administrator access required"),
            AuthError::Lookup(e) => {
                tracing::error!(error = %e, "Failed to load account during authentication");
                (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed")
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(is_admin: bool) -> User {
        User::new(
            "Jan".to_string(),
            "Kowalski".to_string(),
            "jan@example.com".to_string(),
            "not-a-real-hash".to_string(),
            is_admin,
        )
    }

    #[test]
    fn test_token_round_trip() {
        let service = JwtService::new("test-secret");
        let user = account(true);

        let token = service.issue_token(&user).unwrap();
        let claims = service.verify_token(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "jan@example.com");
        assert!(claims.is_admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let issuer = JwtService::new("secret-a");
        let verifier = JwtService::new("secret-b");

        let token = issuer.issue_token(&account(false)).unwrap();
        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = JwtService::new("test-secret");
        assert!(service.verify_token("not.a.token").is_err());
    }
}
