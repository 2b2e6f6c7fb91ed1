use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, Set,
};
use sha2::{Digest, Sha256};
use tracing::instrument;
use uuid::Uuid;

use crate::entities::{access_token, customer, AccessToken};
use crate::errors::ServiceError;
use crate::AppState;

/// Length of the random part of an issued bearer token
const TOKEN_LENGTH: usize = 48;

/// Issues and verifies opaque bearer tokens and password hashes.
///
/// Tokens are returned to the client in plaintext exactly once; only a
/// SHA-256 digest is stored, so a database leak does not leak usable
/// credentials.
#[derive(Clone)]
pub struct AuthService {
    db: DatabaseConnection,
}

impl AuthService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Hashes a password for storage using Argon2id with a fresh salt
    pub fn hash_password(&self, password: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ServiceError::HashError(e.to_string()))
    }

    /// Verifies a candidate password against a stored hash
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, ServiceError> {
        let parsed =
            PasswordHash::new(stored_hash).map_err(|e| ServiceError::HashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Mints a new token for a customer and returns its plaintext form.
    ///
    /// Generic over the connection so checkout can mint inside its
    /// transaction.
    pub async fn issue_token<C: ConnectionTrait>(
        &self,
        conn: &C,
        customer_id: Uuid,
    ) -> Result<String, ServiceError> {
        let plaintext: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();

        let token = access_token::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(customer_id),
            token_hash: Set(digest(&plaintext)),
            created_at: Set(Utc::now()),
            last_used_at: Set(None),
        };
        token.insert(conn).await?;

        Ok(plaintext)
    }

    /// Resolves a bearer token to its customer, touching last_used_at
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> Result<customer::Model, ServiceError> {
        let record = AccessToken::find()
            .filter(access_token::Column::TokenHash.eq(digest(token)))
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::Unauthenticated("Invalid or expired token".to_string()))?;

        let customer = record
            .find_related(customer::Entity)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::Unauthenticated("Invalid or expired token".to_string()))?;

        let mut touched: access_token::ActiveModel = record.into();
        touched.last_used_at = Set(Some(Utc::now()));
        touched.update(&self.db).await?;

        Ok(customer)
    }

    /// Deletes every token belonging to a customer
    pub async fn revoke_all(&self, customer_id: Uuid) -> Result<u64, ServiceError> {
        let result = AccessToken::delete_many()
            .filter(access_token::Column::CustomerId.eq(customer_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Extractor that requires a valid bearer token on the request
#[derive(Clone, Debug)]
pub struct AuthenticatedCustomer(pub customer::Model);

impl<S> FromRequestParts<S> for AuthenticatedCustomer
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ServiceError::Unauthenticated("Missing bearer token".to_string()))?;

        let app_state = AppState::from_ref(state);
        let customer = app_state.services.auth.authenticate(&token).await?;
        Ok(AuthenticatedCustomer(customer))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let rest = header.strip_prefix("Bearer ").or_else(|| header.strip_prefix("bearer "))?;
    let trimmed = rest.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = axum::http::Request::builder().uri("/orders");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(
            bearer_token(&parts_with_auth(Some("Bearer abc123"))),
            Some("abc123".to_string())
        );
        assert_eq!(
            bearer_token(&parts_with_auth(Some("bearer abc123"))),
            Some("abc123".to_string())
        );
        assert_eq!(bearer_token(&parts_with_auth(Some("Basic abc123"))), None);
        assert_eq!(bearer_token(&parts_with_auth(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts_with_auth(None)), None);
    }

    #[test]
    fn digest_is_stable_and_hex() {
        let d = digest("token-value");
        assert_eq!(d.len(), 64);
        assert_eq!(d, digest("token-value"));
        assert_ne!(d, digest("token-valuf"));
    }
}
