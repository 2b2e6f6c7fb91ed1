use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthService;
use crate::entities::customer::{self, CustomerType};
use crate::entities::Customer;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Canonical form of an email, applied before every storage and lookup so
/// the casing a customer types never decides whether the account is found.
pub(crate) fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Customer projection returned to clients; the password hash never
/// leaves the service layer.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub company_name: Option<String>,
    pub tax_id: Option<String>,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[schema(value_type = String)]
    pub customer_type: CustomerType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<customer::Model> for CustomerResponse {
    fn from(model: customer::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            phone: model.phone,
            company_name: model.company_name,
            tax_id: model.tax_id,
            address: model.address,
            city: model.city,
            postal_code: model.postal_code,
            country: model.country,
            customer_type: model.customer_type,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub customer: CustomerResponse,
    pub token: String,
}

/// Account-facing operations: login, current profile, logout.
#[derive(Clone)]
pub struct CustomerService {
    db: DatabaseConnection,
    auth: AuthService,
    events: EventSender,
}

impl CustomerService {
    pub fn new(db: DatabaseConnection, auth: AuthService, events: EventSender) -> Self {
        Self { db, auth, events }
    }

    /// Verifies email/password and mints a fresh token. Failures collapse
    /// to one generic error so callers cannot probe which addresses have
    /// accounts.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ServiceError> {
        let customer = Customer::find()
            .filter(customer::Column::Email.eq(normalize_email(&request.email)))
            .one(&self.db)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !self
            .auth
            .verify_password(&request.password, &customer.password_hash)?
        {
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.auth.issue_token(&self.db, customer.id).await?;
        info!(customer_id = %customer.id, "customer logged in");
        self.events.send(Event::CustomerLoggedIn(customer.id)).await;

        Ok(LoginResponse {
            customer: customer.into(),
            token,
        })
    }

    /// Revokes every token the customer holds.
    #[instrument(skip(self))]
    pub async fn logout(&self, customer_id: Uuid) -> Result<(), ServiceError> {
        let revoked = self.auth.revoke_all(customer_id).await?;
        info!(customer_id = %customer_id, revoked, "customer logged out");
        self.events.send(Event::CustomerLoggedOut(customer_id)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_normalize_to_trimmed_lowercase() {
        assert_eq!(normalize_email("Case@Example.com"), "case@example.com");
        assert_eq!(normalize_email("  jane@example.com "), "jane@example.com");
        assert_eq!(normalize_email("plain@example.com"), "plain@example.com");
    }
}
