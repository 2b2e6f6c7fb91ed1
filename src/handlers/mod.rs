pub mod common;
pub mod customers;
pub mod health;
pub mod orders;
pub mod products;

use sea_orm::DatabaseConnection;

use crate::auth::AuthService;
use crate::events::EventSender;
use crate::services::{CatalogService, CheckoutService, CustomerService, OrderService};

/// Service container shared by every handler through [`crate::AppState`].
#[derive(Clone)]
pub struct AppServices {
    pub auth: AuthService,
    pub checkout: CheckoutService,
    pub customers: CustomerService,
    pub orders: OrderService,
    pub catalog: CatalogService,
}

impl AppServices {
    pub fn new(db: DatabaseConnection, events: EventSender) -> Self {
        let auth = AuthService::new(db.clone());
        Self {
            checkout: CheckoutService::new(db.clone(), auth.clone(), events.clone()),
            customers: CustomerService::new(db.clone(), auth.clone(), events),
            orders: OrderService::new(db.clone()),
            catalog: CatalogService::new(db),
            auth,
        }
    }
}
