pub mod catalog;
pub mod checkout;
pub mod customers;
pub mod orders;
pub mod payments;

pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use customers::CustomerService;
pub use orders::OrderService;
