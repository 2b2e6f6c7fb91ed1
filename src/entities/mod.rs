pub mod access_token;
pub mod customer;
pub mod order;
pub mod order_item;
pub mod product;
pub mod product_image;

pub use access_token::Entity as AccessToken;
pub use customer::Entity as Customer;
pub use order::Entity as Order;
pub use order_item::Entity as OrderItem;
pub use product::Entity as Product;
pub use product_image::Entity as ProductImage;

pub type CustomerModel = customer::Model;
pub type OrderModel = order::Model;
pub type OrderItemModel = order_item::Model;
pub type ProductModel = product::Model;
pub type ProductImageModel = product_image::Model;
