use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder,
};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{
    order, order_item, product, product_image, Order, Product,
};
use crate::entities::order::{DeliveryMethod, OrderStatus, PaymentMethod};
use crate::errors::ServiceError;

/// Product projection embedded in order items and catalog responses.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub description: String,
    pub rating: Decimal,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub images: Vec<ProductImageResponse>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ProductImageResponse {
    pub id: Uuid,
    pub url: String,
    pub alt_text: Option<String>,
    pub sort_order: i32,
}

impl From<product_image::Model> for ProductImageResponse {
    fn from(image: product_image::Model) -> Self {
        Self {
            id: image.id,
            url: image.url,
            alt_text: image.alt_text,
            sort_order: image.sort_order,
        }
    }
}

impl ProductResponse {
    pub fn from_model(product: product::Model, images: Vec<product_image::Model>) -> Self {
        Self {
            id: product.id,
            name: product.name,
            category: product.category,
            price: product.price,
            description: product.description,
            rating: product.rating,
            sizes: serde_json::from_value(product.sizes).unwrap_or_default(),
            colors: serde_json::from_value(product.colors).unwrap_or_default(),
            images: images.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
    /// The referenced product as it exists now; unit_price above is the
    /// price copied at order time.
    pub product: Option<ProductResponse>,
}

/// Fully loaded order aggregate returned by checkout and order history.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    #[schema(value_type = String)]
    pub status: OrderStatus,
    #[schema(value_type = String)]
    pub payment_method: PaymentMethod,
    #[schema(value_type = String)]
    pub delivery_method: DeliveryMethod,
    pub delivery_price: Decimal,
    pub total_amount: Decimal,
    #[schema(value_type = Object)]
    pub billing_address: serde_json::Value,
    #[schema(value_type = Object)]
    pub shipping_address: serde_json::Value,
    #[schema(value_type = Object)]
    pub payment_details: serde_json::Value,
    pub order_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

/// Loads an order with its items, each item's product, and the product
/// images.
pub(crate) async fn load_order_graph<C: ConnectionTrait>(
    conn: &C,
    order: order::Model,
) -> Result<OrderResponse, ServiceError> {
    let items = order
        .find_related(crate::entities::OrderItem)
        .order_by_asc(order_item::Column::CreatedAt)
        .all(conn)
        .await?;

    let mut item_responses = Vec::with_capacity(items.len());
    for item in items {
        let product = Product::find_by_id(item.product_id).one(conn).await?;
        let product_response = match product {
            Some(product) => {
                let images = product
                    .find_related(crate::entities::ProductImage)
                    .order_by_asc(product_image::Column::SortOrder)
                    .all(conn)
                    .await?;
                Some(ProductResponse::from_model(product, images))
            }
            None => None,
        };
        item_responses.push(OrderItemResponse {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            selected_size: item.selected_size,
            selected_color: item.selected_color,
            product: product_response,
        });
    }

    Ok(OrderResponse {
        id: order.id,
        order_number: order.order_number,
        customer_id: order.customer_id,
        status: order.status,
        payment_method: order.payment_method,
        delivery_method: order.delivery_method,
        delivery_price: order.delivery_price,
        total_amount: order.total_amount,
        billing_address: order.billing_address,
        shipping_address: order.shipping_address,
        payment_details: order.payment_details,
        order_date: order.order_date,
        created_at: order.created_at,
        items: item_responses,
    })
}

/// Read side of order history: listing and ownership-checked fetch.
#[derive(Clone)]
pub struct OrderService {
    db: DatabaseConnection,
}

impl OrderService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All orders of a customer, newest first, fully loaded.
    #[instrument(skip(self))]
    pub async fn list_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<OrderResponse>, ServiceError> {
        let orders = Order::find()
            .filter(order::Column::CustomerId.eq(customer_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut responses = Vec::with_capacity(orders.len());
        for order in orders {
            responses.push(load_order_graph(&self.db, order).await?);
        }
        Ok(responses)
    }

    /// Fetches one order, returning 404 for unknown ids and 403 when the
    /// order belongs to a different customer.
    #[instrument(skip(self))]
    pub async fn get_for_customer(
        &self,
        order_id: Uuid,
        customer_id: Uuid,
    ) -> Result<OrderResponse, ServiceError> {
        let order = Order::find_by_id(order_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        if order.customer_id != customer_id {
            return Err(ServiceError::Forbidden(
                "You do not have access to this order".to_string(),
            ));
        }

        load_order_graph(&self.db, order).await
    }
}
