use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::instrument;
use uuid::Uuid;

use crate::entities::{product, product_image, Product};
use crate::errors::ServiceError;
use crate::services::orders::ProductResponse;

/// Read-only catalog projections.
#[derive(Clone)]
pub struct CatalogService {
    db: DatabaseConnection,
}

impl CatalogService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductResponse>, ServiceError> {
        let products = Product::find()
            .order_by_asc(product::Column::Name)
            .all(&self.db)
            .await?;
        self.with_images(products).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<ProductResponse, ServiceError> {
        let product = Product::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;
        let images = product
            .find_related(crate::entities::ProductImage)
            .order_by_asc(product_image::Column::SortOrder)
            .all(&self.db)
            .await?;
        Ok(ProductResponse::from_model(product, images))
    }

    #[instrument(skip(self))]
    pub async fn list_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<ProductResponse>, ServiceError> {
        let products = Product::find()
            .filter(product::Column::Category.eq(category))
            .order_by_asc(product::Column::Name)
            .all(&self.db)
            .await?;
        self.with_images(products).await
    }

    /// Distinct category names, alphabetical.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<String>, ServiceError> {
        let categories: Vec<String> = Product::find()
            .select_only()
            .column(product::Column::Category)
            .distinct()
            .order_by_asc(product::Column::Category)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(categories)
    }

    async fn with_images(
        &self,
        products: Vec<product::Model>,
    ) -> Result<Vec<ProductResponse>, ServiceError> {
        let mut responses = Vec::with_capacity(products.len());
        for product in products {
            let images = product
                .find_related(crate::entities::ProductImage)
                .order_by_asc(product_image::Column::SortOrder)
                .all(&self.db)
                .await?;
            responses.push(ProductResponse::from_model(product, images));
        }
        Ok(responses)
    }
}
