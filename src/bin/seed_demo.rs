//! Seeds the catalog with demo products and images so a fresh database
//! has something to browse and check out against. Safe to re-run: it
//! does nothing once any product exists.

use anyhow::Context;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use serde_json::json;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use storefront_api::entities::{product, product_image, Product};
use storefront_api::{config, db};

struct DemoProduct {
    name: &'static str,
    category: &'static str,
    price: &'static str,
    rating: &'static str,
    description: &'static str,
    sizes: &'static [&'static str],
    colors: &'static [&'static str],
    images: &'static [&'static str],
}

const DEMO_PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        name: "Wool Sweater",
        category: "sweaters",
        price: "49.99",
        rating: "4.5",
        description: "Heavy merino knit for cold days.",
        sizes: &["S", "M", "L", "XL"],
        colors: &["charcoal", "cream"],
        images: &["/images/wool-sweater-front.jpg", "/images/wool-sweater-back.jpg"],
    },
    DemoProduct {
        name: "Linen Shirt",
        category: "shirts",
        price: "29.50",
        rating: "4.2",
        description: "Breathable linen, relaxed cut.",
        sizes: &["S", "M", "L"],
        colors: &["white", "sky blue"],
        images: &["/images/linen-shirt.jpg"],
    },
    DemoProduct {
        name: "Oxford Shirt",
        category: "shirts",
        price: "39.00",
        rating: "4.7",
        description: "Classic button-down oxford.",
        sizes: &["M", "L", "XL"],
        colors: &["white", "navy"],
        images: &["/images/oxford-shirt.jpg"],
    },
    DemoProduct {
        name: "Cashmere Scarf",
        category: "accessories",
        price: "19.99",
        rating: "4.8",
        description: "Soft two-tone cashmere scarf.",
        sizes: &[],
        colors: &["grey", "burgundy"],
        images: &["/images/cashmere-scarf.jpg"],
    },
    DemoProduct {
        name: "Leather Belt",
        category: "accessories",
        price: "24.00",
        rating: "4.4",
        description: "Full-grain leather, brass buckle.",
        sizes: &["90", "100", "110"],
        colors: &["brown", "black"],
        images: &["/images/leather-belt.jpg"],
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::load_config().context("failed to load configuration")?;
    config::init_tracing(app_config.log_level(), app_config.log_json);

    let db = db::establish_connection_from_app_config(&app_config)
        .await
        .context("failed to connect to the database")?;
    db::run_migrations(&db).await?;

    let existing = Product::find().count(&db).await?;
    if existing > 0 {
        info!(existing, "catalog already has products; nothing to seed");
        return Ok(());
    }

    let now = Utc::now();
    for demo in DEMO_PRODUCTS {
        let inserted = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(demo.name.to_string()),
            category: Set(demo.category.to_string()),
            price: Set(Decimal::from_str(demo.price)?),
            description: Set(demo.description.to_string()),
            rating: Set(Decimal::from_str(demo.rating)?),
            sizes: Set(json!(demo.sizes)),
            colors: Set(json!(demo.colors)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await?;

        for (sort_order, url) in demo.images.iter().enumerate() {
            product_image::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(inserted.id),
                url: Set((*url).to_string()),
                alt_text: Set(Some(demo.name.to_string())),
                sort_order: Set(sort_order as i32),
            }
            .insert(&db)
            .await?;
        }

        info!(name = demo.name, "seeded product");
    }

    info!(count = DEMO_PRODUCTS.len(), "demo catalog seeded");
    Ok(())
}
