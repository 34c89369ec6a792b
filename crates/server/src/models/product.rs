//! Product model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use frechnel_core::{CategoryId, ProductId};

use super::Category;

/// A catalog product.
///
/// The JSON shape embeds the owning [`Category`] alongside `categoryId`,
/// matching what the shop and admin UIs consume. `pricePromo` is only ever
/// non-null when `isPromo` is true.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: String,
    pub price_original: Decimal,
    pub price_promo: Option<Decimal>,
    pub is_promo: bool,
    pub in_stock: bool,
    pub is_new: bool,
    pub is_best_seller: bool,
    pub category_id: CategoryId,
    pub category: Category,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use frechnel_core::Slug;

    use super::*;

    #[test]
    fn test_product_serializes_camel_case() {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let product = Product {
            id: ProductId::new(5),
            name: "Test Hoodie".to_string(),
            description: None,
            image_url: "https://example.com/a.jpg".to_string(),
            price_original: Decimal::new(10_000, 0),
            price_promo: None,
            is_promo: false,
            in_stock: true,
            is_new: true,
            is_best_seller: false,
            category_id: CategoryId::new(1),
            category: Category {
                id: CategoryId::new(1),
                name: "Hoodies".to_string(),
                slug: Slug::derive("Hoodies").unwrap(),
            },
            created_at: created,
            updated_at: created,
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["imageUrl"], "https://example.com/a.jpg");
        assert_eq!(json["isBestSeller"], false);
        assert_eq!(json["inStock"], true);
        assert_eq!(json["categoryId"], 1);
        assert_eq!(json["category"]["slug"], "hoodies");
        assert!(json["pricePromo"].is_null());
        assert!(json.get("price_original").is_none());
    }
}
