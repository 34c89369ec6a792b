//! Category model.

use serde::Serialize;

use frechnel_core::{CategoryId, Slug};

/// A product category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
}

/// A category annotated with its live product count, as returned by the
/// category listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub product_count: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_with_count_flattens() {
        let annotated = CategoryWithCount {
            category: Category {
                id: CategoryId::new(1),
                name: "Hoodies".to_string(),
                slug: Slug::derive("Hoodies").unwrap(),
            },
            product_count: 4,
        };

        let json = serde_json::to_value(&annotated).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["name"], "Hoodies");
        assert_eq!(json["slug"], "hoodies");
        assert_eq!(json["productCount"], 4);
    }
}
