//! Product repository for database operations.
//!
//! Listing uses a dynamically built query (`sqlx::QueryBuilder`) because the
//! filter is an arbitrary conjunction over category and flag predicates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use frechnel_core::{CategoryId, ProductId, Slug};

use super::RepositoryError;
use crate::models::{Category, Product};

/// Columns selected for every product read, with the owning category joined in.
const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.image_url, \
     p.price_original, p.price_promo, p.is_promo, p.in_stock, p.is_new, \
     p.is_best_seller, p.category_id, p.created_at, p.updated_at, \
     c.name AS category_name, c.slug AS category_slug";

/// Conjunctive filter for product listings. Empty filter matches everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    pub promo_only: bool,
    pub new_only: bool,
    pub best_seller_only: bool,
}

/// Field set for product inserts and updates.
#[derive(Debug)]
pub struct ProductWrite<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub image_url: &'a str,
    pub price_original: Decimal,
    pub price_promo: Option<Decimal>,
    pub is_promo: bool,
    pub in_stock: bool,
    pub is_new: bool,
    pub is_best_seller: bool,
    pub category_id: CategoryId,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: Option<String>,
    image_url: String,
    price_original: Decimal,
    price_promo: Option<Decimal>,
    is_promo: bool,
    in_stock: bool,
    is_new: bool,
    is_best_seller: bool,
    category_id: CategoryId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_name: String,
    category_slug: String,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, RepositoryError> {
        let slug = Slug::parse(&self.category_slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid slug in database: {e}"))
        })?;

        Ok(Product {
            id: self.id,
            name: self.name,
            description: self.description,
            image_url: self.image_url,
            price_original: self.price_original,
            price_promo: self.price_promo,
            is_promo: self.is_promo,
            in_stock: self.in_stock,
            is_new: self.is_new,
            is_best_seller: self.is_best_seller,
            category_id: self.category_id,
            category: Category {
                id: self.category_id,
                name: self.category_name,
                slug,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Append the filter conjunction to a query ending in `FROM product p ...`.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    let mut separator = " WHERE ";
    if let Some(category_id) = filter.category_id {
        builder.push(separator).push("p.category_id = ").push_bind(category_id);
        separator = " AND ";
    }
    if filter.promo_only {
        builder.push(separator).push("p.is_promo = TRUE");
        separator = " AND ";
    }
    if filter.new_only {
        builder.push(separator).push("p.is_new = TRUE");
        separator = " AND ";
    }
    if filter.best_seller_only {
        builder.push(separator).push("p.is_best_seller = TRUE");
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching `filter`, newest first, with offset pagination.
    ///
    /// Returns the page of products and the total size of the filtered set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored slug is invalid.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM product p");
        push_filter(&mut count_builder, filter);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);
        let mut builder = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM product p JOIN category c ON c.id = p.category_id"
        ));
        push_filter(&mut builder, filter);
        builder
            .push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = builder
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool)
            .await?;

        let products = rows
            .into_iter()
            .map(ProductRow::into_product)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((products, total))
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product p \
             JOIN category c ON c.id = p.category_id WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Insert a new product and return it with its category joined in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the referenced category does
    /// not exist (foreign key backstop; handlers validate first).
    pub async fn create(&self, write: &ProductWrite<'_>) -> Result<Product, RepositoryError> {
        let id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO product
                (name, description, image_url, price_original, price_promo,
                 is_promo, in_stock, is_new, is_best_seller, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            ",
        )
        .bind(write.name)
        .bind(write.description)
        .bind(write.image_url)
        .bind(write.price_original)
        .bind(write.price_promo)
        .bind(write.is_promo)
        .bind(write.in_stock)
        .bind(write.is_new)
        .bind(write.is_best_seller)
        .bind(write.category_id)
        .fetch_one(self.pool)
        .await
        .map_err(map_category_fk)?;

        self.get(id)
            .await?
            .ok_or(RepositoryError::Database(sqlx::Error::RowNotFound))
    }

    /// Overwrite a product's fields and bump `updated_at`.
    ///
    /// Returns `Ok(None)` if the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the referenced category does
    /// not exist.
    pub async fn update(
        &self,
        id: ProductId,
        write: &ProductWrite<'_>,
    ) -> Result<Option<Product>, RepositoryError> {
        let updated: Option<ProductId> = sqlx::query_scalar(
            r"
            UPDATE product SET
                name = $1, description = $2, image_url = $3,
                price_original = $4, price_promo = $5, is_promo = $6,
                in_stock = $7, is_new = $8, is_best_seller = $9,
                category_id = $10, updated_at = now()
            WHERE id = $11
            RETURNING id
            ",
        )
        .bind(write.name)
        .bind(write.description)
        .bind(write.image_url)
        .bind(write.price_original)
        .bind(write.price_promo)
        .bind(write.is_promo)
        .bind(write.in_stock)
        .bind(write.is_new)
        .bind(write.is_best_seller)
        .bind(write.category_id)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(map_category_fk)?;

        match updated {
            Some(id) => self.get(id).await,
            None => Ok(None),
        }
    }

    /// Delete a product.
    ///
    /// Returns `false` if the product did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_category_fk(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::Conflict("referenced category does not exist".to_owned());
    }
    RepositoryError::Database(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_filter_empty() {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM product p");
        push_filter(&mut builder, &ProductFilter::default());
        assert_eq!(builder.into_sql(), "SELECT COUNT(*) FROM product p");
    }

    #[test]
    fn test_push_filter_single_flag() {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM product p");
        push_filter(
            &mut builder,
            &ProductFilter {
                promo_only: true,
                ..ProductFilter::default()
            },
        );
        assert_eq!(
            builder.into_sql(),
            "SELECT COUNT(*) FROM product p WHERE p.is_promo = TRUE"
        );
    }

    #[test]
    fn test_push_filter_conjunction() {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM product p");
        push_filter(
            &mut builder,
            &ProductFilter {
                category_id: Some(CategoryId::new(3)),
                promo_only: false,
                new_only: true,
                best_seller_only: true,
            },
        );
        let sql = builder.into_sql();
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM product p WHERE p.category_id = $1 \
             AND p.is_new = TRUE AND p.is_best_seller = TRUE"
        );
    }
}
