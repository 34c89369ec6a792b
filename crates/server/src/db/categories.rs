//! Category repository for database operations.

use sqlx::PgPool;

use frechnel_core::{CategoryId, Slug};

use super::RepositoryError;
use crate::models::{Category, CategoryWithCount};

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    slug: String,
}

#[derive(sqlx::FromRow)]
struct CategoryCountRow {
    id: CategoryId,
    name: String,
    slug: String,
    product_count: i64,
}

impl CategoryRow {
    fn into_category(self) -> Result<Category, RepositoryError> {
        let slug = Slug::parse(&self.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid slug in database: {e}"))
        })?;

        Ok(Category {
            id: self.id,
            name: self.name,
            slug,
        })
    }
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories alphabetically, each with its live product count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored slug is invalid.
    pub async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryCountRow>(
            r"
            SELECT c.id, c.name, c.slug, COUNT(p.id) AS product_count
            FROM category c
            LEFT JOIN product p ON p.category_id = c.id
            GROUP BY c.id, c.name, c.slug
            ORDER BY c.name ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let product_count = row.product_count;
                let category = CategoryRow {
                    id: row.id,
                    name: row.name,
                    slug: row.slug,
                }
                .into_category()?;
                Ok(CategoryWithCount {
                    category,
                    product_count,
                })
            })
            .collect()
    }

    /// Get a category by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>("SELECT id, name, slug FROM category WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(CategoryRow::into_category).transpose()
    }

    /// Create a new category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name or slug already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, name: &str, slug: &Slug) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO category (name, slug) VALUES ($1, $2) RETURNING id, name, slug",
        )
        .bind(name)
        .bind(slug.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("category already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_category()
    }

    /// Rename a category, replacing both name and derived slug.
    ///
    /// Returns `Ok(None)` if the category does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new name or slug collides
    /// with another category.
    pub async fn update(
        &self,
        id: CategoryId,
        name: &str,
        slug: &Slug,
    ) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "UPDATE category SET name = $1, slug = $2 WHERE id = $3 RETURNING id, name, slug",
        )
        .bind(name)
        .bind(slug.as_str())
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(
                    "a category with this name already exists".to_owned(),
                );
            }
            RepositoryError::Database(e)
        })?;

        row.map(CategoryRow::into_category).transpose()
    }

    /// Delete a category.
    ///
    /// Returns `false` if the category did not exist. Callers must check
    /// [`Self::product_count`] first; the foreign key will reject the delete
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count the products currently referencing a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_count(&self, id: CategoryId) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM product WHERE category_id = $1")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        Ok(count)
    }
}
