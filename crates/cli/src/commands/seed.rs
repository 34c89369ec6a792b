//! Seed the database with the default category set.
//!
//! Idempotent: categories already present (by slug) are left untouched.
//! The admin identity is environment-configured, so there is nothing to
//! seed for authentication.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use frechnel_core::Slug;

use super::MissingDatabaseUrl;

/// Categories every fresh install starts with.
const DEFAULT_CATEGORIES: &[&str] = &[
    "Hoodies",
    "T-Shirts",
    "Pantalons",
    "Sneakers",
    "Vestes",
    "Accessoires",
];

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingDatabaseUrl),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cannot derive slug for {0}: {1}")]
    Slug(&'static str, frechnel_core::SlugError),
}

/// Insert the default categories if they are not already present.
///
/// # Errors
///
/// Returns `SeedError` if the database URL is missing or a query fails.
pub async fn categories() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = super::database_url()?;
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    for &name in DEFAULT_CATEGORIES {
        let slug = Slug::derive(name).map_err(|e| SeedError::Slug(name, e))?;
        sqlx::query("INSERT INTO category (name, slug) VALUES ($1, $2) ON CONFLICT (slug) DO NOTHING")
            .bind(name)
            .bind(slug.as_str())
            .execute(&pool)
            .await?;
        tracing::info!(name, slug = %slug, "Category ensured");
    }

    tracing::info!("Seeding complete!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_categories_all_sluggable() {
        for name in DEFAULT_CATEGORIES {
            let slug = Slug::derive(name).unwrap();
            assert!(!slug.as_str().is_empty());
        }
    }

    #[test]
    fn test_default_category_slugs_unique() {
        let mut slugs: Vec<String> = DEFAULT_CATEGORIES
            .iter()
            .map(|name| Slug::derive(name).unwrap().into_inner())
            .collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), DEFAULT_CATEGORIES.len());
    }
}
