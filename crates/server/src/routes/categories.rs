//! Category route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use frechnel_core::{CategoryId, Slug};

use crate::db::{CategoryRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Category, CategoryWithCount};
use crate::state::AppState;

/// Body for create and rename.
#[derive(Debug, Deserialize)]
pub struct CategoryBody {
    pub name: Option<String>,
}

/// List all categories alphabetically with their product counts (public).
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CategoryWithCount>>> {
    let categories = CategoryRepository::new(state.pool())
        .list_with_counts()
        .await?;
    Ok(Json(categories))
}

/// Create a category (admin).
#[instrument(skip(state, _admin))]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CategoryBody>,
) -> Result<(StatusCode, Json<Category>)> {
    let (name, slug) = validated_name(body.name)?;

    let category = CategoryRepository::new(state.pool())
        .create(&name, &slug)
        .await
        .map_err(|e| match e {
            // Duplicate create answers 400 on this route
            RepositoryError::Conflict(msg) => AppError::BadRequest(msg),
            other => AppError::from(other),
        })?;

    tracing::info!(id = %category.id, slug = %category.slug, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// Rename a category, re-deriving its slug (admin).
#[instrument(skip(state, _admin))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<CategoryBody>,
) -> Result<Json<Category>> {
    let (name, slug) = validated_name(body.name)?;

    let category = CategoryRepository::new(state.pool())
        .update(CategoryId::new(id), &name, &slug)
        .await? // name collision with another category flows out as 409
        .ok_or_else(|| AppError::NotFound("category not found".to_string()))?;

    Ok(Json(category))
}

/// Delete a category if no product references it (admin).
#[instrument(skip(state, _admin))]
pub async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let id = CategoryId::new(id);
    let repo = CategoryRepository::new(state.pool());

    let count = repo.product_count(id).await?;
    if count > 0 {
        return Err(AppError::HasDependents { count });
    }

    if !repo.delete(id).await? {
        return Err(AppError::NotFound("category not found".to_string()));
    }

    Ok(Json(json!({ "success": true })))
}

/// Trim the submitted name and derive its slug.
fn validated_name(name: Option<String>) -> Result<(String, Slug)> {
    let name = name
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("name is required".to_string()))?;

    let slug = Slug::derive(&name)
        .map_err(|_| AppError::BadRequest("name yields an empty slug".to_string()))?;

    Ok((name, slug))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_name_derives_slug() {
        let (name, slug) = validated_name(Some("Édition Limitée".to_string())).unwrap();
        assert_eq!(name, "Édition Limitée");
        assert_eq!(slug.as_str(), "edition-limitee");
    }

    #[test]
    fn test_validated_name_trims() {
        let (name, slug) = validated_name(Some("  Hoodies  ".to_string())).unwrap();
        assert_eq!(name, "Hoodies");
        assert_eq!(slug.as_str(), "hoodies");
    }

    #[test]
    fn test_validated_name_missing() {
        assert!(validated_name(None).is_err());
        assert!(validated_name(Some(String::new())).is_err());
        assert!(validated_name(Some("   ".to_string())).is_err());
    }

    #[test]
    fn test_validated_name_unsluggable() {
        assert!(validated_name(Some("!!!".to_string())).is_err());
    }
}
