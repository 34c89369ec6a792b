//! Product route handlers.
//!
//! Reads are public; writes require a bearer token and arrive as multipart
//! forms because an image file may be attached. Image handling policy:
//! uploads go through the media delegate, deletions of replaced or orphaned
//! images are best-effort and never fail the database write.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use frechnel_core::{CategoryId, ProductId};

use crate::db::{CategoryRepository, ProductFilter, ProductRepository, ProductWrite, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::services::media::extract_public_id;
use crate::state::AppState;

/// Page size applied when the caller does not specify one. The shop UI asks
/// for smaller pages; that is a caller choice, not a server limit.
const DEFAULT_PAGE_SIZE: u32 = 100;

/// The shop UI sends this sentinel for "all categories".
const ALL_CATEGORIES: &str = "Tout";

/// Query parameters for the product listing.
///
/// Values stay raw strings: a boolean filter applies only when the value is
/// literally `true`, and `categoryId` admits the [`ALL_CATEGORIES`] sentinel.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub category_id: Option<String>,
    pub is_promo: Option<String>,
    pub is_new: Option<String>,
    pub is_best_seller: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Pagination metadata for the product listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
}

/// Product listing response.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub data: Vec<Product>,
    pub meta: ListMeta,
}

/// List products, filtered and paginated, newest first (public).
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ProductListResponse>> {
    let page = parse_positive(query.page.as_deref(), 1, "page")?;
    let limit = parse_positive(query.limit.as_deref(), DEFAULT_PAGE_SIZE, "limit")?;
    let filter = ProductFilter {
        category_id: parse_category_filter(query.category_id.as_deref())?,
        promo_only: flag_enabled(query.is_promo.as_deref()),
        new_only: flag_enabled(query.is_new.as_deref()),
        best_seller_only: flag_enabled(query.is_best_seller.as_deref()),
    };

    let (data, total) = ProductRepository::new(state.pool())
        .list(&filter, page, limit)
        .await?;

    Ok(Json(ProductListResponse {
        data,
        meta: ListMeta {
            total,
            page,
            limit,
            total_pages: total_pages(total, limit),
        },
    }))
}

/// Product detail (public).
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("product not found".to_string()))
}

/// Create a product from a multipart form (admin).
#[instrument(skip(state, _admin, multipart))]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Product>)> {
    let form = read_form(&mut multipart).await?;
    let fields = validate_form(&form)?;
    ensure_category_exists(&state, fields.category_id).await?;

    let image_url = match form.image {
        Some((filename, bytes)) => state.media().upload(bytes, &filename).await?.url,
        None => form
            .image_url
            .clone()
            .ok_or_else(|| AppError::BadRequest("image required (file or url)".to_string()))?,
    };

    let product = ProductRepository::new(state.pool())
        .create(&product_write(&fields, &image_url))
        .await
        .map_err(map_write_conflict)?;

    tracing::info!(id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product from a multipart form (admin).
///
/// A new image file replaces the stored one: the previous image is deleted
/// from the host best-effort, then the new file is uploaded. Without a file,
/// an explicit `imageUrl` overwrites the reference, otherwise it is kept.
#[instrument(skip(state, _admin, multipart))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<Product>> {
    let id = ProductId::new(id);
    let form = read_form(&mut multipart).await?;
    let fields = validate_form(&form)?;

    let products = ProductRepository::new(state.pool());
    let existing = products
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_string()))?;
    ensure_category_exists(&state, fields.category_id).await?;

    let image_url = match form.image {
        Some((filename, bytes)) => {
            delete_image_best_effort(&state, &existing.image_url).await;
            state.media().upload(bytes, &filename).await?.url
        }
        None => form.image_url.clone().unwrap_or(existing.image_url),
    };

    let product = products
        .update(id, &product_write(&fields, &image_url))
        .await
        .map_err(map_write_conflict)?
        .ok_or_else(|| AppError::NotFound("product not found".to_string()))?;

    Ok(Json(product))
}

/// Delete a product and, best-effort, its hosted image (admin).
#[instrument(skip(state, _admin))]
pub async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let id = ProductId::new(id);
    let repo = ProductRepository::new(state.pool());

    let product = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_string()))?;

    delete_image_best_effort(&state, &product.image_url).await;
    repo.delete(id).await?;

    tracing::info!(%id, "Product deleted");
    Ok(Json(json!({ "success": true })))
}

// =============================================================================
// Form handling
// =============================================================================

/// Raw multipart fields, as submitted.
#[derive(Debug, Default)]
struct RawProductForm {
    name: Option<String>,
    description: Option<String>,
    price_original: Option<String>,
    price_promo: Option<String>,
    is_promo: bool,
    is_new: bool,
    is_best_seller: bool,
    in_stock: Option<String>,
    category_id: Option<String>,
    image: Option<(String, Vec<u8>)>,
    image_url: Option<String>,
}

/// Validated field set, ready to persist (image resolved separately).
#[derive(Debug)]
struct ValidatedFields {
    name: String,
    description: Option<String>,
    price_original: Decimal,
    price_promo: Option<Decimal>,
    is_promo: bool,
    in_stock: bool,
    is_new: bool,
    is_best_seller: bool,
    category_id: CategoryId,
}

/// Drain the multipart stream into a [`RawProductForm`].
async fn read_form(multipart: &mut Multipart) -> Result<RawProductForm> {
    let mut form = RawProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };

        if name == "image" {
            let filename = field.file_name().unwrap_or("upload").to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?;
            if !bytes.is_empty() {
                form.image = Some((filename, bytes.to_vec()));
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?;
        match name.as_str() {
            "name" => form.name = Some(value),
            "description" => form.description = Some(value),
            "priceOriginal" => form.price_original = Some(value),
            "pricePromo" => form.price_promo = Some(value),
            "isPromo" => form.is_promo = value == "true",
            "isNew" => form.is_new = value == "true",
            "isBestSeller" => form.is_best_seller = value == "true",
            "inStock" => form.in_stock = Some(value),
            "categoryId" => form.category_id = Some(value),
            "imageUrl" => {
                if !value.is_empty() {
                    form.image_url = Some(value);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Validate the required fields and enforce the promo-price invariant.
fn validate_form(form: &RawProductForm) -> Result<ValidatedFields> {
    let missing = || AppError::BadRequest("name, price and category are required".to_string());

    let name = form
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(missing)?
        .to_owned();

    let price_original = form
        .price_original
        .as_deref()
        .and_then(|raw| raw.parse::<Decimal>().ok())
        .ok_or_else(missing)?;
    if price_original <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "price must be positive".to_string(),
        ));
    }

    let category_id = form
        .category_id
        .as_deref()
        .and_then(|raw| raw.parse::<i32>().ok())
        .map(CategoryId::new)
        .ok_or_else(missing)?;

    // A promo price without the promo flag is discarded, not persisted
    let price_promo = if form.is_promo {
        form.price_promo
            .as_deref()
            .and_then(|raw| raw.parse::<Decimal>().ok())
    } else {
        None
    };

    let description = form
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_owned);

    Ok(ValidatedFields {
        name,
        description,
        price_original,
        price_promo,
        is_promo: form.is_promo,
        in_stock: form.in_stock.as_deref() != Some("false"),
        is_new: form.is_new,
        is_best_seller: form.is_best_seller,
        category_id,
    })
}

fn product_write<'a>(fields: &'a ValidatedFields, image_url: &'a str) -> ProductWrite<'a> {
    ProductWrite {
        name: &fields.name,
        description: fields.description.as_deref(),
        image_url,
        price_original: fields.price_original,
        price_promo: fields.price_promo,
        is_promo: fields.is_promo,
        in_stock: fields.in_stock,
        is_new: fields.is_new,
        is_best_seller: fields.is_best_seller,
        category_id: fields.category_id,
    }
}

async fn ensure_category_exists(state: &AppState, id: CategoryId) -> Result<()> {
    CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::BadRequest("category does not exist".to_string()))
}

/// Delete a hosted image, logging failure instead of propagating it. URLs
/// not on the image host (explicit external `imageUrl`) have nothing to
/// delete and are skipped.
async fn delete_image_best_effort(state: &AppState, image_url: &str) {
    let Some(public_id) = extract_public_id(image_url) else {
        return;
    };
    if let Err(e) = state.media().destroy(&public_id).await {
        tracing::warn!(error = %e, %public_id, "Failed to delete hosted image");
    }
}

/// The FK backstop: a vanished category surfaces as 400, not 500.
fn map_write_conflict(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::Conflict(msg) => AppError::BadRequest(msg),
        other => AppError::from(other),
    }
}

// =============================================================================
// Query parsing
// =============================================================================

/// A boolean query filter applies only when the value is literally `true`.
fn flag_enabled(value: Option<&str>) -> bool {
    value == Some("true")
}

/// Parse the category filter, honoring the "all categories" sentinel.
fn parse_category_filter(raw: Option<&str>) -> Result<Option<CategoryId>> {
    match raw {
        None | Some("") | Some(ALL_CATEGORIES) => Ok(None),
        Some(value) => value
            .parse::<i32>()
            .map(|id| Some(CategoryId::new(id)))
            .map_err(|_| AppError::BadRequest("categoryId must be an integer".to_string())),
    }
}

/// Parse a 1-based positive integer query parameter.
fn parse_positive(value: Option<&str>, default: u32, field: &str) -> Result<u32> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|v| *v >= 1)
            .ok_or_else(|| {
                AppError::BadRequest(format!("{field} must be a positive integer"))
            }),
    }
}

/// Ceiling division of the filtered total by the page size.
fn total_pages(total: i64, limit: u32) -> i64 {
    let limit = i64::from(limit);
    (total + limit - 1) / limit
}
