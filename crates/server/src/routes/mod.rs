//! HTTP route handlers for the shop backend.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health              - Liveness check
//! GET    /health/ready        - Readiness check (verifies database)
//!
//! # Auth
//! POST   /auth/login          - Exchange admin credentials for a bearer token
//!
//! # Categories
//! GET    /categories          - List categories with product counts (public)
//! POST   /categories          - Create category (bearer token)
//! PUT    /categories/:id      - Rename category (bearer token)
//! DELETE /categories/:id      - Delete category if no dependents (bearer token)
//!
//! # Products
//! GET    /products            - Filtered, paginated product list (public)
//! GET    /products/:id        - Product detail (public)
//! POST   /products            - Create product, multipart (bearer token)
//! PUT    /products/:id        - Update product, multipart (bearer token)
//! DELETE /products/:id        - Delete product (bearer token)
//!
//! # Newsletter
//! GET    /newsletter          - List subscribers (public)
//! POST   /newsletter          - Subscribe an email (public)
//! ```

pub mod auth;
pub mod categories;
pub mod newsletter;
pub mod products;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Product images come in as multipart uploads; allow up to 10 MiB.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Create the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::remove),
        )
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
        .route(
            "/newsletter",
            get(newsletter::list).post(newsletter::subscribe),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
