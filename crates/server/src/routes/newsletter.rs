//! Newsletter route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use frechnel_core::Email;

use crate::db::{RepositoryError, SubscriberRepository};
use crate::error::{AppError, Result};
use crate::models::Subscriber;
use crate::state::AppState;

/// Subscription request body.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: Option<String>,
}

/// Subscription response.
#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub success: bool,
    pub subscriber: Subscriber,
}

/// List subscribers, most recent first.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Subscriber>>> {
    let subscribers = SubscriberRepository::new(state.pool()).list().await?;
    Ok(Json(subscribers))
}

/// Subscribe an email to the newsletter.
#[instrument(skip(state, body))]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<SubscribeResponse>)> {
    let raw = body
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::BadRequest("email is required".to_string()))?;

    let email =
        Email::parse(&raw).map_err(|_| AppError::BadRequest("invalid email".to_string()))?;

    let subscriber = SubscriberRepository::new(state.pool())
        .create(&email)
        .await
        .map_err(|e| match e {
            // Duplicate subscription answers 400 on this route
            RepositoryError::Conflict(msg) => AppError::BadRequest(msg),
            other => AppError::from(other),
        })?;

    tracing::info!(email = %subscriber.email, "Newsletter subscription");
    Ok((
        StatusCode::CREATED,
        Json(SubscribeResponse {
            success: true,
            subscriber,
        }),
    ))
}
