//! Admin login route handler.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Login request body.
///
/// Fields are optional so that a missing field produces our 400 response
/// instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub admin: AdminInfo,
}

/// The authenticated admin identity echoed back to the client.
#[derive(Debug, Serialize)]
pub struct AdminInfo {
    pub email: String,
}

/// Exchange the configured admin credentials for a signed bearer token.
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(AppError::BadRequest(
            "email and password are required".to_string(),
        ));
    };
    if email.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "email and password are required".to_string(),
        ));
    }

    let token = state.auth().issue(&email, &password)?;

    Ok(Json(LoginResponse {
        success: true,
        token,
        admin: AdminInfo {
            email: state.auth().admin_email().to_owned(),
        },
    }))
}
