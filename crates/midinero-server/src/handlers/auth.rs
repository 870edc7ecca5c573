//! Authentication-related handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::{success, ApiResponse, AppError, AppState, UserContext};

/// Profile of the authenticated user
#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub created_at: String,
    /// How the request was authenticated
    pub auth_method: String,
}

/// GET /api/auth/profile - the currently authenticated user
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<ApiResponse<ProfileResponse>>, AppError> {
    let profile = state
        .db
        .get_user(user.user_id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let auth_method = if state.config.require_auth {
        "jwt"
    } else {
        "none"
    };

    Ok(success(
        "Profile retrieved",
        ProfileResponse {
            id: profile.id,
            username: profile.username,
            email: profile.email,
            created_at: profile.created_at.to_rfc3339(),
            auth_method: auth_method.to_string(),
        },
    ))
}
