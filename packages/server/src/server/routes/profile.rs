//! Profile endpoints for the signed-in account.

use axum::{extract::rejection::JsonRejection, extract::Extension, Json};
use serde::Serialize;

use crate::domains::account::actions::{update_profile, UpdateProfileInput};
use crate::domains::account::Account;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: Account,
}

#[derive(Serialize)]
pub struct UpdateProfileResponse {
    pub success: bool,
    pub user: Account,
}

/// GET /users/profile
pub async fn get_profile_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let account = Account::find_by_id(user.account_id, &state.deps.db_pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load profile: {}", e);
            ApiError::Internal("Failed to fetch profile")
        })?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(ProfileResponse { user: account }))
}

/// PUT /users/profile
pub async fn update_profile_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    payload: Result<Json<UpdateProfileInput>, JsonRejection>,
) -> Result<Json<UpdateProfileResponse>, ApiError> {
    let Json(input) =
        payload.map_err(|rejection| ApiError::validation(rejection.body_text(), None))?;

    let account = update_profile(user.account_id, input, &state.deps.db_pool).await?;

    Ok(Json(UpdateProfileResponse {
        success: true,
        user: account,
    }))
}
