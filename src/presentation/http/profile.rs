use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::ports::user_repository::UserRow;
use crate::application::use_cases::auth::me::GetMe;
use crate::application::use_cases::profile::change_password::{
    ChangePassword, ChangePasswordOutcome,
};
use crate::application::use_cases::profile::update_profile::{
    ProfileChanges, UpdateProfile, UpdateProfileOutcome,
};
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::{Bearer, validate_bearer};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub bio: Option<String>,
}

impl From<UserRow> for ProfileResponse {
    fn from(u: UserRow) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            bio: u.bio,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(get_profile).put(update_profile))
        .route("/password", put(change_password))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/profile", tag = "Profile", responses((status = 200, body = ProfileResponse)))]
pub async fn get_profile(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<ProfileResponse>, StatusCode> {
    let user_id = validate_bearer(&ctx, bearer)?;
    let repo = ctx.user_repo();
    let uc = GetMe {
        repo: repo.as_ref(),
    };
    let row = uc
        .execute(user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;
    Ok(Json(row.into()))
}

#[utoipa::path(put, path = "/api/profile", tag = "Profile", request_body = UpdateProfileRequest, responses(
    (status = 200, body = ProfileResponse),
    (status = 400, description = "Blank name or oversized bio")
))]
pub async fn update_profile(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, StatusCode> {
    let user_id = validate_bearer(&ctx, bearer)?;
    let repo = ctx.user_repo();
    let uc = UpdateProfile {
        repo: repo.as_ref(),
    };
    let changes = ProfileChanges {
        name: req.name,
        bio: req.bio,
    };
    match uc
        .execute(user_id, &changes)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        UpdateProfileOutcome::Updated(u) => Ok(Json(u.into())),
        UpdateProfileOutcome::NotFound => Err(StatusCode::UNAUTHORIZED),
        UpdateProfileOutcome::Invalid(_) => Err(StatusCode::BAD_REQUEST),
    }
}

#[utoipa::path(put, path = "/api/profile/password", tag = "Profile", request_body = ChangePasswordRequest, responses(
    (status = 204),
    (status = 400, description = "New password too short"),
    (status = 403, description = "Current password does not match")
))]
pub async fn change_password(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode, StatusCode> {
    let user_id = validate_bearer(&ctx, bearer)?;
    let repo = ctx.user_repo();
    let uc = ChangePassword {
        repo: repo.as_ref(),
        hasher: ctx.hasher(),
    };
    let outcome = uc
        .execute(user_id, &req.current_password, &req.new_password)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, user_id = %user_id, "change_password_failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    match outcome {
        ChangePasswordOutcome::Changed => {
            tracing::info!(user_id = %user_id, "password_changed");
            Ok(StatusCode::NO_CONTENT)
        }
        ChangePasswordOutcome::WrongPassword => Err(StatusCode::FORBIDDEN),
        ChangePasswordOutcome::TooShort => Err(StatusCode::BAD_REQUEST),
        ChangePasswordOutcome::NotFound => Err(StatusCode::UNAUTHORIZED),
    }
}
