use crate::application::ports::user_repository::UserRow;
use crate::application::use_cases::auth::login::{Login as LoginUc, LoginRequest as LoginDto};
use crate::application::use_cases::auth::me::GetMe;
use crate::application::use_cases::auth::register::{
    Register as RegisterUc, RegisterOutcome, RegisterRequest as RegisterDto,
};
use crate::bootstrap::app_context::AppContext;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const ACCESS_COOKIE: &str = "access_token";

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<UserRow> for UserResponse {
    fn from(u: UserRow) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserResponse,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/auth/register", tag = "Auth", request_body = RegisterRequest, security(()), responses(
    (status = 200, body = UserResponse),
    (status = 400, description = "Missing email or password"),
    (status = 409, description = "Email already registered")
))]
pub async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, StatusCode> {
    let repo = ctx.user_repo();
    let uc = RegisterUc {
        repo: repo.as_ref(),
        hasher: ctx.hasher(),
    };
    let dto = RegisterDto {
        email: req.email,
        name: req.name,
        password: req.password,
    };
    let outcome = uc.execute(&dto).await.map_err(|e| {
        tracing::error!(error = ?e, "register_failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    match outcome {
        RegisterOutcome::Created(user) => {
            tracing::info!(user_id = %user.id, "user_registered");
            Ok(Json(user.into()))
        }
        RegisterOutcome::EmailTaken => Err(StatusCode::CONFLICT),
        RegisterOutcome::Invalid(_) => Err(StatusCode::BAD_REQUEST),
    }
}

#[utoipa::path(post, path = "/api/auth/login", tag = "Auth", request_body = LoginRequest, security(()), responses(
    (status = 200, body = LoginResponse),
    (status = 401, description = "Bad credentials")
))]
pub async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), StatusCode> {
    let repo = ctx.user_repo();
    let uc = LoginUc {
        repo: repo.as_ref(),
        hasher: ctx.hasher(),
    };
    let dto = LoginDto {
        email: req.email,
        password: req.password,
    };
    let user = uc
        .execute(&dto)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let token = ctx.tokens().issue(user.id).map_err(|e| {
        tracing::error!(error = ?e, "token_issue_failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let mut headers = HeaderMap::new();
    let cookie = build_access_cookie(
        &token,
        ctx.tokens().expires_secs(),
        ctx.cfg.secure_cookies(),
    );
    let cookie = HeaderValue::from_str(&cookie).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    headers.insert(axum::http::header::SET_COOKIE, cookie);

    Ok((
        headers,
        Json(LoginResponse {
            access_token: token,
            user: user.into(),
        }),
    ))
}

#[utoipa::path(get, path = "/api/auth/me", tag = "Auth", responses((status = 200, body = UserResponse)))]
pub async fn me(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
) -> Result<Json<UserResponse>, StatusCode> {
    let id = validate_bearer(&ctx, bearer?)?;
    let repo = ctx.user_repo();
    let uc = GetMe {
        repo: repo.as_ref(),
    };
    let row = uc
        .execute(id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;
    Ok(Json(row.into()))
}

#[utoipa::path(post, path = "/api/auth/logout", tag = "Auth", responses((status = 204)))]
pub async fn logout(State(ctx): State<AppContext>) -> (HeaderMap, StatusCode) {
    let mut headers = HeaderMap::new();
    let cookie = if ctx.cfg.secure_cookies() {
        "access_token=; HttpOnly; Secure; Path=/; Max-Age=0; SameSite=Lax"
    } else {
        "access_token=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax"
    };
    headers.insert(
        axum::http::header::SET_COOKIE,
        HeaderValue::from_static(cookie),
    );
    (headers, StatusCode::NO_CONTENT)
}

// --- Bearer extractor & token utils ---
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

pub struct Bearer(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        token_from_headers(&parts.headers)
            .map(Bearer)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// Authorization header first, then the HttpOnly cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(t) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(t.trim().to_string());
    }
    headers
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|c| get_cookie(c, ACCESS_COOKIE))
}

pub fn validate_bearer(ctx: &AppContext, bearer: Bearer) -> Result<Uuid, StatusCode> {
    validate_token_str(ctx, &bearer.0)
}

pub fn validate_token_str(ctx: &AppContext, token: &str) -> Result<Uuid, StatusCode> {
    ctx.tokens().verify(token.trim()).map_err(|e| {
        tracing::debug!(error = %e, "bearer_rejected");
        StatusCode::UNAUTHORIZED
    })
}

// --- Cookie helpers ---

fn get_cookie(cookie_header: &str, name: &str) -> Option<String> {
    cookie_header
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn build_access_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let secure_attr = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly{}; Path=/; Max-Age={}; SameSite=Lax",
        ACCESS_COOKIE,
        token,
        secure_attr,
        max_age_secs.max(0)
    )
}
