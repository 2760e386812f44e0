use std::time::Duration;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::bootstrap::app_context::AppContext;

const DB_PING_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResp {
    pub status: &'static str,
    /// Redacted connection target, never the password.
    pub database: String,
    pub socket_rooms: usize,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, body = HealthResp))
)]
pub async fn health(State(ctx): State<AppContext>) -> Json<HealthResp> {
    let ping = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(ctx.db().pool());
    let db_ok = matches!(tokio::time::timeout(DB_PING_TIMEOUT, ping).await, Ok(Ok(_)));
    if !db_ok {
        tracing::warn!(database = %ctx.db().target(), "health_db_unreachable");
    }
    Json(HealthResp {
        status: if db_ok { "ok" } else { "degraded" },
        database: ctx.db().target().to_string(),
        socket_rooms: ctx.socket().hub().room_count().await,
    })
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new().route("/health", get(health)).with_state(ctx)
}
