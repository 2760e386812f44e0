use axum::Router;
use axum::extract::{DefaultBodyLimit, MatchedPath};
use axum::routing::get;
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::bootstrap::app_context::{AppContext, AppServices};
use crate::bootstrap::config::Config;
use crate::bootstrap::error::BootstrapError;
use crate::bootstrap::extensions::Extensions;
use crate::presentation::http::openapi::ApiDoc;
use crate::presentation::http::{auth, data, files, health, index, profile, upload};
use crate::presentation::ws;

pub const SOCKET_PATH: &str = "/socket";

/// A named set of endpoints mounted under one prefix.
pub struct RouteGroup {
    pub name: &'static str,
    pub prefix: &'static str,
    pub router: Router,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedGroup {
    pub name: &'static str,
    pub prefix: &'static str,
}

/// A fully configured application that has not started listening yet.
pub struct App {
    router: Router,
    groups: Vec<MountedGroup>,
    pages: Vec<&'static str>,
    ctx: AppContext,
}

impl App {
    pub fn route_groups(&self) -> &[MountedGroup] {
        &self.groups
    }

    pub fn pages(&self) -> &[&'static str] {
        &self.pages
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

#[derive(Default)]
struct Registry {
    router: Router,
    groups: Vec<MountedGroup>,
}

impl Registry {
    fn register(&mut self, group: RouteGroup) -> Result<(), BootstrapError> {
        if self.groups.iter().any(|g| g.name == group.name) {
            return Err(BootstrapError::DuplicateRouteGroup(group.name));
        }
        let router = std::mem::take(&mut self.router);
        self.router = router.nest(group.prefix, group.router);
        self.groups.push(MountedGroup {
            name: group.name,
            prefix: group.prefix,
        });
        Ok(())
    }
}

fn route_groups(ctx: &AppContext) -> Vec<RouteGroup> {
    vec![
        RouteGroup {
            name: "auth",
            prefix: "/api/auth",
            router: auth::routes(ctx.clone()),
        },
        RouteGroup {
            name: "profile",
            prefix: "/api/profile",
            router: profile::routes(ctx.clone()),
        },
        RouteGroup {
            name: "upload",
            prefix: "/api",
            router: upload::routes(ctx.clone()),
        },
        RouteGroup {
            name: "data",
            prefix: "/api",
            router: data::routes(ctx.clone()),
        },
        RouteGroup {
            name: "files",
            prefix: "/api",
            router: files::routes(ctx.clone()),
        },
    ]
}

/// Credentialed CORS for exactly one browser origin. The origin is matched
/// per request, so other origins get no grant at all.
pub fn rest_cors(cfg: &Config) -> Result<CorsLayer, BootstrapError> {
    let origin = HeaderValue::from_str(&cfg.trusted_origin)
        .map_err(|_| BootstrapError::Cors(cfg.trusted_origin.clone()))?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::DELETE,
            http::Method::PATCH,
            http::Method::OPTIONS,
        ])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
        .allow_credentials(true))
}

/// Builds the application with Postgres-backed repositories. Must run inside
/// a Tokio runtime; the database itself is only contacted on first use.
pub fn build_app(cfg: Config) -> Result<App, BootstrapError> {
    build_app_with(cfg, AppServices::sqlx)
}

/// Same as [`build_app`] with the repositories chosen by `services`.
pub fn build_app_with<F>(cfg: Config, services: F) -> Result<App, BootstrapError>
where
    F: FnOnce(&Config, &Extensions) -> AppServices,
{
    let cors = rest_cors(&cfg)?;
    let extensions = Extensions::init(&cfg)?;
    info!(database = %extensions.db.target(), "database handle ready");

    let services = services(&cfg, &extensions);
    let ctx = AppContext::new(cfg.clone(), extensions, services);

    let mut registry = Registry::default();
    for group in route_groups(&ctx) {
        registry.register(group)?;
    }
    let Registry { router, groups } = registry;

    let pages = vec!["/"];
    let rest = router
        .merge(index::routes())
        .nest("/api", health::routes(ctx.clone()))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    // The socket route keeps its own wildcard policy.
    let socket = Router::new()
        .route(SOCKET_PATH, get(ws::socket_entry))
        .with_state(ctx.clone())
        .layer(ctx.socket().cors());

    let router = rest
        .merge(socket)
        .layer(DefaultBodyLimit::max(cfg.upload_max_bytes))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    info!(
        groups = groups.len(),
        trusted_origin = %cfg.trusted_origin,
        "application assembled"
    );
    Ok(App {
        router,
        groups,
        pages,
        ctx,
    })
}

/// Zero-argument factory: configuration from the environment.
pub fn create_app() -> Result<App, BootstrapError> {
    let cfg = Config::from_env().map_err(BootstrapError::Config)?;
    build_app(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &'static str) -> RouteGroup {
        RouteGroup {
            name,
            prefix: "/api",
            router: Router::new().route("/ping", get(|| async { "pong" })),
        }
    }

    #[test]
    fn duplicate_group_names_are_rejected() {
        let mut registry = Registry::default();
        registry.register(group("auth")).unwrap();
        let err = registry.register(group("auth")).unwrap_err();
        assert!(matches!(err, BootstrapError::DuplicateRouteGroup("auth")));
        assert_eq!(registry.groups.len(), 1);
    }

    #[test]
    fn unusable_trusted_origin_is_a_cors_error() {
        let mut cfg = Config::from_lookup(|_| None).unwrap();
        cfg.trusted_origin = "http://bad\norigin".into();
        assert!(matches!(rest_cors(&cfg), Err(BootstrapError::Cors(_))));
    }
}
