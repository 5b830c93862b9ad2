pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod stitch;
pub mod upload;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, SecurityConfig};
use crate::database::ChapterStore;
use crate::handlers::{elevated, protected, public};
use crate::middleware::auth::{ADMIN_KEY_HEADER, USER_ID_HEADER};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Transactional sink for the chapter upload pipeline.
    pub chapters: Arc<dyn ChapterStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: PgPool, chapters: Arc<dyn ChapterStore>, config: AppConfig) -> Self {
        Self {
            db,
            chapters,
            config: Arc::new(config),
        }
    }
}

/// Build the full router: every route, the admin-key gate on the elevated
/// tier, and the global CORS, body-limit and trace layers.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security);
    let request_logging = state.config.api.enable_request_logging;

    let router = Router::new()
        .merge(public_routes())
        .merge(protected_routes())
        .merge(elevated_routes(state.clone()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state);

    if request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::system::root))
        .route("/health", get(public::system::health))
        .route("/manhwa", get(public::catalog::list))
        .route("/manhwa/:id", get(public::catalog::details))
        .route("/genres", get(public::catalog::genres))
        .route("/upload-chapter", post(public::chapters::upload))
}

/// Reads are public; writes on the same paths take an `AuthUser`.
fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/bookmarks",
            get(protected::bookmarks::list)
                .post(protected::bookmarks::save)
                .delete(protected::bookmarks::remove),
        )
        .route(
            "/comments",
            get(public::comments::list)
                .post(protected::comments::create)
                .put(protected::comments::update)
                .delete(protected::comments::delete),
        )
        .route(
            "/teams",
            get(public::teams::get)
                .post(protected::teams::create)
                .put(protected::teams::update),
        )
        .route(
            "/uploads",
            get(public::uploads::get)
                .post(protected::uploads::create)
                .put(protected::uploads::update),
        )
}

fn elevated_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin", post(elevated::admin::post))
        .route("/moderator", post(elevated::moderator::post))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            crate::middleware::admin_key_middleware,
        ))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(ADMIN_KEY_HEADER),
        ])
        .max_age(Duration::from_secs(86_400));

    if security.cors_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
