use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::services::{AuthService, NoteService, Pipeline, TenantService, UserService};

/// Shared handler state. Services are cheap to clone; they share one pipeline.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub auth: AuthService,
    pub notes: NoteService,
    pub tenants: TenantService,
    pub users: UserService,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            auth: AuthService::new(pipeline.clone()),
            notes: NoteService::new(pipeline.clone()),
            tenants: TenantService::new(pipeline.clone()),
            users: UserService::new(pipeline.clone()),
            pipeline,
        }
    }
}

pub fn router(state: AppState, security: &SecurityConfig) -> Router {
    let mut app = Router::new()
        // Public
        .route("/health", get(public::health))
        .route("/auth/login", post(public::login))
        // Protected
        .merge(note_routes())
        .merge(tenant_routes())
        .merge(user_routes())
        .with_state(state);

    // Global middleware
    if security.enable_cors {
        app = app.layer(cors_layer(&security.cors_origins));
    }
    app.layer(TraceLayer::new_for_http())
}

fn note_routes() -> Router<AppState> {
    use protected::notes;

    Router::new()
        .route("/notes", post(notes::create).get(notes::list))
        .route(
            "/notes/:id",
            get(notes::get).put(notes::update).delete(notes::delete),
        )
}

fn tenant_routes() -> Router<AppState> {
    use protected::tenants;

    Router::new()
        .route("/tenants/me", get(tenants::me))
        .route("/tenants/:slug/upgrade", post(tenants::upgrade))
}

fn user_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/users", post(users::create).get(users::list))
        .route("/users/me", get(users::me))
        .route("/users/:id", axum::routing::patch(users::update).delete(users::delete))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(tower_http::cors::Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(parsed)
}
