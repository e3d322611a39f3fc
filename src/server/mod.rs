//! Admin host: serves the login page, the module menu and every CRUD view as
//! JSON documents behind the token-cookie guard.

pub mod handlers;
pub mod views;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::ApiClient;
use crate::auth::Session;
use crate::config::{AppConfig, ResourceRegistry};
use crate::crud::{Crud, ViewContext};
use crate::error::AdminError;
use crate::middleware::session_middleware;

/// Shared per-process state. The API client here is anonymous; each request
/// gets a copy bound to its own session.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<ResourceRegistry>,
    pub api: ApiClient,
}

impl AppState {
    pub fn new(config: AppConfig, registry: ResourceRegistry) -> Result<Self, AdminError> {
        let api = ApiClient::from_config(&config.api, Session::anonymous())?;
        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            api,
        })
    }

    /// CRUD orchestrator for `resource`, acting as `session`
    pub fn crud(&self, resource: &str, session: Session, ctx: ViewContext) -> Crud {
        let definition = self.registry.resolve(resource);
        Crud::new(definition, &self.api.with_session(session), ctx)
            .with_list_query(crate::api::ListQuery::from_config(&self.config.list))
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(auth_routes())
        .merge(crud_routes())
        .layer(middleware::from_fn_with_state(
            state.config.session.clone(),
            session_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/login", get(handlers::login_page).post(handlers::login_submit))
        .route("/admin/logout", post(handlers::logout))
        .route("/admin", get(handlers::home))
        .route("/admin/", get(handlers::home))
}

fn crud_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/:resource", get(handlers::resource_page))
        .route(
            "/admin/:resource/new",
            get(handlers::resource_page).post(handlers::submit_create),
        )
        .route("/admin/:resource/edit", get(handlers::resource_page))
        .route(
            "/admin/:resource/edit/:id",
            get(handlers::resource_page).post(handlers::submit_edit),
        )
        .route("/admin/:resource/delete/:id", post(handlers::delete_record))
}
