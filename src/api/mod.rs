pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::{config::Settings, service::ServiceContext, storage::ObjectStore};
use state::AppState;

pub fn create_app(
    service_context: Arc<ServiceContext>,
    store: Arc<dyn ObjectStore>,
    settings: Arc<Settings>,
) -> Router {
    let app_state = AppState::new(service_context, store, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        // Auth routes
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))

        // Public routes (registration site and checkout widget)
        .nest("/public", public_routes())

        // Admin routes
        .nest("/admin", admin_routes(app_state.clone()))

        // Uploaded documents and generated certificates
        .nest_service(
            "/storage",
            ServeDir::new(&app_state.settings.storage.root_dir),
        )

        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::members::register))
        .route("/members/lookup", get(handlers::members::lookup))
        .route("/documents", post(handlers::uploads::upload_document))
        // Payment checkout and gateway callbacks
        .route("/payments/checkout", post(handlers::payments::checkout))
        .route("/payments/callback", post(handlers::payments::callback))
        .route("/payments/failure", post(handlers::payments::failure))
        // Donations
        .route("/donations", post(handlers::donations::create))
        .route("/donations/callback", post(handlers::donations::callback))
        .route("/donations/:id/close", post(handlers::donations::close))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::admin::stats))
        .route("/members", get(handlers::members::list))
        .route("/members/:id", get(handlers::members::get))
        .route("/members/:id/approve", post(handlers::members::approve))
        .route("/members/:id/reject", post(handlers::members::reject))
        .route("/members/:id/extend", post(handlers::members::extend))
        .route(
            "/members/:id/certificates",
            get(handlers::members::list_certificates),
        )
        .route(
            "/members/:id/certificates",
            post(handlers::members::reissue_certificate),
        )
        .route("/members/:id/payments", get(handlers::payments::list_by_member))
        .route("/payments", get(handlers::payments::list))
        .route("/donations", get(handlers::donations::list))
        .route("/certificates", get(handlers::admin::list_certificates))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}
