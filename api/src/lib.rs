pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::{load_panel, AppState};

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health_check))
        .route("/dashboard", get(routes::dashboard))
        .route("/api/coins", get(routes::coins))
        .route("/api/text/:lang", get(routes::text))
        .route("/api/history/:symbol", get(routes::history))
        .route("/api/charts/:symbol", get(routes::charts))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}
