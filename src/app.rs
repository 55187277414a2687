use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::routes::{admin, applications, auth, companies, connections, health, jobs, notifications};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/auth", auth::router())
        .nest("/api/companies", companies::router())
        .nest("/api/jobs", jobs::router())
        .nest("/api/applications", applications::router())
        .nest("/api/connections", connections::router())
        .nest("/api/notifications", notifications::router())
        .nest("/api/admin", admin::router())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
