pub mod directory;
pub mod error;
pub mod events;
pub mod levels;
pub mod orgs;
pub mod projects;
pub mod users;

use crate::middleware::correlation::correlation_middleware;
use crate::{openapi, AppState};
use axum::middleware;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(levels::router(state.clone()))
        .merge(orgs::router(state.clone()))
        .merge(directory::router(state.clone()))
        .merge(users::router(state.clone()))
        .merge(projects::router(state.clone()))
        .merge(events::router(state))
        .merge(openapi::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .route_layer(middleware::from_fn(correlation_middleware));

    Router::new().nest("/api", api)
}
