pub mod middleware;
pub mod openapi;
pub mod routes;

use axum::Router;
use om_core::config::OrgmapConfig;
use om_core::{Orgmap, OrgmapError};
use om_db::schema;
use om_db::store::DbStore;
use om_events::bus::EventBus;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    pub config: OrgmapConfig,
    pub event_bus: EventBus,
}

/// One service instance per request: a fresh SQLite connection against
/// the configured database, sharing the process-wide event bus.
pub fn build_orgmap(state: &AppState) -> Result<Orgmap<DbStore>, OrgmapError> {
    let conn = schema::open_and_migrate(&state.config.db_path).map_err(|err| {
        OrgmapError::Internal {
            message: err.to_string(),
        }
    })?;
    let store = DbStore::new(conn);
    Ok(Orgmap::new(store, state.event_bus.clone()).with_placeholder(
        state.config.placeholder_code.clone(),
        state.config.placeholder_longname.clone(),
    ))
}

pub fn app(state: AppState) -> Router {
    routes::router(state)
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app(state)).await
}
