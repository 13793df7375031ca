//! # brig-server
//!
//! Axum HTTP API over [`brig_db::service::BrigService`].
//!
//! The caller's identity arrives in the `x-user-id` header, set by the
//! gateway in front of this service; requests without it run as the
//! anonymous actor.

pub mod error;
pub mod extract;
pub mod routes;
pub mod sheet;
pub mod state;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::AppState;

/// Build the full API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(routes::projects::routes())
        .merge(routes::personnel::routes())
        .merge(routes::warehouse::routes())
        .merge(routes::estimates::routes())
        .merge(routes::reports::routes())
        .merge(routes::comments::routes())
        .merge(routes::notifications::routes())
        .merge(routes::audit::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
