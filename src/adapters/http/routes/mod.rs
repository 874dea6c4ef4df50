pub mod subscription;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    // Nesting only matches the bare prefix, so the slash form is routed explicitly.
    Router::new()
        .route("/subscriptions/", subscription::collection())
        .nest("/subscriptions", subscription::router())
}
