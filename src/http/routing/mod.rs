use axum::{routing::get, Router};

use crate::http::routes::pages;

pub fn app(tasks_router: Router) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/health", get(|| async { "ok" }))
        .merge(tasks_router)
}
