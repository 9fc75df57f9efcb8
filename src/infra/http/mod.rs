mod middleware;
mod pages;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::any,
};

use crate::application::page::PageService;

pub use middleware::REQUEST_ID_HEADER;

use middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub pages: Arc<PageService>,
}

/// Build the page router: view, edit and save routes plus the greeting fallback.
///
/// Page routes accept every method so the path is validated before the
/// method is; a bad title is always a 404, never a 405.
pub fn build_router(state: HttpState, body_limit: usize) -> Router {
    Router::new()
        .route("/view/{*title}", any(pages::view_page))
        .route("/edit/{*title}", any(pages::edit_page))
        .route("/save/{*title}", any(pages::save_page))
        .fallback(pages::greet)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
