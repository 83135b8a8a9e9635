//! HTTP 应用：共享状态与路由

pub mod product;
pub mod user;

use axum::{
    extract::State,
    middleware,
    response::Json,
    routing::{delete, get},
    Router,
};
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::core::middleware::request_logging_middleware;
use crate::scraper::Scraper;
use crate::storage::Storage;
use product::{handler, ProductService};

#[derive(Clone)]
pub struct AppState {
    pub products: ProductService,
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, scraper: Arc<Scraper>) -> Self {
        Self {
            products: ProductService::new(storage.clone(), scraper),
            storage,
        }
    }
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "storage": state.storage.backend_name(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(handler::wishlist_page))
        .route("/health", get(health_check))
        .route(
            "/api/products",
            get(handler::list_products).post(handler::add_product),
        )
        .route("/api/products/:id", delete(handler::delete_product))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
