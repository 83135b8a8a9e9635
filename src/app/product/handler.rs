//! 商品处理器

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{Html, Json},
};
use serde_json::Value;

use super::card;
use super::model::{AddProductRequest, Product};
use crate::app::AppState;
use crate::core::error::{AppError, FieldErrors};
use crate::core::response::MessageResponse;

/// `GET /api/products`
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.products.list().await?;
    Ok(Json(products))
}

/// `POST /api/products`
///
/// 请求体完整校验通过后才会开始抓取
pub async fn add_product(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let Json(body) = payload.map_err(|rejection| {
        let mut errors = FieldErrors::new();
        errors.insert("body".to_string(), vec![rejection.body_text()]);
        AppError::Validation(errors)
    })?;

    let request = AddProductRequest::from_json(&body).map_err(AppError::Validation)?;
    let product = state.products.add(request).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// `DELETE /api/products/:id`
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id)?;
    state.products.remove(id).await?;
    Ok(Json(MessageResponse::new("Product deleted")))
}

/// `GET /`：以商品卡片渲染的心愿单页面
pub async fn wishlist_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let products = state.products.list().await?;
    Ok(Html(card::render_page(&products)))
}

/// 非整数返回 400；超出 `i32` 范围的整数不可能存在，按未找到处理
fn parse_id(raw: &str) -> Result<i32, AppError> {
    match raw.parse::<i32>() {
        Ok(id) => Ok(id),
        Err(_) if is_integer(raw) => Err(AppError::NotFound("Product not found".to_string())),
        Err(_) => Err(AppError::BadRequest("Invalid product ID".to_string())),
    }
}

fn is_integer(raw: &str) -> bool {
    let digits = raw.strip_prefix(&['-', '+'][..]).unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
