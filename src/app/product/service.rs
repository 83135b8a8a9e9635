//! 商品业务服务

use std::sync::Arc;
use tracing::{info, warn};

use super::model::{AddProduct, NewProduct, Product};
use crate::core::error::AppError;
use crate::scraper::Scraper;
use crate::storage::Storage;

#[derive(Clone)]
pub struct ProductService {
    storage: Arc<dyn Storage>,
    scraper: Arc<Scraper>,
}

impl ProductService {
    pub fn new(storage: Arc<dyn Storage>, scraper: Arc<Scraper>) -> Self {
        Self { storage, scraper }
    }

    pub async fn list(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.storage.list_products().await?)
    }

    /// 先抓取后保存，抓取失败时不写入任何数据
    pub async fn add(&self, request: AddProduct) -> Result<Product, AppError> {
        let scraped = self.scraper.scrape(&request.url).await.map_err(|e| {
            warn!(url = %request.url, error = %e, "failed to scrape product");
            AppError::ExtractionFailed
        })?;

        let category = request.category.unwrap_or_default();
        let product = self
            .storage
            .create_product(NewProduct {
                title: scraped.title,
                description: Some(scraped.description),
                image_url: scraped.image_url,
                url: request.url,
                price: Some(scraped.price),
                domain: Some(scraped.domain),
                category: Some(category.as_str().to_string()),
            })
            .await?;

        info!(id = product.id, url = %product.url, category = %category, "product added");
        Ok(product)
    }

    pub async fn remove(&self, id: i32) -> Result<(), AppError> {
        if self.storage.delete_product(id).await? {
            info!(id, "product deleted");
            Ok(())
        } else {
            Err(AppError::NotFound("Product not found".to_string()))
        }
    }
}

