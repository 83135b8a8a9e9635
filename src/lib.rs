//! # wishlist
//!
//! 商品心愿单后端。通过 URL 添加商品：抓取页面的标题、描述、图片和价格后保存，
//! HTTP 层提供商品的列表、新增和删除。

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;
pub mod scraper;
pub mod storage;

pub use app::{router, AppState};
pub use config::Config;
