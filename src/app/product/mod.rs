//! 心愿单商品模块

pub mod card;
pub mod handler;
pub mod model;
pub mod service;

pub use card::ProductCard;
pub use model::{AddProduct, AddProductRequest, Category, NewProduct, Product, ProductPatch};
pub use service::ProductService;
