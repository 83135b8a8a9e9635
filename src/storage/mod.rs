//! 商品与用户的存储接口
//!
//! [`Storage`] 有两个实现：进程内的 [`MemStorage`]，以及启用 `database` 特性时
//! 基于 Postgres 的 [`PgStorage`]。启动时选定后端，以 `Arc<dyn Storage>` 交给路由。

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::app::product::model::{NewProduct, Product, ProductPatch};
use crate::app::user::model::{NewUser, User};
use crate::config::{StorageBackend, StorageConfig};

pub mod memory;
#[cfg(feature = "database")]
pub mod postgres;

pub use memory::MemStorage;
#[cfg(feature = "database")]
pub use postgres::PgStorage;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i32 },
    #[cfg(feature = "database")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn get_user(&self, id: i32) -> StorageResult<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>>;
    async fn create_user(&self, user: NewUser) -> StorageResult<User>;

    /// 全部商品，按 id 升序
    async fn list_products(&self) -> StorageResult<Vec<Product>>;
    async fn get_product(&self, id: i32) -> StorageResult<Option<Product>>;
    async fn create_product(&self, product: NewProduct) -> StorageResult<Product>;
    /// `id` 不存在时返回 `NotFound`
    async fn update_product(&self, id: i32, patch: ProductPatch) -> StorageResult<Product>;
    /// 没有可删除的记录时返回 `false`
    async fn delete_product(&self, id: i32) -> StorageResult<bool>;
}

/// 打开配置的存储后端
pub async fn connect(config: &StorageConfig) -> anyhow::Result<Arc<dyn Storage>> {
    match config.backend {
        StorageBackend::Memory => {
            info!("using in-memory storage");
            Ok(Arc::new(MemStorage::new()))
        }
        #[cfg(feature = "database")]
        StorageBackend::Postgres => {
            use crate::infrastructure::database::DatabaseManager;

            let db = DatabaseManager::connect(config).await?;
            db.create_tables().await?;
            info!("using postgres storage");
            Ok(Arc::new(PgStorage::new(db.into_pool())))
        }
        #[cfg(not(feature = "database"))]
        StorageBackend::Postgres => {
            anyhow::bail!("the postgres backend needs the `database` feature")
        }
    }
}
