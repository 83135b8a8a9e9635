//! 数据库基础设施

use sqlx::{
    postgres::{PgPool, PgPoolOptions},
    Error,
};
use std::time::Duration;
use tracing::info;

use crate::config::StorageConfig;

pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    pub async fn connect(config: &StorageConfig) -> Result<Self, Error> {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or_else(|| Error::Configuration("DATABASE_URL must be set".into()))?;

        info!(database = %redact_url(database_url), "connecting to database");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// 创建数据表（可重复执行），列长度与抓取结果的截断长度一致
    pub async fn create_tables(&self) -> Result<(), Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id SERIAL PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id SERIAL PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                description VARCHAR(500),
                image_url TEXT NOT NULL,
                url TEXT NOT NULL,
                price TEXT,
                domain TEXT,
                category TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("database tables ready");
        Ok(())
    }

    pub fn into_pool(self) -> PgPool {
        self.pool
    }
}

/// 记录日志前隐藏连接串中的密码
pub fn redact_url(database_url: &str) -> String {
    match url::Url::parse(database_url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("***"));
            parsed.to_string()
        }
        Ok(parsed) => parsed.to_string(),
        Err(_) => "<unparseable database url>".to_string(),
    }
}
