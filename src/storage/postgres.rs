use async_trait::async_trait;
use sqlx::postgres::PgPool;

use super::{Storage, StorageError, StorageResult};
use crate::app::product::model::{NewProduct, Product, ProductPatch};
use crate::app::user::model::{NewUser, User};

const PRODUCT_COLUMNS: &str = "id, title, description, image_url, url, price, domain, category";
const USER_COLUMNS: &str = "id, username, password";

/// 基于 Postgres 的存储，id 来自 `SERIAL` 列
#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Storage for PgStorage {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn get_user(&self, id: i32) -> StorageResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> StorageResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.password)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_products(&self) -> StorageResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn get_product(&self, id: i32) -> StorageResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn create_product(&self, product: NewProduct) -> StorageResult<Product> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (title, description, image_url, url, price, domain, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&product.title)
        .bind(&product.description)
        .bind(&product.image_url)
        .bind(&product.url)
        .bind(&product.price)
        .bind(&product.domain)
        .bind(&product.category)
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    async fn update_product(&self, id: i32, patch: ProductPatch) -> StorageResult<Product> {
        let updated = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                image_url = COALESCE($4, image_url),
                url = COALESCE($5, url),
                price = COALESCE($6, price),
                domain = COALESCE($7, domain),
                category = COALESCE($8, category)
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(&patch.image_url)
        .bind(&patch.url)
        .bind(&patch.price)
        .bind(&patch.domain)
        .bind(&patch.category)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or(StorageError::NotFound { entity: "product", id })
    }

    async fn delete_product(&self, id: i32) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
