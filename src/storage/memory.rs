use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{Storage, StorageError, StorageResult};
use crate::app::product::model::{NewProduct, Product, ProductPatch};
use crate::app::user::model::{NewUser, User};

/// 进程内存储，重启后数据丢失
///
/// id 由各集合的计数器从 1 开始分配，删除后的 id 不会复用。
#[derive(Debug)]
pub struct MemStorage {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    users: BTreeMap<i32, User>,
    products: BTreeMap<i32, Product>,
    next_user_id: i32,
    next_product_id: i32,
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStorage {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                users: BTreeMap::new(),
                products: BTreeMap::new(),
                next_user_id: 1,
                next_product_id: 1,
            }),
        }
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl Storage for MemStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_user(&self, id: i32) -> StorageResult<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> StorageResult<User> {
        let mut inner = self.lock()?;
        let id = inner.next_user_id;
        inner.next_user_id += 1;

        let user = User {
            id,
            username: user.username,
            password: user.password,
        };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn list_products(&self) -> StorageResult<Vec<Product>> {
        Ok(self.lock()?.products.values().cloned().collect())
    }

    async fn get_product(&self, id: i32) -> StorageResult<Option<Product>> {
        Ok(self.lock()?.products.get(&id).cloned())
    }

    async fn create_product(&self, product: NewProduct) -> StorageResult<Product> {
        let mut inner = self.lock()?;
        let id = inner.next_product_id;
        inner.next_product_id += 1;

        let product = product.with_id(id);
        inner.products.insert(id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: i32, patch: ProductPatch) -> StorageResult<Product> {
        let mut inner = self.lock()?;
        let product = inner
            .products
            .get_mut(&id)
            .ok_or(StorageError::NotFound { entity: "product", id })?;

        patch.apply(product);
        Ok(product.clone())
    }

    async fn delete_product(&self, id: i32) -> StorageResult<bool> {
        Ok(self.lock()?.products.remove(&id).is_some())
    }
}
