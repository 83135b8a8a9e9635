//! 商品数据模型与请求体

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use validator::Validate;

use crate::core::error::{field_errors, FieldErrors};

/// 已保存的心愿单商品，`id` 由存储层分配且不会改变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub url: String,
    pub price: Option<String>,
    pub domain: Option<String>,
    pub category: Option<String>,
}

/// 分配 id 之前的商品字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub url: String,
    pub price: Option<String>,
    pub domain: Option<String>,
    pub category: Option<String>,
}

impl NewProduct {
    pub fn with_id(self, id: i32) -> Product {
        Product {
            id,
            title: self.title,
            description: self.description,
            image_url: self.image_url,
            url: self.url,
            price: self.price,
            domain: self.domain,
            category: self.category,
        }
    }
}

/// 部分更新：`Some` 覆盖，`None` 保留原值
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub url: Option<String>,
    pub price: Option<String>,
    pub domain: Option<String>,
    pub category: Option<String>,
}

impl ProductPatch {
    pub fn apply(self, product: &mut Product) {
        if let Some(title) = self.title {
            product.title = title;
        }
        if let Some(description) = self.description {
            product.description = Some(description);
        }
        if let Some(image_url) = self.image_url {
            product.image_url = image_url;
        }
        if let Some(url) = self.url {
            product.url = url;
        }
        if let Some(price) = self.price {
            product.price = Some(price);
        }
        if let Some(domain) = self.domain {
            product.domain = Some(domain);
        }
        if let Some(category) = self.category {
            product.category = Some(category);
        }
    }
}

/// 心愿单分类，其他值按 `Other` 显示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    Electronics,
    Clothing,
    Home,
    Beauty,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Electronics,
        Category::Clothing,
        Category::Home,
        Category::Beauty,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "electronics",
            Category::Clothing => "clothing",
            Category::Home => "home",
            Category::Beauty => "beauty",
            Category::Other => "other",
        }
    }

    /// 与存储的标签精确匹配（区分大小写）
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `POST /api/products` 原始请求体
#[derive(Debug, Clone, Default, Validate)]
pub struct AddProductRequest {
    #[validate(required(message = "Required"), url(message = "Invalid url"))]
    pub url: Option<String>,
    pub category: Option<String>,
}

/// 校验通过的请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddProduct {
    pub url: String,
    pub category: Option<Category>,
}

impl AddProductRequest {
    /// 检查 JSON 请求体的结构和字段类型，收集所有字段错误
    pub fn from_json(body: &Value) -> Result<AddProduct, FieldErrors> {
        let Value::Object(map) = body else {
            let mut errors = FieldErrors::new();
            errors.insert(
                "body".to_string(),
                vec![format!("Expected object, received {}", json_type(body))],
            );
            return Err(errors);
        };

        let mut errors = FieldErrors::new();
        let request = AddProductRequest {
            url: string_field(map, "url", &mut errors),
            category: string_field(map, "category", &mut errors),
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        request.into_validated()
    }

    pub fn into_validated(self) -> Result<AddProduct, FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => field_errors(&e),
        };

        let category = match self.category.as_deref() {
            None => None,
            Some(value) => match Category::parse(value) {
                Some(category) => Some(category),
                None => {
                    let expected: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
                    errors.entry("category".to_string()).or_default().push(format!(
                        "Invalid enum value. Expected {}, received '{}'",
                        expected.join(" | "),
                        value
                    ));
                    None
                }
            },
        };

        match self.url {
            Some(url) if errors.is_empty() => Ok(AddProduct { url, category }),
            _ => Err(errors),
        }
    }
}

/// 可选字符串字段，`null` 视为未提供
fn string_field(map: &Map<String, Value>, field: &str, errors: &mut FieldErrors) -> Option<String> {
    match map.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            errors
                .entry(field.to_string())
                .or_default()
                .push(format!("Expected string, received {}", json_type(other)));
            None
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
