//! 商品卡片渲染
//!
//! 每个商品一张卡片，包含图片、分类徽章、标题、描述、价格和域名。
//! 来自抓取页面的内容全部做 HTML 转义。

use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

use super::model::{Category, Product};

impl Category {
    /// 徽章颜色样式，未知标签使用 `Other` 的颜色
    pub fn badge_class(&self) -> &'static str {
        match self {
            Category::Electronics => "bg-primary-100 text-primary-800",
            Category::Clothing => "bg-blue-100 text-blue-800",
            Category::Home => "bg-green-100 text-green-800",
            Category::Beauty => "bg-purple-100 text-purple-800",
            Category::Other => "bg-gray-100 text-gray-800",
        }
    }

    pub fn label(&self) -> String {
        category_label(self.as_str())
    }
}

/// 显示标签：首字母大写
pub fn category_label(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub class: &'static str,
}

/// 单张卡片的视图模型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard<'a> {
    pub title: &'a str,
    pub image_url: &'a str,
    pub url: &'a str,
    pub description: Option<&'a str>,
    pub price: Option<&'a str>,
    pub domain: Option<&'a str>,
    pub badge: Option<Badge>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl<'a> ProductCard<'a> {
    pub fn from_product(product: &'a Product) -> Self {
        let badge = non_empty(&product.category).map(|category| Badge {
            label: category_label(category),
            class: Category::parse(category).unwrap_or_default().badge_class(),
        });

        Self {
            title: &product.title,
            image_url: &product.image_url,
            url: &product.url,
            description: non_empty(&product.description),
            price: non_empty(&product.price),
            domain: non_empty(&product.domain),
            badge,
        }
    }

    pub fn render(&self) -> String {
        let mut html = String::new();
        let _ = write!(
            html,
            r#"<div class="product-card overflow-hidden shadow-md hover:shadow-lg"><a href="{}" target="_blank" rel="noopener noreferrer" class="block">"#,
            encode_double_quoted_attribute(self.url)
        );
        let _ = write!(
            html,
            r#"<div class="overflow-hidden bg-gray-200"><img src="{}" alt="{}" class="object-cover w-full h-full"></div>"#,
            encode_double_quoted_attribute(self.image_url),
            encode_double_quoted_attribute(self.title)
        );
        html.push_str(r#"<div class="p-4">"#);

        if let Some(badge) = &self.badge {
            let _ = write!(
                html,
                r#"<span class="badge {} mb-2 font-medium">{}</span>"#,
                badge.class,
                encode_text(&badge.label)
            );
        }
        let _ = write!(
            html,
            r#"<h3 class="text-lg font-medium text-gray-900 mb-1 line-clamp-1">{}</h3>"#,
            encode_text(self.title)
        );
        if let Some(description) = self.description {
            let _ = write!(
                html,
                r#"<p class="text-sm text-gray-500 mb-2 line-clamp-1">{}</p>"#,
                encode_text(description)
            );
        }

        html.push_str(r#"<div class="flex justify-between items-center">"#);
        if let Some(price) = self.price {
            let _ = write!(
                html,
                r#"<span class="text-primary-500 font-semibold">{}</span>"#,
                encode_text(price)
            );
        }
        if let Some(domain) = self.domain {
            let _ = write!(
                html,
                r#"<span class="text-xs text-gray-500">{}</span>"#,
                encode_text(domain)
            );
        }
        html.push_str("</div></div></a></div>");
        html
    }
}

/// 完整的心愿单页面
pub fn render_page(products: &[Product]) -> String {
    let mut html = String::from(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>Wishlist</title></head><body><main class=\"grid\">",
    );
    if products.is_empty() {
        html.push_str(r#"<p class="empty">Your wishlist is empty.</p>"#);
    }
    for product in products {
        html.push_str(&ProductCard::from_product(product).render());
    }
    html.push_str("</main></body></html>");
    html
}
