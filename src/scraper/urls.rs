//! 抓取结果后处理用到的 URL 工具函数

use tracing::warn;
use url::Url;

/// 去掉 `www.` 前缀的主机名；`url` 无法解析时返回空字符串
pub fn extract_domain(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .host_str()
            .map(|host| host.strip_prefix("www.").unwrap_or(host).to_string())
            .unwrap_or_default(),
        Err(e) => {
            warn!(url, error = %e, "could not extract domain");
            String::new()
        }
    }
}

/// 图片绝对地址。不以 `http` 开头的地址拼接到页面的 origin 上
pub fn resolve_image_url(page_url: &Url, image: &str) -> Option<String> {
    if image.starts_with("http") {
        return Some(image.to_string());
    }

    let origin = Url::parse(&page_url.origin().ascii_serialization()).ok()?;
    origin.join(image).ok().map(String::from)
}

/// 按字符截断到最多 `max` 个
pub fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_strips_www() {
        assert_eq!(extract_domain("https://www.amazon.com/dp/B000"), "amazon.com");
        assert_eq!(extract_domain("https://shop.example.com:8443/item"), "shop.example.com");
        assert_eq!(extract_domain("not a url"), "");
    }

    #[test]
    fn absolute_images_are_kept() {
        let page = Url::parse("https://example.com/a/b/item").unwrap();
        assert_eq!(
            resolve_image_url(&page, "https://cdn.example.com/x.png").as_deref(),
            Some("https://cdn.example.com/x.png")
        );
    }

    #[test]
    fn relative_images_resolve_against_origin() {
        let page = Url::parse("https://example.com/a/b/item?q=1").unwrap();
        assert_eq!(
            resolve_image_url(&page, "/img.png").as_deref(),
            Some("https://example.com/img.png")
        );
        assert_eq!(
            resolve_image_url(&page, "img.png").as_deref(),
            Some("https://example.com/img.png")
        );
        assert_eq!(
            resolve_image_url(&page, "//cdn.example.com/img.png").as_deref(),
            Some("https://cdn.example.com/img.png")
        );
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 255), "short");
        assert_eq!(truncate_chars(&"x".repeat(600), 500).chars().count(), 500);
    }
}
