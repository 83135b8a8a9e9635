//! 元数据提取规则
//!
//! 对 HTML 字符串的纯函数。每个字段有一组有序规则，第一个得到非空值的规则生效。

use ::scraper::{Html, Selector};

/// 页面中某个值的查找位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaRule {
    /// `<meta property="..." content="...">` (Open Graph)
    Property(&'static str),
    /// `<meta name="..." content="...">`
    Name(&'static str),
    /// `<title>` 元素的文本
    TitleElement,
}

pub const TITLE_RULES: &[MetaRule] = &[
    MetaRule::Property("og:title"),
    MetaRule::Name("twitter:title"),
    MetaRule::TitleElement,
];

pub const DESCRIPTION_RULES: &[MetaRule] = &[
    MetaRule::Property("og:description"),
    MetaRule::Name("description"),
    MetaRule::Name("twitter:description"),
];

pub const IMAGE_RULES: &[MetaRule] = &[
    MetaRule::Property("og:image"),
    MetaRule::Name("twitter:image"),
];

/// 按顺序尝试，第一个匹配到元素的选择器决定价格
pub const PRICE_SELECTORS: &[&str] = &[
    ".price",
    "#price",
    ".product-price",
    "[itemprop=\"price\"]",
    ".offer-price",
    ".sales-price",
    ".current-price",
];

/// 页面中提取的原始值，未经后处理
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    /// 没有选择器匹配时为空
    pub price: String,
}

impl MetaRule {
    pub fn apply(&self, document: &Html) -> Option<String> {
        let value = match self {
            MetaRule::Property(property) => meta_content(document, "property", property),
            MetaRule::Name(name) => meta_content(document, "name", name),
            MetaRule::TitleElement => {
                let selector = Selector::parse("title").ok()?;
                document
                    .select(&selector)
                    .next()
                    .map(|el| el.text().collect::<String>())
            }
        };

        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

fn meta_content(document: &Html, attribute: &str, value: &str) -> Option<String> {
    let selector = Selector::parse(&format!("meta[{attribute}=\"{value}\"]")).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string)
}

/// `rules` 中第一个非空值
pub fn first_match(document: &Html, rules: &[MetaRule]) -> Option<String> {
    rules.iter().find_map(|rule| rule.apply(document))
}

/// 第一个命中的选择器所匹配的第一个元素的文本
pub fn extract_price(document: &Html) -> String {
    for raw in PRICE_SELECTORS {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            return element.text().collect::<String>().trim().to_string();
        }
    }
    String::new()
}

pub fn extract_metadata(html: &str) -> PageMetadata {
    let document = Html::parse_document(html);

    PageMetadata {
        title: first_match(&document, TITLE_RULES),
        description: first_match(&document, DESCRIPTION_RULES),
        image: first_match(&document, IMAGE_RULES),
        price: extract_price(&document),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(head: &str, body: &str) -> String {
        format!("<!doctype html><html><head>{head}</head><body>{body}</body></html>")
    }

    #[test]
    fn open_graph_wins_over_everything() {
        let html = page(
            r#"<title>Page title</title>
               <meta name="twitter:title" content="Twitter title">
               <meta property="og:title" content="OG title">"#,
            "",
        );
        assert_eq!(extract_metadata(&html).title.as_deref(), Some("OG title"));
    }

    #[test]
    fn falls_back_to_twitter_then_title_element() {
        let twitter = page(
            r#"<title>Page title</title><meta name="twitter:title" content="Twitter title">"#,
            "",
        );
        assert_eq!(extract_metadata(&twitter).title.as_deref(), Some("Twitter title"));

        let plain = page("<title>\n   Page title  \n</title>", "");
        assert_eq!(extract_metadata(&plain).title.as_deref(), Some("Page title"));
    }

    #[test]
    fn empty_values_are_skipped() {
        let html = page(
            r#"<meta property="og:title" content="">
               <meta property="og:description" content="  ">
               <meta name="description" content="Standard description">"#,
            "",
        );
        let metadata = extract_metadata(&html);
        assert_eq!(metadata.title, None);
        assert_eq!(metadata.description.as_deref(), Some("Standard description"));
    }

    #[test]
    fn description_order() {
        let html = page(
            r#"<meta name="twitter:description" content="Twitter">
               <meta name="description" content="Standard">"#,
            "",
        );
        assert_eq!(first_match(&Html::parse_document(&html), DESCRIPTION_RULES).as_deref(), Some("Standard"));
    }

    #[test]
    fn image_prefers_open_graph() {
        let html = page(
            r#"<meta name="twitter:image" content="https://cdn.example.com/t.png">
               <meta property="og:image" content="/img.png">"#,
            "",
        );
        assert_eq!(extract_metadata(&html).image.as_deref(), Some("/img.png"));
    }

    #[test]
    fn price_uses_first_matching_selector_in_list_order() {
        let html = page(
            "",
            r#"<span class="current-price">$9.99</span>
               <div id="price"> $12.50 </div>"#,
        );
        assert_eq!(extract_metadata(&html).price, "$12.50");
    }

    #[test]
    fn price_collects_nested_text() {
        let html = page("", r#"<p class="price"><span>$</span><b>3</b>.00</p>"#);
        assert_eq!(extract_price(&Html::parse_document(&html)), "$3.00");
    }

    #[test]
    fn matched_but_empty_price_stops_the_search() {
        let html = page("", r#"<div class="price"></div><div class="offer-price">$1</div>"#);
        assert_eq!(extract_metadata(&html).price, "");
    }

    #[test]
    fn nothing_found() {
        let metadata = extract_metadata("<html><body><p>hello</p></body></html>");
        assert_eq!(metadata, PageMetadata::default());
    }
}
