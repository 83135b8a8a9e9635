//! 商品页面抓取
//!
//! [`Scraper::scrape`] 下载页面并执行 [`extract`] 中的提取规则；对配置中列出的
//! 零售站点会额外用无头浏览器读取图片，最后把结果规整到存储列的长度限制内。

use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use crate::config::{BrowserOverride, ScraperConfig};

pub mod browser;
pub mod extract;
pub mod fetch;
pub mod urls;

pub use browser::{BrowserImageProbe, ImageProbe, NoopImageProbe};
pub use extract::{extract_metadata, PageMetadata};
pub use fetch::{HttpFetcher, PageFetcher};

pub const MAX_TITLE_CHARS: usize = 255;
pub const MAX_DESCRIPTION_CHARS: usize = 500;
pub const UNKNOWN_TITLE: &str = "Unknown Product";

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("unexpected status code {0}")]
    Status(u16),
    #[error("http client error: {0}")]
    Client(String),
}

/// 从商品页面抓取到的全部信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedProduct {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub url: String,
    pub price: String,
    pub domain: String,
}

pub struct Scraper {
    fetcher: Arc<dyn PageFetcher>,
    probe: Arc<dyn ImageProbe>,
    overrides: Vec<BrowserOverride>,
    placeholder_image_url: String,
}

impl Scraper {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        probe: Arc<dyn ImageProbe>,
        config: &ScraperConfig,
    ) -> Self {
        Self {
            fetcher,
            probe,
            overrides: config.browser.overrides.clone(),
            placeholder_image_url: config.placeholder_image_url.clone(),
        }
    }

    /// HTTP 下载器，启用时再加上基于 Chromium 的图片读取
    pub fn from_config(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let fetcher = Arc::new(HttpFetcher::new(config)?);
        let probe: Arc<dyn ImageProbe> = if config.browser.enabled {
            Arc::new(BrowserImageProbe::new(&config.browser, config.user_agent.clone()))
        } else {
            Arc::new(NoopImageProbe)
        };
        Ok(Self::new(fetcher, probe, config))
    }

    /// 查找 `domain_contains` 出现在 `domain` 中的浏览器规则
    pub fn override_for(&self, domain: &str) -> Option<&BrowserOverride> {
        if domain.is_empty() {
            return None;
        }
        self.overrides
            .iter()
            .find(|rule| !rule.domain_contains.is_empty() && domain.contains(&rule.domain_contains))
    }

    /// 下载并提取。下载失败则整个抓取失败；浏览器读取失败只会沿用页面中的图片
    pub async fn scrape(&self, url: &str) -> Result<ScrapedProduct, ScrapeError> {
        let page_url = Url::parse(url).map_err(|e| ScrapeError::InvalidUrl(e.to_string()))?;

        let html = self.fetcher.fetch(&page_url).await?;
        let metadata = extract_metadata(&html);

        let domain = urls::extract_domain(url);
        debug!(%domain, "extracted domain");

        let mut image = metadata.image;
        if let Some(rule) = self.override_for(&domain) {
            info!(%domain, selector = %rule.image_selector, "reading product image with headless browser");
            if let Some(found) = self.probe.probe_image(&page_url, &rule.image_selector).await {
                image = Some(found);
            }
        }

        let image_url = image
            .and_then(|image| urls::resolve_image_url(&page_url, &image))
            .unwrap_or_else(|| self.placeholder_image_url.clone());

        let title = metadata
            .title
            .map(|title| urls::truncate_chars(&title, MAX_TITLE_CHARS))
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        let description = metadata
            .description
            .map(|description| urls::truncate_chars(&description, MAX_DESCRIPTION_CHARS))
            .unwrap_or_default();

        Ok(ScrapedProduct {
            title,
            description,
            image_url,
            url: url.to_string(),
            price: metadata.price,
            domain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StaticPage(String);

    #[async_trait]
    impl PageFetcher for StaticPage {
        async fn fetch(&self, _url: &Url) -> Result<String, ScrapeError> {
            Ok(self.0.clone())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl PageFetcher for FailingFetcher {
        async fn fetch(&self, _url: &Url) -> Result<String, ScrapeError> {
            Err(ScrapeError::Status(503))
        }
    }

    #[derive(Default)]
    struct RecordingProbe {
        answer: Option<String>,
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ImageProbe for RecordingProbe {
        async fn probe_image(&self, url: &Url, selector: &str) -> Option<String> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), selector.to_string()));
            self.answer.clone()
        }
    }

    fn scraper(html: &str, probe: Arc<RecordingProbe>) -> Scraper {
        Scraper::new(
            Arc::new(StaticPage(html.to_string())),
            probe,
            &ScraperConfig::default(),
        )
    }

    const WIDGET: &str = r#"<html><head>
        <meta property="og:title" content="Widget">
        <meta property="og:image" content="/img.png">
        </head><body></body></html>"#;

    #[tokio::test]
    async fn widget_scenario() {
        let product = scraper(WIDGET, Arc::default())
            .scrape("https://example.com/item")
            .await
            .unwrap();

        assert_eq!(product.title, "Widget");
        assert_eq!(product.image_url, "https://example.com/img.png");
        assert_eq!(product.price, "");
        assert_eq!(product.description, "");
        assert_eq!(product.domain, "example.com");
        assert_eq!(product.url, "https://example.com/item");
    }

    #[tokio::test]
    async fn missing_image_uses_placeholder() {
        let product = scraper("<html><head><title>Bare</title></head></html>", Arc::default())
            .scrape("https://www.example.com/bare")
            .await
            .unwrap();

        assert_eq!(product.image_url, ScraperConfig::default().placeholder_image_url);
        assert_eq!(product.title, "Bare");
        assert_eq!(product.domain, "example.com");
    }

    #[tokio::test]
    async fn missing_title_defaults() {
        let product = scraper("<html><body></body></html>", Arc::default())
            .scrape("https://example.com/x")
            .await
            .unwrap();
        assert_eq!(product.title, UNKNOWN_TITLE);
    }

    #[tokio::test]
    async fn long_fields_are_truncated() {
        let html = format!(
            r#"<html><head><meta property="og:title" content="{}">
               <meta name="description" content="{}"></head></html>"#,
            "T".repeat(1000),
            "D".repeat(2000)
        );
        let product = scraper(&html, Arc::default())
            .scrape("https://example.com/long")
            .await
            .unwrap();

        assert_eq!(product.title.chars().count(), MAX_TITLE_CHARS);
        assert_eq!(product.description.chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[tokio::test]
    async fn fetch_failure_fails_the_scrape() {
        let scraper = Scraper::new(
            Arc::new(FailingFetcher),
            Arc::new(NoopImageProbe),
            &ScraperConfig::default(),
        );
        assert!(matches!(
            scraper.scrape("https://example.com/down").await,
            Err(ScrapeError::Status(503))
        ));
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_before_fetching() {
        let scraper = Scraper::new(
            Arc::new(FailingFetcher),
            Arc::new(NoopImageProbe),
            &ScraperConfig::default(),
        );
        assert!(matches!(
            scraper.scrape("example.com/item").await,
            Err(ScrapeError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn override_domain_uses_probe_image() {
        let probe = Arc::new(RecordingProbe {
            answer: Some("https://m.media-amazon.com/images/I/big.jpg".to_string()),
            ..Default::default()
        });
        let product = scraper(WIDGET, probe.clone())
            .scrape("https://www.amazon.com/dp/B000")
            .await
            .unwrap();

        assert_eq!(product.image_url, "https://m.media-amazon.com/images/I/big.jpg");
        let calls = probe.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "#imgTagWrapperId img");
    }

    #[tokio::test]
    async fn probe_failure_keeps_page_image() {
        let probe = Arc::new(RecordingProbe::default());
        let product = scraper(WIDGET, probe.clone())
            .scrape("https://www.amazon.de/dp/B000")
            .await
            .unwrap();

        assert_eq!(product.image_url, "https://www.amazon.de/img.png");
        assert_eq!(probe.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn other_domains_skip_the_probe() {
        let probe = Arc::new(RecordingProbe::default());
        scraper(WIDGET, probe.clone())
            .scrape("https://example.com/item")
            .await
            .unwrap();
        assert!(probe.calls.lock().unwrap().is_empty());
    }
}
