use std::sync::Arc;
use url::Url;

use wishlist::config::ScraperConfig;
use wishlist::scraper::{
    HttpFetcher, NoopImageProbe, PageFetcher, ScrapeError, Scraper, MAX_TITLE_CHARS,
};

const PRODUCT_PAGE: &str = r#"<!doctype html>
<html>
<head>
  <title>Fallback title</title>
  <meta property="og:title" content="Espresso Machine">
  <meta name="description" content="Fifteen bar pump, steam wand.">
  <meta property="og:image" content="/media/espresso.jpg">
</head>
<body>
  <span class="sales-price">$149.00</span>
  <div itemprop="price">$199.00</div>
</body>
</html>"#;

fn scraper() -> Scraper {
    let config = ScraperConfig::default();
    let fetcher = HttpFetcher::new(&config).unwrap();
    Scraper::new(Arc::new(fetcher), Arc::new(NoopImageProbe), &config)
}

#[tokio::test]
async fn fetcher_sends_browser_headers() {
    let mut server = mockito::Server::new_async().await;
    let config = ScraperConfig::default();
    let mock = server
        .mock("GET", "/page")
        .match_header("user-agent", config.user_agent.as_str())
        .match_header("accept-language", config.accept_language.as_str())
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html></html>")
        .create_async()
        .await;

    let fetcher = HttpFetcher::new(&config).unwrap();
    let url = Url::parse(&format!("{}/page", server.url())).unwrap();
    let html = fetcher.fetch(&url).await.unwrap();

    assert_eq!(html, "<html></html>");
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/missing")
        .with_status(404)
        .with_body("not here")
        .create_async()
        .await;

    let url = format!("{}/missing", server.url());
    let result = scraper().scrape(&url).await;
    assert!(matches!(result, Err(ScrapeError::Status(404))));
}

#[tokio::test]
async fn scrapes_a_served_page() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/espresso")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(PRODUCT_PAGE)
        .create_async()
        .await;

    let url = format!("{}/espresso", server.url());
    let product = scraper().scrape(&url).await.unwrap();

    assert_eq!(product.title, "Espresso Machine");
    assert_eq!(product.description, "Fifteen bar pump, steam wand.");
    assert_eq!(product.image_url, format!("{}/media/espresso.jpg", server.url()));
    assert_eq!(product.price, "$199.00");
    assert_eq!(product.domain, "127.0.0.1");
    assert_eq!(product.url, url);
}

#[tokio::test]
async fn absolute_images_are_kept() {
    let mut server = mockito::Server::new_async().await;
    let long_title = "Very long product name ".repeat(20);
    let body = format!(
        r#"<html><head><meta property="og:title" content="{long_title}">
           <meta name="twitter:image" content="https://cdn.example.net/a.png"></head></html>"#
    );
    server
        .mock("GET", "/long")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let product = scraper()
        .scrape(&format!("{}/long", server.url()))
        .await
        .unwrap();

    assert_eq!(product.image_url, "https://cdn.example.net/a.png");
    assert_eq!(product.title.chars().count(), MAX_TITLE_CHARS);
    assert_eq!(product.price, "");
}
