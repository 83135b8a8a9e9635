//! 无头浏览器图片读取
//!
//! 部分零售站点只有在脚本执行后才暴露真实的商品图片。对这些站点，
//! 启动一个临时的 Chromium 会话加载页面，读取配置的图片元素的 `src` 属性值。

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::error::CdpError;
use futures::StreamExt;
use serde_json::Value;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, trace, warn};
use url::Url;

use crate::config::BrowserConfig;

/// 从渲染后的页面读取图片地址，`None` 表示沿用 HTML 中的结果
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn probe_image(&self, url: &Url, selector: &str) -> Option<String>;
}

/// 浏览器关闭时使用
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopImageProbe;

#[async_trait]
impl ImageProbe for NoopImageProbe {
    async fn probe_image(&self, _url: &Url, _selector: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct BrowserImageProbe {
    navigation_timeout: Duration,
    selector_timeout: Duration,
    user_agent: String,
}

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

impl BrowserImageProbe {
    pub fn new(config: &BrowserConfig, user_agent: impl Into<String>) -> Self {
        Self {
            navigation_timeout: Duration::from_secs(config.navigation_timeout_seconds),
            selector_timeout: Duration::from_secs(config.selector_timeout_seconds),
            user_agent: user_agent.into(),
        }
    }

    async fn launch(&self) -> Result<(Browser, tokio::task::JoinHandle<()>)> {
        let config = ChromeConfig::builder()
            .request_timeout(self.navigation_timeout)
            .arg(format!("--user-agent={}", self.user_agent))
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(|e| anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch browser")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    trace!(error = %e, "browser handler event error");
                }
            }
        });

        Ok((browser, handler_task))
    }

    async fn read_image_src(&self, browser: &Browser, url: &Url, selector: &str) -> Result<String> {
        let page = timeout(self.navigation_timeout, async {
            let page = browser.new_page(url.as_str()).await?;
            page.wait_for_navigation().await?;
            Ok::<_, CdpError>(page)
        })
        .await
        .context("page navigation timed out")??;

        let element = timeout(self.selector_timeout, async {
            loop {
                match page.find_element(selector).await {
                    Ok(element) => return element,
                    Err(_) => sleep(SELECTOR_POLL_INTERVAL).await,
                }
            }
        })
        .await
        .with_context(|| format!("selector {selector:?} did not appear"))?;

        // DOM 属性 `src` 已由浏览器按页面地址解析为绝对地址
        src_from_property(element.property("src").await?)
            .ok_or_else(|| anyhow!("image element has no src"))
    }
}

fn src_from_property(value: Option<Value>) -> Option<String> {
    value
        .as_ref()
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string)
}

/// 浏览器进程的关闭操作
#[async_trait]
trait BrowserSession: Send {
    async fn close(&mut self) -> Result<()>;
    async fn kill(&mut self) -> Result<()>;
    async fn wait(&mut self) -> Result<()>;
}

#[async_trait]
impl BrowserSession for Browser {
    async fn close(&mut self) -> Result<()> {
        Browser::close(self).await?;
        Ok(())
    }

    async fn kill(&mut self) -> Result<()> {
        match Browser::kill(self).await {
            Some(Err(e)) => Err(e.into()),
            _ => Ok(()),
        }
    }

    async fn wait(&mut self) -> Result<()> {
        Browser::wait(self).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shutdown {
    Closed,
    Killed,
}

/// 正常关闭后等待进程退出；关闭失败时直接结束进程，不再等待
async fn shutdown<S: BrowserSession + ?Sized>(session: &mut S) -> Shutdown {
    match session.close().await {
        Ok(()) => {
            if let Err(e) = session.wait().await {
                warn!(error = %e, "browser process did not exit cleanly");
            }
            Shutdown::Closed
        }
        Err(e) => {
            warn!(error = %e, "failed to close browser, killing it");
            if let Err(e) = session.kill().await {
                warn!(error = %e, "failed to kill browser");
            }
            Shutdown::Killed
        }
    }
}

#[async_trait]
impl ImageProbe for BrowserImageProbe {
    async fn probe_image(&self, url: &Url, selector: &str) -> Option<String> {
        let (mut browser, handler_task) = match self.launch().await {
            Ok(launched) => launched,
            Err(e) => {
                warn!(error = %e, "headless browser unavailable");
                return None;
            }
        };

        let result = self.read_image_src(&browser, url, selector).await;

        let outcome = shutdown(&mut browser).await;
        debug!(?outcome, "browser shut down");
        handler_task.abort();

        match result {
            Ok(src) => {
                debug!(%url, %src, "image found with headless browser");
                Some(src)
            }
            Err(e) => {
                warn!(%url, error = %e, "failed to read product image with headless browser");
                None
            }
        }
    }
}
