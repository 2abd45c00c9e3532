// src/extractor/rendered.rs

use super::{LinkExtractor, utils};
use crate::{
    constants,
    error::*,
    models::{CandidateLink, CanonicalUrl, Extraction},
};
use async_trait::async_trait;
use log::{debug, info};
use std::{sync::Arc, time::Duration};

/// 无头浏览器渲染能力: 加载页面并返回主视频元素的地址 (若有)
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str, timeout: Duration) -> AppResult<Option<String>>;
}

/// 在页面中查找主视频元素的 JS。优先 currentSrc，其次 src 属性和 <source> 子元素。
pub const PRIMARY_MEDIA_JS: &str = r#"
(() => {
    const videos = Array.from(document.querySelectorAll('video'));
    for (const v of videos) {
        const src = v.currentSrc || v.getAttribute('src')
            || (v.querySelector('source[src]') || {}).src;
        if (src) { return src; }
    }
    return null;
})()
"#;

/// 用无头浏览器打开页面，从渲染后的 DOM 中读取视频地址。开销最大，放在最后。
pub struct RenderedPageExtractor {
    name: String,
    renderer: Option<Arc<dyn PageRenderer>>,
    render_timeout: Duration,
}

impl RenderedPageExtractor {
    pub fn new(name: impl Into<String>, renderer: Option<Arc<dyn PageRenderer>>, render_timeout: Duration) -> Self {
        Self { name: name.into(), renderer, render_timeout }
    }
}

#[async_trait]
impl LinkExtractor for RenderedPageExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn attempt(&self, target: &CanonicalUrl, _original_url: &str) -> Result<Extraction, StrategyError> {
        let renderer = self
            .renderer
            .as_ref()
            .ok_or_else(|| StrategyError::unsupported("当前构建未启用页面渲染 (headless 特性)"))?;

        info!("[{}] 渲染页面: {}", self.name, target.url);
        let Some(src) = renderer.render(&target.url, self.render_timeout).await? else {
            debug!("[{}] 页面中没有找到视频元素", self.name);
            return Ok(Extraction::default());
        };

        // blob: 地址只在浏览器内部有效，无法直接播放
        if !utils::is_absolute_http(&src) {
            debug!("[{}] 视频元素的地址不可直接使用: {}", self.name, src);
            return Ok(Extraction::default());
        }
        let quality = utils::infer_quality(&src).unwrap_or(constants::GENERIC_QUALITY);
        Ok(Extraction::from_links(vec![CandidateLink::new(src, quality, &self.name)]))
    }
}

#[cfg(feature = "headless")]
pub use chrome::ChromeRenderer;

#[cfg(feature = "headless")]
mod chrome {
    use super::{PRIMARY_MEDIA_JS, PageRenderer};
    use crate::{constants, error::*};
    use async_trait::async_trait;
    use headless_chrome::{Browser, LaunchOptionsBuilder};
    use log::{debug, warn};
    use std::{fmt::Display, path::PathBuf, time::Duration};

    fn render_err(e: impl Display) -> AppError {
        AppError::Render(e.to_string())
    }

    /// 基于 headless_chrome 的渲染器。浏览器操作是阻塞的，放到阻塞线程池执行。
    #[derive(Debug, Clone)]
    pub struct ChromeRenderer {
        chrome_path: Option<PathBuf>,
        settle: Duration,
    }

    impl ChromeRenderer {
        pub fn new(chrome_path: Option<PathBuf>, settle: Duration) -> Self {
            Self { chrome_path, settle }
        }

        fn render_blocking(&self, url: &str, timeout: Duration) -> AppResult<Option<String>> {
            let options = LaunchOptionsBuilder::default()
                .headless(true)
                .path(self.chrome_path.clone())
                .idle_browser_timeout(timeout + Duration::from_secs(5))
                .build()
                .map_err(render_err)?;
            let browser = Browser::new(options).map_err(render_err)?;
            let tab = browser.new_tab().map_err(render_err)?;
            tab.set_default_timeout(timeout);
            tab.set_user_agent(constants::USER_AGENT, Some("en-US,en"), None)
                .map_err(render_err)?;

            tab.navigate_to(url).map_err(render_err)?;
            tab.wait_until_navigated().map_err(render_err)?;

            // 没有网络静默事件可等，等视频元素出现或等满静置时间
            if tab.wait_for_element_with_custom_timeout("video", self.settle).is_err() {
                debug!("页面 '{}' 在 {:?} 内没有出现 <video> 元素", url, self.settle);
            }

            let result = tab.evaluate(PRIMARY_MEDIA_JS, false).map_err(render_err)?;
            let src = result
                .value
                .as_ref()
                .and_then(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());

            if let Err(e) = tab.close(true) {
                warn!("关闭浏览器标签页失败: {}", e);
            }
            Ok(src)
        }
    }

    #[async_trait]
    impl PageRenderer for ChromeRenderer {
        async fn render(&self, url: &str, timeout: Duration) -> AppResult<Option<String>> {
            let renderer = self.clone();
            let url = url.to_string();
            // 超时由解析链负责取消；被放弃的浏览器会在空闲超时后自行退出
            tokio::task::spawn_blocking(move || renderer.render_blocking(&url, timeout))
                .await
                .map_err(render_err)?
        }
    }
}
