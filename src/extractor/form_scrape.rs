// src/extractor/form_scrape.rs

use super::{LinkExtractor, utils};
use crate::{
    client::RobustClient,
    error::*,
    models::{CandidateLink, CanonicalUrl, Extraction, Platform},
};
use async_trait::async_trait;
use log::{debug, info};
use scraper::{Html, Selector};
use std::{collections::HashMap, sync::Arc, sync::LazyLock, time::Duration};

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, .title, title").unwrap());

/// 把链接作为表单字段提交给网页版下载站，再从返回的 HTML 中挑出下载按钮。
pub struct FormScrapeExtractor {
    name: String,
    http_client: Arc<RobustClient>,
    endpoints: HashMap<Platform, String>,
    form_field: String,
    extra_fields: Vec<(String, String)>,
    request_timeout: Duration,
}

impl FormScrapeExtractor {
    pub fn new(
        name: impl Into<String>,
        http_client: Arc<RobustClient>,
        endpoints: HashMap<Platform, String>,
        form_field: impl Into<String>,
        extra_fields: Vec<(String, String)>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            http_client,
            endpoints,
            form_field: form_field.into(),
            extra_fields,
            request_timeout,
        }
    }

    /// 只保留文字或 href 标明了清晰度，且 href 是带协议的媒体链接的 `<a>`
    pub fn scrape_links(&self, html: &str) -> Extraction {
        let document = Html::parse_document(html);
        let mut links = Vec::new();

        for anchor in document.select(&ANCHOR_SELECTOR) {
            let Some(href) = anchor.value().attr("href").map(str::trim) else { continue };
            if !utils::looks_like_media(href) {
                continue;
            }
            let text = anchor.text().collect::<Vec<_>>().join(" ");
            let quality = utils::infer_quality(&text).or_else(|| utils::infer_quality(href));
            match quality {
                Some(q) => {
                    debug!("[{}] 下载按钮 '{}' -> {}", self.name, text.trim(), href);
                    links.push(CandidateLink::new(href, q, &self.name));
                }
                None => debug!("[{}] 忽略无清晰度标记的链接: {}", self.name, href),
            }
        }

        let title = document
            .select(&TITLE_SELECTOR)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .find(|t| !t.is_empty());

        Extraction { links, title, audio: None }
    }
}

#[async_trait]
impl LinkExtractor for FormScrapeExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn attempt(&self, target: &CanonicalUrl, _original_url: &str) -> Result<Extraction, StrategyError> {
        let template = self.endpoints.get(&target.platform).ok_or_else(|| {
            StrategyError::unsupported(format!("未配置 {} 平台的表单地址", target.platform))
        })?;
        let endpoint = utils::fill_template(template, target);

        let mut fields = vec![(self.form_field.clone(), target.url.clone())];
        fields.extend(self.extra_fields.iter().cloned());
        info!("[{}] 提交表单至 {} (字段 '{}')", self.name, endpoint, self.form_field);

        let html = self
            .http_client
            .post_form(&endpoint, &fields, self.request_timeout)
            .await?;
        Ok(self.scrape_links(&html))
    }
}
