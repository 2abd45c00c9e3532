// src/extractor/pattern_scan.rs

use super::{LinkExtractor, utils};
use crate::{
    client::RobustClient,
    constants,
    error::*,
    models::{CandidateLink, CanonicalUrl, Extraction, Platform},
    normalize::unescape_media_url,
};
use async_trait::async_trait;
use log::{debug, info, trace};
use regex::Regex;
use std::{collections::HashMap, sync::Arc, sync::LazyLock, time::Duration};

/// 一条扫描规则: 匹配器、捕获组、反转义方式，以及可选的固定清晰度
pub struct PatternRule {
    pub name: &'static str,
    pub matcher: Regex,
    pub group: usize,
    pub unescape: fn(&str) -> String,
    /// 规则本身的键名已表明清晰度时 (如 `hd_src`) 直接使用
    pub quality: Option<&'static str>,
}

fn html_unescape(s: &str) -> String {
    s.replace("&amp;", "&").replace("&quot;", "\"").replace("&#x2F;", "/").replace("&#39;", "'")
}

fn rule(
    name: &'static str,
    pattern: &str,
    unescape: fn(&str) -> String,
    quality: Option<&'static str>,
) -> PatternRule {
    PatternRule { name, matcher: Regex::new(pattern).unwrap(), group: 1, unescape, quality }
}

/// 按优先级排列的规则表
pub static PATTERN_RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    let json = unescape_media_url as fn(&str) -> String;
    let html = html_unescape as fn(&str) -> String;
    let hd = Some(constants::QUALITY_HD);
    let sd = Some(constants::QUALITY_SD);
    vec![
        rule("playable_url_quality_hd", r#""playable_url_quality_hd"\s*:\s*"([^"]+)""#, json, hd),
        rule("browser_native_hd_url", r#""browser_native_hd_url"\s*:\s*"([^"]+)""#, json, hd),
        rule("hd_src", r#""?hd_src(?:_no_ratelimit)?"?\s*:\s*"([^"]+)""#, json, hd),
        rule("playable_url", r#""playable_url"\s*:\s*"([^"]+)""#, json, sd),
        rule("browser_native_sd_url", r#""browser_native_sd_url"\s*:\s*"([^"]+)""#, json, sd),
        rule("sd_src", r#""?sd_src(?:_no_ratelimit)?"?\s*:\s*"([^"]+)""#, json, sd),
        rule("playAddr", r#""playAddr"\s*:\s*"([^"]+)""#, json, None),
        rule("downloadAddr", r#""downloadAddr"\s*:\s*"([^"]+)""#, json, None),
        rule(
            "og:video",
            r#"<meta[^>]+property="og:video(?::secure_url|:url)?"[^>]+content="([^"]+)""#,
            html,
            None,
        ),
        rule("video_src", r#"<video[^>]+src="([^"]+)""#, html, None),
    ]
});

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<meta[^>]+property="og:title"[^>]+content="([^"]*)"|<title[^>]*>(.*?)</title>"#).unwrap()
});

/// 在原始页面文本中扫描媒体链接
pub fn scan_document(text: &str, source: &str) -> Vec<CandidateLink> {
    let mut links = Vec::new();
    for rule in PATTERN_RULES.iter() {
        for caps in rule.matcher.captures_iter(text) {
            let Some(m) = caps.get(rule.group) else { continue };
            let url = (rule.unescape)(m.as_str());
            if !utils::looks_like_media(&url) {
                trace!("规则 '{}' 命中但不像媒体链接: {}", rule.name, url);
                continue;
            }
            let quality = rule
                .quality
                .or_else(|| utils::infer_quality(&url))
                .unwrap_or(constants::GENERIC_QUALITY);
            debug!("规则 '{}' 命中 ({}): {}", rule.name, quality, url);
            links.push(CandidateLink::new(url, quality, source));
        }
    }
    links
}

pub fn scan_title(text: &str) -> Option<String> {
    TITLE_RE
        .captures(text)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| html_unescape(m.as_str().trim()))
        .filter(|t| !t.is_empty())
}

/// 直接抓取目标页面，用正则在原始 HTML 中查找嵌入的视频地址。
pub struct RawPatternExtractor {
    name: String,
    http_client: Arc<RobustClient>,
    endpoints: HashMap<Platform, String>,
    request_timeout: Duration,
}

impl RawPatternExtractor {
    pub fn new(
        name: impl Into<String>,
        http_client: Arc<RobustClient>,
        endpoints: HashMap<Platform, String>,
        request_timeout: Duration,
    ) -> Self {
        Self { name: name.into(), http_client, endpoints, request_timeout }
    }
}

#[async_trait]
impl LinkExtractor for RawPatternExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn attempt(&self, target: &CanonicalUrl, _original_url: &str) -> Result<Extraction, StrategyError> {
        // 未配置时直接抓取规范化链接本身
        let template = self
            .endpoints
            .get(&target.platform)
            .map(String::as_str)
            .unwrap_or(constants::placeholders::RAW);
        let page_url = utils::fill_template(template, target);
        info!("[{}] 抓取页面: {}", self.name, page_url);

        let text = self.http_client.get_text(&page_url, self.request_timeout).await?;
        let links = scan_document(&text, &self.name);
        debug!("[{}] 页面扫描得到 {} 个候选", self.name, links.len());

        Ok(Extraction { links, title: scan_title(&text), audio: None })
    }
}
