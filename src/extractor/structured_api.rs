// src/extractor/structured_api.rs

use super::{LinkExtractor, utils};
use crate::{
    client::RobustClient,
    constants,
    error::*,
    models::{CandidateLink, CanonicalUrl, Extraction, Platform, api::ResolverPayload},
};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::Value;
use std::{collections::HashMap, sync::Arc, time::Duration};
use url::Url;

/// 嵌套 `data` 的最大层数
const MAX_NESTING: usize = 3;

/// 调用第三方解析接口，接口返回键值结构 (JSON)。
pub struct StructuredApiExtractor {
    name: String,
    http_client: Arc<RobustClient>,
    endpoints: HashMap<Platform, String>,
    request_timeout: Duration,
}

impl StructuredApiExtractor {
    pub fn new(
        name: impl Into<String>,
        http_client: Arc<RobustClient>,
        endpoints: HashMap<Platform, String>,
        request_timeout: Duration,
    ) -> Self {
        Self { name: name.into(), http_client, endpoints, request_timeout }
    }

    /// 把已知的几种响应形态映射为候选链接。外层没有链接时再看 `data`。
    pub fn map_response(&self, body: &Value, endpoint: &str) -> Extraction {
        let mut current = Some(body.clone());
        let mut title = None;
        let mut audio = None;

        for depth in 0..MAX_NESTING {
            let Some(value) = current.take() else { break };
            if !value.is_object() {
                break;
            }
            let payload: ResolverPayload = match serde_json::from_value(value) {
                Ok(p) => p,
                Err(e) => {
                    debug!("[{}] 第 {} 层响应结构不符: {}", self.name, depth, e);
                    break;
                }
            };
            title = title.or_else(|| payload.title.clone());
            audio = audio.or_else(|| payload.music.as_deref().and_then(|m| absolutize(m, endpoint)));

            let links = self.links_from_payload(&payload, endpoint);
            if !links.is_empty() {
                debug!("[{}] 在第 {} 层找到 {} 个链接", self.name, depth, links.len());
                return Extraction { links, title, audio };
            }
            current = payload.data;
        }

        Extraction { links: vec![], title, audio }
    }

    fn links_from_payload(&self, payload: &ResolverPayload, endpoint: &str) -> Vec<CandidateLink> {
        let mut found: Vec<(String, String)> = Vec::new();
        let mut push = |url: Option<&String>, quality: &str| {
            if let Some(u) = url.and_then(|u| absolutize(u, endpoint)) {
                found.push((u, quality.to_string()));
            }
        };

        // TikTok 类: play 为无水印视频，wmplay 只在没有 play 时使用
        push(payload.hdplay.as_ref(), constants::QUALITY_HD);
        push(payload.play.as_ref(), constants::GENERIC_QUALITY);
        if payload.play.is_none() && payload.hdplay.is_none() {
            push(payload.wmplay.as_ref(), constants::GENERIC_QUALITY);
        }

        // Facebook 类
        push(payload.hd.as_ref(), constants::QUALITY_HD);
        push(payload.sd.as_ref(), constants::QUALITY_SD);

        for item in payload.links.iter().chain(payload.medias.iter()) {
            let quality = item
                .quality
                .as_deref()
                .and_then(utils::infer_quality)
                .unwrap_or(constants::GENERIC_QUALITY);
            push(Some(&item.url), quality);
        }

        for single in [&payload.url, &payload.video, &payload.download_url] {
            push(single.as_ref(), constants::GENERIC_QUALITY);
        }

        found
            .into_iter()
            .map(|(url, quality)| CandidateLink::new(url, quality, &self.name))
            .collect()
    }
}

/// 相对路径按接口地址补全为绝对链接，其他非 http 链接丢弃
fn absolutize(media: &str, endpoint: &str) -> Option<String> {
    let media = media.trim();
    if media.is_empty() {
        return None;
    }
    if utils::is_absolute_http(media) {
        return Some(media.to_string());
    }
    if media.starts_with('/') {
        return Url::parse(endpoint)
            .and_then(|base| base.join(media))
            .ok()
            .map(|u| u.to_string());
    }
    None
}

#[async_trait]
impl LinkExtractor for StructuredApiExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn attempt(&self, target: &CanonicalUrl, _original_url: &str) -> Result<Extraction, StrategyError> {
        let template = self.endpoints.get(&target.platform).ok_or_else(|| {
            StrategyError::unsupported(format!("未配置 {} 平台的解析接口", target.platform))
        })?;
        let endpoint = utils::fill_template(template, target);
        info!("[{}] 请求解析接口: {}", self.name, endpoint);

        let body = self.http_client.get_text(&endpoint, self.request_timeout).await?;
        let value: Value = serde_json::from_str(&body).map_err(|e| {
            warn!("[{}] 接口返回的不是合法 JSON: {}", self.name, e);
            StrategyError::unparsable(format!("无法解析接口响应: {}", e))
        })?;

        let mut extraction = self.map_response(&value, &endpoint);
        if extraction.title.is_none() && target.platform == Platform::ShortVideo && !extraction.links.is_empty() {
            extraction.title = Some(constants::messages::DEFAULT_SHORT_VIDEO_TITLE.to_string());
        }
        Ok(extraction)
    }
}
