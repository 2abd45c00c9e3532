// src/payload.rs

use crate::{
    constants::messages,
    models::{Platform, ResolutionResult},
    resolver::LinkResolver,
};
use log::{error, warn};
use serde::Serialize;

/// 下载接口的响应结构: `{success, data}` 或 `{success, error}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponsePayload {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseData {
    pub title: Option<String>,
    pub links: Vec<LinkData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    pub strategy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkData {
    pub url: String,
    pub quality: String,
}

impl ResponsePayload {
    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(message.into()) }
    }

    /// 空结果映射为 "未找到"，否则映射为成功载荷
    pub fn from_result(result: &ResolutionResult, platform: Platform) -> Self {
        if !result.is_found() {
            let message = match platform {
                Platform::ShortVideo => messages::SHORT_VIDEO_FAILED,
                Platform::SocialVideo => messages::SOCIAL_VIDEO_NOT_FOUND,
            };
            return Self::failure(message);
        }
        Self {
            success: true,
            data: Some(ResponseData {
                title: result.title.clone(),
                links: result
                    .links
                    .iter()
                    .map(|l| LinkData { url: l.media_url.clone(), quality: l.quality.clone() })
                    .collect(),
                audio: result.audio.clone(),
                strategy: result.succeeded_strategy.clone(),
            }),
            error: None,
        }
    }
}

/// 请求处理方的职责: 校验输入、调用解析器、把三种结局 (找到 / 未找到 / 内部错误) 映射为响应
pub async fn handle_download_request(
    resolver: &LinkResolver,
    url: Option<&str>,
    platform: Option<&str>,
) -> ResponsePayload {
    let url = url.map(str::trim).filter(|s| !s.is_empty());
    let platform_hint = platform.map(str::trim).filter(|s| !s.is_empty());
    let (Some(url), Some(platform_hint)) = (url, platform_hint) else {
        warn!("请求缺少 url 或 platform");
        return ResponsePayload::failure(messages::MISSING_DATA);
    };
    let Some(platform) = Platform::from_hint(platform_hint) else {
        warn!("不支持的平台: '{}'", platform_hint);
        return ResponsePayload::failure(messages::INVALID_PLATFORM);
    };

    match resolver.resolve(url, platform).await {
        Ok(result) => ResponsePayload::from_result(&result, platform),
        Err(e) => {
            error!("解析 '{}' 时发生内部错误: {}", url, e);
            ResponsePayload::failure(messages::DOWNLOAD_FAILED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateLink, CanonicalUrl};

    fn result(links: Vec<CandidateLink>) -> ResolutionResult {
        ResolutionResult {
            succeeded_strategy: links.first().map(|l| l.source_strategy.clone()),
            links,
            title: Some("T".into()),
            audio: Some("https://cdn/x.mp3".into()),
            canonical: CanonicalUrl {
                url: "https://fb.watch/x".into(),
                original: "https://fb.watch/x".into(),
                platform: Platform::SocialVideo,
                video_id: None,
                degraded: None,
            },
            diagnostic: vec![],
        }
    }

    #[test]
    fn test_not_found_messages_per_platform() {
        let empty = result(vec![]);
        assert_eq!(
            ResponsePayload::from_result(&empty, Platform::SocialVideo).error.as_deref(),
            Some(messages::SOCIAL_VIDEO_NOT_FOUND)
        );
        assert_eq!(
            ResponsePayload::from_result(&empty, Platform::ShortVideo).error.as_deref(),
            Some(messages::SHORT_VIDEO_FAILED)
        );
    }

    #[test]
    fn test_success_payload_serialization() {
        let found = result(vec![CandidateLink::new("https://cdn/hd.mp4", "HD", "api")]);
        let payload = ResponsePayload::from_result(&found, Platform::SocialVideo);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "data": {
                    "title": "T",
                    "links": [{"url": "https://cdn/hd.mp4", "quality": "HD"}],
                    "audio": "https://cdn/x.mp3",
                    "strategy": "api"
                }
            })
        );
    }
}
