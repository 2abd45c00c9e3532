// src/canonical.rs

use crate::{
    error::AppResult,
    models::{CanonicalUrl, Platform},
};
use async_trait::async_trait;
use log::{debug, info, warn};
use regex::Regex;
use std::{sync::Arc, sync::LazyLock, time::Duration};

/// 跟随重定向的能力。生产环境由 `RobustClient` 实现。
#[async_trait]
pub trait RedirectResolver: Send + Sync {
    async fn final_location(&self, url: &str, timeout: Duration) -> AppResult<String>;
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

// 直接形态: 第一个捕获组即视频 ID，按顺序匹配，先匹配者胜出
static SHORT_VIDEO_DIRECT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)^https?://(?:www\.|m\.)?tiktok\.com/@[^/?#]+/(?:video|photo)/(\d+)",
        r"(?i)^https?://(?:www\.|m\.)?tiktok\.com/(?:v|embed/v2|embed)/(\d+)",
    ])
});
static SHORT_VIDEO_INDIRECT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)^https?://(?:vm|vt)\.tiktok\.com/[\w-]+",
        r"(?i)^https?://(?:www\.|m\.)?tiktok\.com/t/[\w-]+",
    ])
});
static SOCIAL_VIDEO_DIRECT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)^https?://(?:www\.|m\.|web\.)?facebook\.com/watch/?\?(?:[^#]*&)?v=(\d+)",
        r"(?i)^https?://(?:www\.|m\.|web\.)?facebook\.com/[^/?#]+/videos/(?:[^/?#]+/)?(\d+)",
        r"(?i)^https?://(?:www\.|m\.|web\.)?facebook\.com/reel/(\d+)",
        r"(?i)^https?://(?:www\.|m\.|web\.)?facebook\.com/video\.php\?(?:[^#]*&)?v=(\d+)",
    ])
});
static SOCIAL_VIDEO_INDIRECT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)^https?://(?:www\.)?fb\.watch/[\w-]+",
        r"(?i)^https?://(?:www\.|m\.|web\.)?facebook\.com/share/(?:v|r)/[\w-]+",
    ])
});

fn direct_patterns(platform: Platform) -> &'static [Regex] {
    match platform {
        Platform::ShortVideo => &SHORT_VIDEO_DIRECT,
        Platform::SocialVideo => &SOCIAL_VIDEO_DIRECT,
    }
}

fn indirect_patterns(platform: Platform) -> &'static [Regex] {
    match platform {
        Platform::ShortVideo => &SHORT_VIDEO_INDIRECT,
        Platform::SocialVideo => &SOCIAL_VIDEO_INDIRECT,
    }
}

/// 在直接形态中提取视频 ID
pub fn extract_video_id(platform: Platform, url: &str) -> Option<String> {
    direct_patterns(platform)
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn is_indirection(platform: Platform, url: &str) -> bool {
    indirect_patterns(platform).iter().any(|re| re.is_match(url))
}

/// 去掉首尾空白，缺少协议时补全为 https
pub fn prepare_input(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") || trimmed.is_empty() {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed.trim_start_matches("//"))
    }
}

fn find_direct(hint: Platform, url: &str) -> Option<(Platform, String)> {
    hint.with_fallback()
        .into_iter()
        .find_map(|p| extract_video_id(p, url).map(|id| (p, id)))
}

pub struct Canonicalizer {
    resolver: Arc<dyn RedirectResolver>,
    timeout: Duration,
}

impl Canonicalizer {
    pub fn new(resolver: Arc<dyn RedirectResolver>, timeout: Duration) -> Self {
        Self { resolver, timeout }
    }

    /// 永远不会失败: 最坏情况下退回输入链接，ID 为空，并在 `degraded` 中记录原因。
    ///
    /// 降级时 `url` 是整理过的输入 (去掉首尾空白，缺少协议时补上 `https://`)，
    /// 不是逐字的原始字符串。逐字的原始输入始终保存在 `original` 中。
    pub async fn canonicalize(&self, raw_url: &str, hint: Platform) -> CanonicalUrl {
        let input = prepare_input(raw_url);

        if let Some((platform, id)) = find_direct(hint, &input) {
            debug!("直接形态链接, 平台 {}, ID '{}'", platform, id);
            return CanonicalUrl {
                url: input,
                original: raw_url.to_string(),
                platform,
                video_id: Some(id),
                degraded: None,
            };
        }

        let Some(platform) = hint
            .with_fallback()
            .into_iter()
            .find(|p| is_indirection(*p, &input))
        else {
            return self.degraded(raw_url, input, hint, "无法识别的链接形态".to_string());
        };

        debug!("检测到跳转型链接 ({}): {}", platform, input);
        let location = match tokio::time::timeout(
            self.timeout,
            self.resolver.final_location(&input, self.timeout),
        )
        .await
        {
            Ok(Ok(location)) => location,
            Ok(Err(e)) => return self.degraded(raw_url, input, platform, format!("跳转解析失败: {}", e)),
            Err(_) => {
                return self.degraded(raw_url, input, platform, format!("跳转解析超时 ({:?})", self.timeout));
            }
        };

        match find_direct(platform, &location) {
            Some((resolved_platform, id)) => {
                info!("跳转链接已解析: '{}' -> '{}' (ID {})", input, location, id);
                CanonicalUrl {
                    url: location,
                    original: raw_url.to_string(),
                    platform: resolved_platform,
                    video_id: Some(id),
                    degraded: None,
                }
            }
            None => self.degraded(
                raw_url,
                input,
                platform,
                format!("跳转目标 '{}' 中未找到视频 ID", location),
            ),
        }
    }

    fn degraded(&self, raw_url: &str, input: String, platform: Platform, reason: String) -> CanonicalUrl {
        warn!("链接规范化降级, 将使用原始链接 '{}': {}", input, reason);
        CanonicalUrl {
            url: input,
            original: raw_url.to_string(),
            platform,
            video_id: None,
            degraded: Some(reason),
        }
    }
}
