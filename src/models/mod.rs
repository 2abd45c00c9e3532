// src/models/mod.rs

pub mod api;

use crate::error::StrategyError;
use crate::symbols;
use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
use url::Url;

/// 支持的两类平台
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// 短视频平台 (TikTok)
    ShortVideo,
    /// 社交网络视频 (Facebook)
    SocialVideo,
}

impl Platform {
    /// 对外接口中 `platform` 字段的取值
    pub fn as_hint(&self) -> &'static str {
        match self {
            Platform::ShortVideo => "tiktok",
            Platform::SocialVideo => "facebook",
        }
    }

    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint.trim().to_ascii_lowercase().as_str() {
            "tiktok" | "shortvideo" | "short-video" => Some(Platform::ShortVideo),
            "facebook" | "fb" | "socialvideo" | "social-video" => Some(Platform::SocialVideo),
            _ => None,
        }
    }

    /// 根据主机名推断平台，无法识别时返回 None
    pub fn detect(url: &str) -> Option<Self> {
        let parsed = Url::parse(url.trim()).ok()?;
        let host = parsed.host_str()?.to_ascii_lowercase();
        let matches = |domain: &str| host == domain || host.ends_with(&format!(".{}", domain));
        if matches("tiktok.com") {
            Some(Platform::ShortVideo)
        } else if matches("facebook.com") || matches("fb.watch") || matches("fb.com") {
            Some(Platform::SocialVideo)
        } else {
            None
        }
    }

    /// 规范化时的尝试顺序: 先试提示的平台，再试另一个
    pub fn with_fallback(self) -> [Platform; 2] {
        match self {
            Platform::ShortVideo => [Platform::ShortVideo, Platform::SocialVideo],
            Platform::SocialVideo => [Platform::SocialVideo, Platform::ShortVideo],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_hint())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub raw_url: String,
    pub platform: Platform,
}

impl ResolutionRequest {
    pub fn new(raw_url: impl Into<String>, platform: Platform) -> Self {
        Self { raw_url: raw_url.into(), platform }
    }
}

/// 规范化之后的链接。一旦生成就不再修改。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalUrl {
    pub url: String,
    pub original: String,
    pub platform: Platform,
    pub video_id: Option<String>,
    /// 规范化降级的原因，仅用于日志
    pub degraded: Option<String>,
}

impl CanonicalUrl {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateLink {
    pub media_url: String,
    pub quality: String,
    pub source_strategy: String,
}

impl CandidateLink {
    pub fn new(media_url: impl Into<String>, quality: impl Into<String>, source: &str) -> Self {
        Self {
            media_url: media_url.into(),
            quality: quality.into(),
            source_strategy: source.to_string(),
        }
    }
}

/// 单个策略的产出: 候选链接以及顺带拿到的标题、音频
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub links: Vec<CandidateLink>,
    pub title: Option<String>,
    pub audio: Option<String>,
}

impl Extraction {
    pub fn from_links(links: Vec<CandidateLink>) -> Self {
        Self { links, ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded { candidates: usize },
    Failed(StrategyError),
    NotAttempted,
}

impl AttemptOutcome {
    pub fn is_attempted(&self) -> bool {
        !matches!(self, AttemptOutcome::NotAttempted)
    }

    pub fn get_display_info(
        &self,
    ) -> (
        &'static ColoredString,
        fn(ColoredString) -> ColoredString,
        String,
    ) {
        match self {
            AttemptOutcome::Succeeded { candidates } => {
                (&*symbols::OK, |s| s.green(), format!("成功，{} 个候选链接", candidates))
            }
            AttemptOutcome::Failed(e) => (&*symbols::ERROR, |s| s.red(), e.to_string()),
            AttemptOutcome::NotAttempted => (&*symbols::SKIP, |s| s.dimmed(), "未尝试".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEntry {
    pub strategy: String,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct ResolutionResult {
    pub links: Vec<CandidateLink>,
    pub succeeded_strategy: Option<String>,
    pub title: Option<String>,
    pub audio: Option<String>,
    pub canonical: CanonicalUrl,
    pub diagnostic: Vec<DiagnosticEntry>,
}

impl ResolutionResult {
    pub fn is_found(&self) -> bool {
        !self.links.is_empty()
    }

    pub fn attempted_count(&self) -> usize {
        self.diagnostic.iter().filter(|d| d.outcome.is_attempted()).count()
    }
}
