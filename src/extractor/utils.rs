// src/extractor/utils.rs

use crate::constants::{self, media};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use crate::models::CanonicalUrl;

const HD_TOKENS: &[&str] = &["hd", "fhd", "uhd", "hdplay", "720p", "1080p", "1440p", "2160p", "4k"];
const SD_TOKENS: &[&str] = &["sd", "ld", "240p", "360p", "480p"];

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

/// 从文本中推断清晰度标签。只认完整的词，"hdr" 或 "shd" 之类不算。
pub fn infer_quality(text: &str) -> Option<&'static str> {
    let words: Vec<String> = tokens(text).collect();
    if words.iter().any(|w| HD_TOKENS.contains(&w.as_str())) {
        Some(constants::QUALITY_HD)
    } else if words.iter().any(|w| SD_TOKENS.contains(&w.as_str())) {
        Some(constants::QUALITY_SD)
    } else {
        None
    }
}

pub fn is_absolute_http(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

/// 带协议的绝对链接，且包含媒体扩展名或媒体关键字
pub fn looks_like_media(url: &str) -> bool {
    if !is_absolute_http(url) {
        return false;
    }
    let lower = url.to_ascii_lowercase();
    media::EXTENSIONS.iter().any(|ext| lower.contains(ext))
        || media::KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// 填充端点模板中的占位符
pub fn fill_template(template: &str, target: &CanonicalUrl) -> String {
    let encoded = utf8_percent_encode(&target.url, NON_ALPHANUMERIC).to_string();
    template
        .replace(constants::placeholders::URL, &encoded)
        .replace(constants::placeholders::RAW, &target.url)
        .replace(constants::placeholders::ID, target.video_id.as_deref().unwrap_or_default())
}
