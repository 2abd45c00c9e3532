// src/normalize.rs

use crate::{constants, models::CandidateLink};
use itertools::Itertools;
use log::debug;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::sync::LazyLock;

static UNICODE_ESCAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\u([0-9a-fA-F]{4})").unwrap());

/// 完整百分号编码的链接，例如 `https%3A%2F%2Fvideo.example.com%2F...`
static ENCODED_URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?%3A%2F%2F").unwrap());

fn unescape_once(input: &str) -> String {
    let mut s = UNICODE_ESCAPE_RE
        .replace_all(input, |caps: &regex::Captures| {
            u32::from_str_radix(&caps[1], 16)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned();
    s = s.replace("\\/", "/").replace("&amp;", "&");
    if ENCODED_URL_RE.is_match(&s) {
        s = percent_decode_str(&s).decode_utf8_lossy().into_owned();
    }
    s
}

/// 还原上游常见的转义: `\/`、`\u0026` 之类的 JSON 转义、HTML 的 `&amp;`，
/// 以及整体被百分号编码的链接。反复处理直到不再变化 (每一轮只会让字符串变短)。
pub fn unescape_media_url(raw: &str) -> String {
    let mut current = raw.trim().trim_matches('"').to_string();
    loop {
        let next = unescape_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current.trim().to_string()
}

/// 去重用的键: 在还原转义之后再完整解码百分号编码，
/// 使 `%2F`、`%26` 等写法与字面字符视为同一链接。
fn dedup_key(media_url: &str) -> String {
    percent_decode_str(media_url).decode_utf8_lossy().into_owned()
}

/// 合并、去重并截断候选链接。保持首次出现的顺序，不按清晰度重排。
pub fn normalize(raw: Vec<CandidateLink>, max_links: usize) -> Vec<CandidateLink> {
    let total = raw.len();
    let links: Vec<CandidateLink> = raw
        .into_iter()
        .map(|link| {
            let quality = if link.quality.trim().is_empty() {
                constants::GENERIC_QUALITY.to_string()
            } else {
                link.quality.trim().to_string()
            };
            CandidateLink {
                media_url: unescape_media_url(&link.media_url),
                quality,
                source_strategy: link.source_strategy,
            }
        })
        .filter(|link| !link.media_url.is_empty())
        .unique_by(|link| dedup_key(&link.media_url))
        .take(max_links)
        .collect();
    debug!("链接归一化: {} 个候选 -> {} 个 (上限 {})", total, links.len(), max_links);
    links
}
