// src/extractor/mod.rs

pub mod form_scrape;
pub mod pattern_scan;
pub mod rendered;
pub mod structured_api;
pub mod utils;

use crate::{error::StrategyError, models::{CanonicalUrl, Extraction}};
use async_trait::async_trait;

/// 一种独立的媒体链接提取手段。
///
/// 实现之间互不依赖: 一个策略失败或返回空结果不会影响其他策略的输入。
/// 对于"存在但格式不对"的上游数据，应返回空的 `Extraction`，
/// 只有真正的运行故障 (网络、超时、非 2xx) 才返回 `StrategyError`。
#[async_trait]
pub trait LinkExtractor: Send + Sync {
    /// 写入诊断记录和 `CandidateLink::source_strategy` 的名字
    fn name(&self) -> &str;

    async fn attempt(
        &self,
        target: &CanonicalUrl,
        original_url: &str,
    ) -> Result<Extraction, StrategyError>;
}
