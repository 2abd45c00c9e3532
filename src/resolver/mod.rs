// src/resolver/mod.rs

pub mod chain;
pub mod dispatcher;

pub use chain::{ChainEntry, StrategyChain};

use crate::{
    canonical::Canonicalizer,
    error::{AppError, AppResult},
    models::{Platform, ResolutionRequest, ResolutionResult},
};
use log::{error, info};
use std::time::{Duration, Instant};

/// 对外的唯一入口: 输入链接与平台提示，输出归一化后的解析结果。
///
/// 所有可预期的失败 (网络、空结果、上游格式异常) 都折叠进结果的诊断记录；
/// 只有配置错误 (例如解析链为空) 才会以 `Err` 返回。
pub struct LinkResolver {
    canonicalizer: Canonicalizer,
    chain: StrategyChain,
    deadline: Option<Duration>,
}

impl LinkResolver {
    pub fn new(canonicalizer: Canonicalizer, chain: StrategyChain) -> Self {
        Self { canonicalizer, chain, deadline: None }
    }

    /// 设置整条链 (含规范化) 的总时限
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn strategy_names(&self) -> Vec<String> {
        self.chain.names()
    }

    pub async fn resolve(&self, raw_url: &str, platform: Platform) -> AppResult<ResolutionResult> {
        self.resolve_request(&ResolutionRequest::new(raw_url, platform)).await
    }

    pub async fn resolve_request(&self, request: &ResolutionRequest) -> AppResult<ResolutionResult> {
        if self.chain.is_empty() {
            error!("解析链为空，无法处理 '{}'", request.raw_url);
            return Err(AppError::EmptyChain);
        }

        let started = Instant::now();
        let deadline_at = self.deadline.map(|d| started + d);
        info!("开始解析 [{}] {}", request.platform, request.raw_url);

        let canonical = self.canonicalizer.canonicalize(&request.raw_url, request.platform).await;
        let outcome = self.chain.run(&canonical, &request.raw_url, deadline_at).await;

        match &outcome.succeeded_strategy {
            Some(name) => info!(
                "解析完成: {} 个链接，来自 '{}' (总耗时 {:?})",
                outcome.links.len(),
                name,
                started.elapsed()
            ),
            None => info!(
                "解析结束: {} 个策略均未找到链接 (总耗时 {:?})",
                self.chain.len(),
                started.elapsed()
            ),
        }

        Ok(ResolutionResult {
            links: outcome.links,
            succeeded_strategy: outcome.succeeded_strategy,
            title: outcome.title,
            audio: outcome.audio,
            canonical,
            diagnostic: outcome.diagnostic,
        })
    }
}
