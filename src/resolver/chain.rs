// src/resolver/chain.rs

use crate::{
    error::StrategyError,
    extractor::LinkExtractor,
    models::{AttemptOutcome, CandidateLink, CanonicalUrl, DiagnosticEntry},
    normalize,
};
use log::{debug, info, warn};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// 链上的一环: 策略及其单次尝试的超时
#[derive(Clone)]
pub struct ChainEntry {
    pub extractor: Arc<dyn LinkExtractor>,
    pub timeout: Duration,
}

impl ChainEntry {
    pub fn new(extractor: Arc<dyn LinkExtractor>, timeout: Duration) -> Self {
        Self { extractor, timeout }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChainOutcome {
    pub links: Vec<CandidateLink>,
    pub succeeded_strategy: Option<String>,
    pub title: Option<String>,
    pub audio: Option<String>,
    pub diagnostic: Vec<DiagnosticEntry>,
}

/// 按优先级依次执行策略，第一个拿到可用链接的策略直接胜出。
pub struct StrategyChain {
    entries: Vec<ChainEntry>,
    max_links: usize,
}

impl StrategyChain {
    pub fn new(entries: Vec<ChainEntry>, max_links: usize) -> Self {
        Self { entries, max_links: max_links.max(1) }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.extractor.name().to_string()).collect()
    }

    /// 严格串行: 前一个策略的结果决定是否还需要下一个。
    /// 每个策略都会在诊断记录中留下恰好一条记录，包括因提前结束而未执行的。
    pub async fn run(
        &self,
        target: &CanonicalUrl,
        original_url: &str,
        deadline_at: Option<Instant>,
    ) -> ChainOutcome {
        let mut outcome = ChainOutcome {
            diagnostic: Vec::with_capacity(self.entries.len()),
            ..Default::default()
        };

        for (index, entry) in self.entries.iter().enumerate() {
            let name = entry.extractor.name().to_string();

            if outcome.succeeded_strategy.is_some() {
                outcome.diagnostic.push(not_attempted(name));
                continue;
            }

            let budget = match deadline_at {
                Some(at) => {
                    let remaining = at.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        warn!("解析链总时限已用尽，跳过策略 '{}'", name);
                        outcome.diagnostic.push(not_attempted(name));
                        continue;
                    }
                    entry.timeout.min(remaining)
                }
                None => entry.timeout,
            };

            debug!("尝试第 {}/{} 个策略 '{}' (时限 {:?})", index + 1, self.entries.len(), name, budget);
            let started = Instant::now();
            let attempt = tokio::time::timeout(budget, entry.extractor.attempt(target, original_url))
                .await
                .unwrap_or_else(|_| Err(StrategyError::timeout(budget)));
            let elapsed = started.elapsed();

            let error = match attempt {
                Ok(extraction) => {
                    let links = normalize::normalize(extraction.links, self.max_links);
                    if links.is_empty() {
                        StrategyError::no_candidates()
                    } else {
                        info!("策略 '{}' 成功，得到 {} 个链接 (耗时 {:?})", name, links.len(), elapsed);
                        outcome.diagnostic.push(DiagnosticEntry {
                            strategy: name.clone(),
                            outcome: AttemptOutcome::Succeeded { candidates: links.len() },
                            elapsed,
                        });
                        outcome.links = links;
                        outcome.title = extraction.title;
                        outcome.audio = extraction.audio;
                        outcome.succeeded_strategy = Some(name);
                        continue;
                    }
                }
                Err(e) => e,
            };

            warn!("策略 '{}' 失败 (耗时 {:?}): {}", name, elapsed, error);
            outcome.diagnostic.push(DiagnosticEntry {
                strategy: name,
                outcome: AttemptOutcome::Failed(error),
                elapsed,
            });
        }

        outcome
    }
}

fn not_attempted(strategy: String) -> DiagnosticEntry {
    DiagnosticEntry {
        strategy,
        outcome: AttemptOutcome::NotAttempted,
        elapsed: Duration::ZERO,
    }
}
