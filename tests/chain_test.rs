// tests/chain_test.rs

use async_trait::async_trait;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;
use vidsnap::canonical::{Canonicalizer, RedirectResolver};
use vidsnap::error::{AppError, AppResult, StrategyError, StrategyErrorKind};
use vidsnap::extractor::LinkExtractor;
use vidsnap::models::{AttemptOutcome, CandidateLink, CanonicalUrl, Extraction, Platform};
use vidsnap::resolver::{ChainEntry, LinkResolver, StrategyChain};

// --- 测试用的桩实现 ---

enum Behavior {
    Links(Vec<(&'static str, &'static str)>),
    Fail(StrategyErrorKind),
    Sleep(Duration),
}

struct StubExtractor {
    name: &'static str,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl StubExtractor {
    fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self { name, behavior, calls: AtomicUsize::new(0) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LinkExtractor for StubExtractor {
    fn name(&self) -> &str {
        self.name
    }

    async fn attempt(&self, _target: &CanonicalUrl, _original_url: &str) -> Result<Extraction, StrategyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Links(links) => Ok(Extraction {
                links: links.iter().map(|(url, q)| CandidateLink::new(*url, *q, self.name)).collect(),
                title: Some(format!("title from {}", self.name)),
                audio: None,
            }),
            Behavior::Fail(kind) => Err(StrategyError::new(*kind, "stub failure")),
            Behavior::Sleep(d) => {
                tokio::time::sleep(*d).await;
                Ok(Extraction::default())
            }
        }
    }
}

struct NoRedirect;

#[async_trait]
impl RedirectResolver for NoRedirect {
    async fn final_location(&self, url: &str, _timeout: Duration) -> AppResult<String> {
        Ok(url.to_string())
    }
}

fn entry(extractor: Arc<StubExtractor>) -> ChainEntry {
    ChainEntry::new(extractor, Duration::from_secs(2))
}

fn resolver(entries: Vec<ChainEntry>) -> LinkResolver {
    let canonicalizer = Canonicalizer::new(Arc::new(NoRedirect), Duration::from_secs(1));
    LinkResolver::new(canonicalizer, StrategyChain::new(entries, 5))
}

const FB_URL: &str = "https://www.facebook.com/watch/?v=123";

// --- 测试 ---

#[tokio::test]
async fn test_first_success_wins_and_rest_are_not_attempted() {
    // --- Arrange ---
    let a = StubExtractor::new("A", Behavior::Fail(StrategyErrorKind::Network));
    let b = StubExtractor::new("B", Behavior::Links(vec![("https://cdn.example.com/b.mp4", "HD")]));
    let c = StubExtractor::new("C", Behavior::Links(vec![("https://cdn.example.com/c.mp4", "SD")]));
    let resolver = resolver(vec![entry(a.clone()), entry(b.clone()), entry(c.clone())]);

    // --- Act ---
    let result = resolver.resolve(FB_URL, Platform::SocialVideo).await.unwrap();

    // --- Assert ---
    assert_eq!(result.succeeded_strategy.as_deref(), Some("B"));
    assert_eq!(result.links.len(), 1);
    assert_eq!(result.links[0].media_url, "https://cdn.example.com/b.mp4");
    assert_eq!(result.title.as_deref(), Some("title from B"));

    let names: Vec<_> = result.diagnostic.iter().map(|d| d.strategy.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
    assert!(matches!(&result.diagnostic[0].outcome, AttemptOutcome::Failed(e) if e.kind == StrategyErrorKind::Network));
    assert_eq!(result.diagnostic[1].outcome, AttemptOutcome::Succeeded { candidates: 1 });
    assert_eq!(result.diagnostic[2].outcome, AttemptOutcome::NotAttempted);
    assert_eq!(result.attempted_count(), 2);
    assert_eq!(c.calls(), 0, "胜出之后的策略不应被调用");
}

#[tokio::test]
async fn test_empty_result_counts_as_failure_and_chain_continues() {
    let empty = StubExtractor::new("Empty", Behavior::Links(vec![("   ", "HD")]));
    let good = StubExtractor::new("Good", Behavior::Links(vec![("https://cdn.example.com/v.mp4", "")]));
    let resolver = resolver(vec![entry(empty.clone()), entry(good.clone())]);

    let result = resolver.resolve(FB_URL, Platform::SocialVideo).await.unwrap();

    assert!(matches!(
        &result.diagnostic[0].outcome,
        AttemptOutcome::Failed(e) if e.kind == StrategyErrorKind::NoCandidates
    ));
    assert_eq!(result.succeeded_strategy.as_deref(), Some("Good"));
    // 空清晰度标签被替换为通用标签
    assert_eq!(result.links[0].quality, "Video");
}

#[tokio::test]
async fn test_all_strategies_exhausted_is_not_an_error() {
    let a = StubExtractor::new("A", Behavior::Fail(StrategyErrorKind::BadResponse));
    let b = StubExtractor::new("B", Behavior::Links(vec![]));
    let resolver = resolver(vec![entry(a.clone()), entry(b.clone())]);

    let result = resolver.resolve(FB_URL, Platform::SocialVideo).await.unwrap();

    assert!(!result.is_found());
    assert_eq!(result.succeeded_strategy, None);
    assert_eq!(result.diagnostic.len(), 2);
    assert!(result.diagnostic.iter().all(|d| matches!(d.outcome, AttemptOutcome::Failed(_))));
    assert_eq!((a.calls(), b.calls()), (1, 1));
}

#[tokio::test]
async fn test_slow_strategy_times_out_and_next_one_runs() {
    let slow = StubExtractor::new("Slow", Behavior::Sleep(Duration::from_secs(10)));
    let fast = StubExtractor::new("Fast", Behavior::Links(vec![("https://cdn.example.com/f.mp4", "SD")]));
    let resolver = resolver(vec![
        ChainEntry::new(slow.clone(), Duration::from_millis(100)),
        entry(fast.clone()),
    ]);

    let started = std::time::Instant::now();
    let result = resolver.resolve(FB_URL, Platform::SocialVideo).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(matches!(
        &result.diagnostic[0].outcome,
        AttemptOutcome::Failed(e) if e.kind == StrategyErrorKind::Timeout
    ));
    assert_eq!(result.succeeded_strategy.as_deref(), Some("Fast"));
}

#[tokio::test]
async fn test_exhausted_deadline_marks_remaining_as_not_attempted() {
    let slow = StubExtractor::new("Slow", Behavior::Sleep(Duration::from_secs(10)));
    let never = StubExtractor::new("Never", Behavior::Links(vec![("https://cdn.example.com/n.mp4", "SD")]));
    let resolver = resolver(vec![entry(slow.clone()), entry(never.clone())]).with_deadline(Duration::from_millis(200));

    let result = resolver.resolve(FB_URL, Platform::SocialVideo).await.unwrap();

    assert!(matches!(
        &result.diagnostic[0].outcome,
        AttemptOutcome::Failed(e) if e.kind == StrategyErrorKind::Timeout
    ));
    assert_eq!(result.diagnostic[1].outcome, AttemptOutcome::NotAttempted);
    assert_eq!(never.calls(), 0);
}

#[tokio::test]
async fn test_links_are_deduplicated_and_capped() {
    let many = StubExtractor::new(
        "Many",
        Behavior::Links(vec![
            ("https://cdn.example.com/1.mp4", "HD"),
            ("https:\\/\\/cdn.example.com\\/1.mp4", "SD"),
            ("https://cdn.example.com/2.mp4", "SD"),
            ("https://cdn.example.com/3.mp4", "SD"),
        ]),
    );
    let canonicalizer = Canonicalizer::new(Arc::new(NoRedirect), Duration::from_secs(1));
    let resolver = LinkResolver::new(canonicalizer, StrategyChain::new(vec![entry(many)], 2));

    let result = resolver.resolve(FB_URL, Platform::SocialVideo).await.unwrap();

    let got: Vec<_> = result.links.iter().map(|l| (l.media_url.as_str(), l.quality.as_str())).collect();
    assert_eq!(got, vec![("https://cdn.example.com/1.mp4", "HD"), ("https://cdn.example.com/2.mp4", "SD")]);
    assert_eq!(result.diagnostic[0].outcome, AttemptOutcome::Succeeded { candidates: 2 });
}

#[tokio::test]
async fn test_empty_chain_is_a_configuration_error() {
    let resolver = resolver(vec![]);

    let result = resolver.resolve(FB_URL, Platform::SocialVideo).await;

    assert!(matches!(result, Err(AppError::EmptyChain)));
}

// --- 请求处理方的结局映射 ---

#[tokio::test]
async fn test_download_request_outcomes() {
    use vidsnap::payload::handle_download_request;

    let found = resolver(vec![entry(StubExtractor::new(
        "A",
        Behavior::Links(vec![("https://cdn.example.com/a.mp4", "HD")]),
    ))]);
    let response = handle_download_request(&found, Some(FB_URL), Some("facebook")).await;
    assert!(response.success);
    assert_eq!(response.data.as_ref().map(|d| d.links.len()), Some(1));

    let missing = handle_download_request(&found, Some("  "), Some("facebook")).await;
    assert_eq!(missing.error.as_deref(), Some("Missing data"));

    let invalid = handle_download_request(&found, Some(FB_URL), Some("myspace")).await;
    assert_eq!(invalid.error.as_deref(), Some("Invalid platform"));

    let exhausted = resolver(vec![entry(StubExtractor::new("A", Behavior::Links(vec![])))]);
    let not_found = handle_download_request(&exhausted, Some(FB_URL), Some("tiktok")).await;
    assert!(!not_found.success);
    assert_eq!(not_found.error.as_deref(), Some("TikTok download failed"));

    let broken = resolver(vec![]);
    let fault = handle_download_request(&broken, Some(FB_URL), Some("facebook")).await;
    assert_eq!(fault.error.as_deref(), Some("Download failed"));
}
