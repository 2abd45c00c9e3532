// tests/canonicalize_test.rs

use async_trait::async_trait;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;
use vidsnap::canonical::{Canonicalizer, RedirectResolver};
use vidsnap::error::{AppError, AppResult};
use vidsnap::models::Platform;

/// 固定返回某个落地地址的桩实现，并记录被调用的次数
struct StubResolver {
    location: Option<String>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StubResolver {
    fn landing(location: &str) -> Arc<Self> {
        Arc::new(Self { location: Some(location.to_string()), delay: Duration::ZERO, calls: AtomicUsize::new(0) })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { location: None, delay: Duration::ZERO, calls: AtomicUsize::new(0) })
    }

    fn slow(location: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self { location: Some(location.to_string()), delay, calls: AtomicUsize::new(0) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RedirectResolver for StubResolver {
    async fn final_location(&self, _url: &str, _timeout: Duration) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.location
            .clone()
            .ok_or_else(|| AppError::Other(anyhow::anyhow!("connection reset")))
    }
}

#[tokio::test]
async fn test_share_link_is_resolved_to_watch_url() {
    // --- Arrange ---
    let stub = StubResolver::landing("https://www.facebook.com/watch/?v=999");
    let canonicalizer = Canonicalizer::new(stub.clone(), Duration::from_secs(2));

    // --- Act ---
    let canonical = canonicalizer.canonicalize("https://fb.watch/abc/", Platform::SocialVideo).await;

    // --- Assert ---
    assert_eq!(canonical.url, "https://www.facebook.com/watch/?v=999");
    assert_eq!(canonical.video_id.as_deref(), Some("999"));
    assert_eq!(canonical.original, "https://fb.watch/abc/");
    assert!(!canonical.is_degraded());
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn test_direct_url_needs_no_network() {
    let stub = StubResolver::failing();
    let canonicalizer = Canonicalizer::new(stub.clone(), Duration::from_secs(2));

    let canonical = canonicalizer
        .canonicalize("  https://www.tiktok.com/@someone/video/7312345678  ", Platform::ShortVideo)
        .await;

    assert_eq!(canonical.url, "https://www.tiktok.com/@someone/video/7312345678");
    assert_eq!(canonical.video_id.as_deref(), Some("7312345678"));
    assert_eq!(canonical.platform, Platform::ShortVideo);
    assert_eq!(stub.calls(), 0, "直接形态的链接不应触发任何网络请求");
}

#[tokio::test]
async fn test_wrong_hint_still_matches_other_platform() {
    let stub = StubResolver::failing();
    let canonicalizer = Canonicalizer::new(stub.clone(), Duration::from_secs(2));

    let canonical = canonicalizer
        .canonicalize("https://www.facebook.com/reel/4242", Platform::ShortVideo)
        .await;

    assert_eq!(canonical.platform, Platform::SocialVideo);
    assert_eq!(canonical.video_id.as_deref(), Some("4242"));
}

#[tokio::test]
async fn test_unrecognized_redirect_target_falls_back_to_input() {
    let stub = StubResolver::landing("https://www.facebook.com/login/?next=somewhere");
    let canonicalizer = Canonicalizer::new(stub.clone(), Duration::from_secs(2));

    let canonical = canonicalizer.canonicalize("https://fb.watch/zzz/", Platform::SocialVideo).await;

    assert_eq!(canonical.url, "https://fb.watch/zzz/");
    assert_eq!(canonical.video_id, None);
    assert!(canonical.is_degraded());
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn test_redirect_failure_and_timeout_degrade_gracefully() {
    // 网络错误
    let failing = StubResolver::failing();
    let canonical = Canonicalizer::new(failing.clone(), Duration::from_secs(2))
        .canonicalize("https://vm.tiktok.com/ZMabc/", Platform::ShortVideo)
        .await;
    assert_eq!(canonical.url, "https://vm.tiktok.com/ZMabc/");
    assert!(canonical.is_degraded());

    // 超时
    let slow = StubResolver::slow("https://www.tiktok.com/@a/video/1", Duration::from_secs(5));
    let canonical = Canonicalizer::new(slow.clone(), Duration::from_millis(100))
        .canonicalize("https://vm.tiktok.com/ZMabc/", Platform::ShortVideo)
        .await;
    assert_eq!(canonical.video_id, None);
    assert!(canonical.degraded.as_deref().is_some_and(|r| r.contains("超时")));
}

#[tokio::test]
async fn test_unknown_shape_is_returned_unchanged() {
    let stub = StubResolver::failing();
    let canonicalizer = Canonicalizer::new(stub.clone(), Duration::from_secs(2));

    let canonical = canonicalizer.canonicalize("example.com/some/video", Platform::SocialVideo).await;

    assert_eq!(canonical.url, "https://example.com/some/video");
    assert_eq!(canonical.platform, Platform::SocialVideo);
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_degraded_url_is_prepared_input_and_original_is_verbatim() {
    let stub = StubResolver::failing();
    let canonicalizer = Canonicalizer::new(stub.clone(), Duration::from_secs(1));

    let raw = "  fb.watch/abc/ ";
    let canonical = canonicalizer.canonicalize(raw, Platform::SocialVideo).await;

    assert!(canonical.degraded.is_some());
    assert_eq!(canonical.url, "https://fb.watch/abc/");
    assert_eq!(canonical.original, raw);
    assert_eq!(canonical.video_id, None);
    assert_eq!(stub.calls(), 1);
}
