// tests/client_test.rs

use std::sync::Arc;
use std::time::{Duration, Instant};
use vidsnap::canonical::RedirectResolver;
use vidsnap::client::RobustClient;
use vidsnap::config::AppConfig;

#[tokio::test(flavor = "multi_thread")]
async fn test_client_retries_transient_server_errors() {
    // --- 1. Arrange (准备阶段) ---

    // 启动一个模拟HTTP服务器
    let mut server = mockito::Server::new_async().await;
    let server_url = server.url();

    // 第一次请求 -> 503，第二次请求 -> 200
    let mock_503 = server
        .mock("GET", "/api")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    let mock_200 = server
        .mock("GET", "/api")
        .with_status(200)
        .with_body("Success!")
        .expect(1)
        .create_async()
        .await;

    // 默认测试配置不重试，这里打开一次重试
    let config = Arc::new(AppConfig { max_retries: 1, ..AppConfig::default() });
    let client = RobustClient::new(config).expect("Failed to create client");

    // --- 2. Act (执行阶段) ---
    let start_time = Instant::now();
    let body = client
        .get_text(format!("{}/api", server_url), Duration::from_secs(10))
        .await
        .expect("Request should eventually succeed");

    // --- 3. Assert (断言阶段) ---
    assert_eq!(body, "Success!");
    mock_503.assert_async().await;
    mock_200.assert_async().await;
    assert!(start_time.elapsed() < Duration::from_secs(5), "Elapsed: {:?}", start_time.elapsed());
}

#[tokio::test]
async fn test_final_location_follows_redirects() {
    // --- 1. Arrange ---
    let mut server = mockito::Server::new_async().await;
    let server_url = server.url();
    let redirect = server
        .mock("GET", "/share/abc")
        .with_status(302)
        .with_header("Location", &format!("{}/watch/?v=42", server_url))
        .create_async()
        .await;
    // 落地页本身返回什么状态码都无所谓
    let landing = server
        .mock("GET", "/watch/")
        .match_query(mockito::Matcher::Any)
        .with_status(403)
        .create_async()
        .await;

    let client = RobustClient::new(Arc::new(AppConfig::default())).unwrap();

    // --- 2. Act ---
    let location = client
        .final_location(&format!("{}/share/abc", server_url), Duration::from_secs(5))
        .await
        .unwrap();

    // --- 3. Assert ---
    redirect.assert_async().await;
    landing.assert_async().await;
    assert_eq!(location, format!("{}/watch/?v=42", server_url));
}
