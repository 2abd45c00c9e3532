// src/client.rs

use crate::{canonical::RedirectResolver, config::AppConfig, error::*};
use async_trait::async_trait;
use log::{debug, trace};
use reqwest::{IntoUrl, Response, redirect::Policy};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::{sync::Arc, time::Duration};

/// 所有出站请求共用的客户端。连接池只读共享，可在并发请求间自由复用。
#[derive(Clone)]
pub struct RobustClient {
    pub client: ClientWithMiddleware,
}

impl RobustClient {
    pub fn new(config: Arc<AppConfig>) -> AppResult<Self> {
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let inner = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .redirect(Policy::limited(config.max_redirects))
            .build()?;
        let client = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client })
    }

    /// GET 请求，非 2xx 状态码视为错误
    pub async fn get<T: IntoUrl>(&self, url: T, timeout: Duration) -> AppResult<Response> {
        let res = self.client.get(url).timeout(timeout).send().await?;
        Ok(res.error_for_status()?)
    }

    pub async fn get_text<T: IntoUrl>(&self, url: T, timeout: Duration) -> AppResult<String> {
        let res = self.get(url, timeout).await?;
        let body = res.text().await?;
        trace!("响应体长度: {} 字节", body.len());
        Ok(body)
    }

    /// 以 application/x-www-form-urlencoded 提交表单，返回响应文本
    pub async fn post_form<T: IntoUrl>(
        &self,
        url: T,
        fields: &[(String, String)],
        timeout: Duration,
    ) -> AppResult<String> {
        let res = self
            .client
            .post(url)
            .form(fields)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.text().await?)
    }
}

#[async_trait]
impl RedirectResolver for RobustClient {
    /// 跟随重定向 (跳数由客户端的重定向策略限制)，返回最终落地的地址。
    /// 最终页面的状态码不重要，这里只关心地址本身。
    async fn final_location(&self, url: &str, timeout: Duration) -> AppResult<String> {
        let res = self.client.get(url).timeout(timeout).send().await?;
        let location = res.url().to_string();
        debug!("重定向解析: '{}' -> '{}' (状态码 {})", url, location, res.status());
        Ok(location)
    }
}
