// src/error.rs

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("网络请求失败: {0}")]
    Network(#[from] reqwest::Error),
    #[error("网络中间件错误: {0}")]
    NetworkMiddleware(#[from] reqwest_middleware::Error),
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),
    #[error("URL 解析错误: {0}")]
    Url(#[from] url::ParseError),
    #[error("页面渲染失败: {0}")]
    Render(String),
    #[error("解析链路为空: 未配置任何解析策略")]
    EmptyChain,
    #[error("配置错误: {0}")]
    Config(String),
    #[error("用户中断")]
    UserInterrupt,
    #[error("{0}")] // 只打印内部信息，不加任何前缀
    UserInputError(String),
    #[error("未知错误: {0}")]
    Other(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// 单个策略失败的原因分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyErrorKind {
    Network,
    Timeout,
    BadResponse,
    Unparsable,
    /// 请求成功，但没有拿到任何可用链接
    NoCandidates,
    /// 该策略不适用于当前平台，或运行环境缺少必要能力
    Unsupported,
}

impl fmt::Display for StrategyErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StrategyErrorKind::Network => "Network",
            StrategyErrorKind::Timeout => "Timeout",
            StrategyErrorKind::BadResponse => "BadResponse",
            StrategyErrorKind::Unparsable => "Unparsable",
            StrategyErrorKind::NoCandidates => "NoCandidates",
            StrategyErrorKind::Unsupported => "Unsupported",
        };
        f.write_str(s)
    }
}

/// 策略级错误。只在解析链内部流转，最终折叠进诊断记录，不会抛给调用方。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {detail}")]
pub struct StrategyError {
    pub kind: StrategyErrorKind,
    pub detail: String,
}

impl StrategyError {
    pub fn new(kind: StrategyErrorKind, detail: impl Into<String>) -> Self {
        Self { kind, detail: detail.into() }
    }

    pub fn timeout(limit: std::time::Duration) -> Self {
        Self::new(StrategyErrorKind::Timeout, format!("超过 {:?} 未完成", limit))
    }

    pub fn no_candidates() -> Self {
        Self::new(StrategyErrorKind::NoCandidates, "未提取到可用的媒体链接")
    }

    pub fn unparsable(detail: impl Into<String>) -> Self {
        Self::new(StrategyErrorKind::Unparsable, detail)
    }

    pub fn unsupported(detail: impl Into<String>) -> Self {
        Self::new(StrategyErrorKind::Unsupported, detail)
    }
}

fn classify_reqwest(err: &reqwest::Error) -> StrategyErrorKind {
    if err.is_timeout() {
        StrategyErrorKind::Timeout
    } else if err.status().is_some() {
        StrategyErrorKind::BadResponse
    } else if err.is_decode() || err.is_body() {
        StrategyErrorKind::Unparsable
    } else {
        StrategyErrorKind::Network
    }
}

impl From<AppError> for StrategyError {
    fn from(err: AppError) -> Self {
        let kind = match &err {
            AppError::Network(e) => classify_reqwest(e),
            AppError::NetworkMiddleware(reqwest_middleware::Error::Reqwest(e)) => {
                classify_reqwest(e)
            }
            AppError::NetworkMiddleware(_) => StrategyErrorKind::Network,
            AppError::Json(_) => StrategyErrorKind::Unparsable,
            AppError::Url(_) => StrategyErrorKind::BadResponse,
            AppError::Render(_) => StrategyErrorKind::Network,
            _ => StrategyErrorKind::Network,
        };
        StrategyError::new(kind, err.to_string())
    }
}
