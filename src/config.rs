// src/config.rs

pub mod loader;

use self::loader::load_or_create_external_config;
use crate::{
    cli::Cli,
    constants,
    error::{AppError, AppResult},
    models::Platform,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    path::PathBuf,
    time::Duration,
};

// 为 StrategyKind 添加 serde 属性，使其可以直接从 JSON 文件中反序列化
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum StrategyKind {
    StructuredApi,
    FormScrape,
    RawPatternScan,
    RenderedPage,
}

impl StrategyKind {
    pub fn default_name(&self) -> &'static str {
        use constants::strategy_names::*;
        match self {
            StrategyKind::StructuredApi => STRUCTURED_API,
            StrategyKind::FormScrape => FORM_SCRAPE,
            StrategyKind::RawPatternScan => RAW_PATTERN_SCAN,
            StrategyKind::RenderedPage => RENDERED_PAGE,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        match self {
            StrategyKind::StructuredApi | StrategyKind::FormScrape => Duration::from_secs(12),
            StrategyKind::RawPatternScan => Duration::from_secs(10),
            StrategyKind::RenderedPage => Duration::from_secs(25),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfigFromFile {
    pub kind: StrategyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// 按平台区分的端点模板，支持 {url} {raw} {id} 占位符
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub endpoints: HashMap<Platform, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_field: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle_secs: Option<u64>,
}

// --- 为上面的 serde default 添加辅助函数 ---
fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkConfig {
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub max_redirects: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CanonicalizerConfig {
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipelineConfig {
    pub max_links: Option<usize>,
    /// 整条解析链的总时限，缺省为各策略超时之和
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub canonicalizer: CanonicalizerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub strategies: Vec<StrategyConfigFromFile>,
}

impl ExternalConfig {
    pub(crate) fn default_app_config() -> Self {
        let strategy = |kind: StrategyKind, endpoints: HashMap<Platform, String>| StrategyConfigFromFile {
            kind,
            name: None,
            enabled: true,
            timeout_secs: Some(kind.default_timeout().as_secs()),
            endpoints,
            form_field: None,
            extra_fields: BTreeMap::new(),
            chrome_path: None,
            settle_secs: None,
        };

        let structured_api = strategy(
            StrategyKind::StructuredApi,
            HashMap::from([
                (Platform::ShortVideo, "https://www.tikwm.com/api/?url={url}&hd=1".into()),
                (
                    Platform::SocialVideo,
                    "https://public-apis-ph-server.onrender.com/api/fbdl?url={url}".into(),
                ),
            ]),
        );
        let mut form_scrape = strategy(
            StrategyKind::FormScrape,
            HashMap::from([(Platform::SocialVideo, "https://fdown.net/download.php".into())]),
        );
        form_scrape.form_field = Some("URLz".into());

        let raw_scan = strategy(StrategyKind::RawPatternScan, HashMap::new());
        let mut rendered = strategy(StrategyKind::RenderedPage, HashMap::new());
        rendered.settle_secs = Some(5);

        // 为 NetworkConfig 提供一组稳健的默认值
        let network_config = NetworkConfig {
            connect_timeout_secs: Some(10),
            timeout_secs: Some(20),
            max_retries: Some(1),
            max_redirects: Some(5),
            user_agent: None,
        };

        Self {
            network: network_config,
            canonicalizer: CanonicalizerConfig { timeout_secs: Some(8) },
            pipeline: PipelineConfig {
                max_links: Some(constants::DEFAULT_MAX_LINKS),
                deadline_secs: None,
            },
            strategies: vec![structured_api, form_scrape, raw_scan, rendered],
        }
    }
}

/// 运行时使用的单个策略配置
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    pub name: String,
    pub kind: StrategyKind,
    pub timeout: Duration,
    pub endpoints: HashMap<Platform, String>,
    pub form_field: String,
    pub extra_fields: Vec<(String, String)>,
    pub chrome_path: Option<PathBuf>,
    pub settle: Duration,
}

impl StrategyConfig {
    pub fn with_defaults(kind: StrategyKind) -> Self {
        Self {
            name: kind.default_name().to_string(),
            kind,
            timeout: kind.default_timeout(),
            endpoints: HashMap::new(),
            form_field: "url".to_string(),
            extra_fields: Vec::new(),
            chrome_path: None,
            settle: Duration::from_secs(5),
        }
    }

    fn from_file(file: StrategyConfigFromFile) -> Self {
        let defaults = Self::with_defaults(file.kind);
        Self {
            name: file.name.unwrap_or(defaults.name),
            kind: file.kind,
            timeout: file.timeout_secs.map(Duration::from_secs).unwrap_or(defaults.timeout),
            endpoints: file.endpoints,
            form_field: file.form_field.unwrap_or(defaults.form_field),
            extra_fields: file.extra_fields.into_iter().collect(),
            chrome_path: file.chrome_path,
            settle: file.settle_secs.map(Duration::from_secs).unwrap_or(defaults.settle),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub max_retries: u32,
    pub max_redirects: usize,
    pub canonicalize_timeout: Duration,
    pub max_links: usize,
    pub deadline: Option<Duration>,
    /// 按优先级排列，启动后只读
    pub strategies: Vec<StrategyConfig>,
    pub batch_workers: usize,
}

impl AppConfig {
    pub fn new(args: &Cli) -> AppResult<Self> {
        let (external_config, _) = load_or_create_external_config(args.config.as_deref())?;
        let mut config = Self::from_external(external_config)?;

        if let Some(secs) = args.timeout {
            for strategy in &mut config.strategies {
                strategy.timeout = Duration::from_secs(secs);
            }
        }
        if let Some(max_links) = args.max_links {
            config.max_links = max_links.max(1);
        }
        if let Some(workers) = args.workers {
            config.batch_workers = workers.max(1);
        }
        Ok(config)
    }

    pub fn from_external(external_config: ExternalConfig) -> AppResult<Self> {
        if external_config.pipeline.deadline_secs == Some(0) {
            return Err(AppError::Config("pipeline.deadline_secs 必须大于 0".into()));
        }
        let strategies = external_config
            .strategies
            .into_iter()
            .filter(|s| s.enabled)
            .map(StrategyConfig::from_file)
            .collect::<Vec<_>>();
        // 这两类策略完全依赖外部端点，没有端点就永远不可能成功
        if let Some(s) = strategies.iter().find(|s| {
            matches!(s.kind, StrategyKind::StructuredApi | StrategyKind::FormScrape) && s.endpoints.is_empty()
        }) {
            return Err(AppError::Config(format!("策略 '{}' 未配置任何端点 (endpoints)", s.name)));
        }

        let network = external_config.network;
        Ok(Self {
            user_agent: network.user_agent.unwrap_or_else(|| constants::USER_AGENT.into()),
            connect_timeout: Duration::from_secs(network.connect_timeout_secs.unwrap_or(10)),
            timeout: Duration::from_secs(network.timeout_secs.unwrap_or(20)),
            max_retries: network.max_retries.unwrap_or(1),
            max_redirects: network.max_redirects.unwrap_or(5),
            canonicalize_timeout: Duration::from_secs(
                external_config.canonicalizer.timeout_secs.unwrap_or(8),
            ),
            max_links: external_config
                .pipeline
                .max_links
                .unwrap_or(constants::DEFAULT_MAX_LINKS)
                .max(1),
            deadline: external_config.pipeline.deadline_secs.map(Duration::from_secs),
            strategies,
            batch_workers: constants::DEFAULT_BATCH_WORKERS,
        })
    }

    /// 整条链的时限: 显式配置优先，否则为规范化超时加上所有策略超时之和
    pub fn effective_deadline(&self) -> Duration {
        self.deadline.unwrap_or_else(|| {
            self.canonicalize_timeout + self.strategies.iter().map(|s| s.timeout).sum::<Duration>()
        })
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: "test-agent/1.0".to_string(),
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(15),
            max_retries: 0,
            max_redirects: 5,
            canonicalize_timeout: Duration::from_secs(5),
            max_links: constants::DEFAULT_MAX_LINKS,
            deadline: None,
            strategies: Vec::new(),
            batch_workers: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_roundtrip() {
        let external = ExternalConfig::default_app_config();
        let json = serde_json::to_string_pretty(&external).unwrap();
        let parsed: ExternalConfig = serde_json::from_str(&json).unwrap();
        let config = AppConfig::from_external(parsed).unwrap();

        let names: Vec<_> = config.strategies.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["StructuredAPIStrategy", "FormScrapeStrategy", "RawPatternScanStrategy", "RenderedPageStrategy"]
        );
        assert_eq!(config.strategies[1].form_field, "URLz");
        assert_eq!(config.max_links, 5);
        assert_eq!(config.effective_deadline(), Duration::from_secs(8 + 12 + 12 + 10 + 25));
    }

    #[test]
    fn test_disabled_strategies_are_skipped() {
        let json = r#"{
            "strategies": [
                {"kind": "RawPatternScan", "name": "scan", "timeout_secs": 3},
                {"kind": "RenderedPage", "enabled": false}
            ]
        }"#;
        let config = AppConfig::from_external(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(config.strategies.len(), 1);
        assert_eq!(config.strategies[0].name, "scan");
        assert_eq!(config.strategies[0].timeout, Duration::from_secs(3));
        assert_eq!(config.max_retries, 1);
    }

    #[test]
    fn test_unknown_strategy_kind_is_rejected() {
        let json = r#"{"strategies": [{"kind": "Telepathy"}]}"#;
        assert!(serde_json::from_str::<ExternalConfig>(json).is_err());
    }

    #[test]
    fn test_invalid_strategy_settings_are_config_errors() {
        let json = r#"{"strategies": [{"kind": "FormScrape", "name": "form"}]}"#;
        let err = AppConfig::from_external(serde_json::from_str(json).unwrap()).unwrap_err();
        assert!(matches!(&err, AppError::Config(msg) if msg.contains("'form'")));

        // 被禁用的策略不参与校验
        let json = r#"{"strategies": [{"kind": "StructuredApi", "enabled": false}]}"#;
        assert!(AppConfig::from_external(serde_json::from_str(json).unwrap()).is_ok());

        let json = r#"{"pipeline": {"deadline_secs": 0}, "strategies": []}"#;
        let err = AppConfig::from_external(serde_json::from_str(json).unwrap()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
