// src/resolver/dispatcher.rs

use super::{
    LinkResolver,
    chain::{ChainEntry, StrategyChain},
};
use crate::{
    canonical::Canonicalizer,
    client::RobustClient,
    config::{AppConfig, StrategyConfig, StrategyKind},
    extractor::{
        LinkExtractor,
        form_scrape::FormScrapeExtractor,
        pattern_scan::RawPatternExtractor,
        rendered::{PageRenderer, RenderedPageExtractor},
        structured_api::StructuredApiExtractor,
    },
};
use log::{debug, info};
use std::sync::Arc;

/// 这部分 `impl` 负责根据配置组装解析链。
impl LinkResolver {
    pub fn from_config(config: Arc<AppConfig>, http_client: Arc<RobustClient>) -> Self {
        let entries: Vec<ChainEntry> = config
            .strategies
            .iter()
            .map(|strategy| {
                let extractor = create_extractor(strategy, http_client.clone(), default_renderer(strategy));
                ChainEntry::new(extractor, strategy.timeout)
            })
            .collect();
        info!(
            "解析链已就绪: [{}]",
            entries.iter().map(|e| e.extractor.name().to_string()).collect::<Vec<_>>().join(" -> ")
        );

        let canonicalizer = Canonicalizer::new(http_client, config.canonicalize_timeout);
        LinkResolver::new(canonicalizer, StrategyChain::new(entries, config.max_links))
            .with_deadline(config.effective_deadline())
    }
}

/// 根据策略配置创建具体的提取器实例。
pub fn create_extractor(
    strategy: &StrategyConfig,
    http_client: Arc<RobustClient>,
    renderer: Option<Arc<dyn PageRenderer>>,
) -> Arc<dyn LinkExtractor> {
    match strategy.kind {
        StrategyKind::StructuredApi => {
            debug!("创建 StructuredApiExtractor '{}', 端点: {:?}", strategy.name, strategy.endpoints);
            Arc::new(StructuredApiExtractor::new(
                strategy.name.clone(),
                http_client,
                strategy.endpoints.clone(),
                strategy.timeout,
            ))
        }
        StrategyKind::FormScrape => {
            debug!("创建 FormScrapeExtractor '{}', 表单字段 '{}'", strategy.name, strategy.form_field);
            Arc::new(FormScrapeExtractor::new(
                strategy.name.clone(),
                http_client,
                strategy.endpoints.clone(),
                strategy.form_field.clone(),
                strategy.extra_fields.clone(),
                strategy.timeout,
            ))
        }
        StrategyKind::RawPatternScan => {
            debug!("创建 RawPatternExtractor '{}'", strategy.name);
            Arc::new(RawPatternExtractor::new(
                strategy.name.clone(),
                http_client,
                strategy.endpoints.clone(),
                strategy.timeout,
            ))
        }
        StrategyKind::RenderedPage => {
            debug!("创建 RenderedPageExtractor '{}' (渲染器可用: {})", strategy.name, renderer.is_some());
            Arc::new(RenderedPageExtractor::new(strategy.name.clone(), renderer, strategy.timeout))
        }
    }
}

#[cfg(feature = "headless")]
fn default_renderer(strategy: &StrategyConfig) -> Option<Arc<dyn PageRenderer>> {
    use crate::extractor::rendered::ChromeRenderer;
    (strategy.kind == StrategyKind::RenderedPage)
        .then(|| Arc::new(ChromeRenderer::new(strategy.chrome_path.clone(), strategy.settle)) as Arc<dyn PageRenderer>)
}

#[cfg(not(feature = "headless"))]
fn default_renderer(_strategy: &StrategyConfig) -> Option<Arc<dyn PageRenderer>> {
    None
}
