// src/lib.rs

pub mod canonical;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod extractor;
pub mod models;
pub mod normalize;
pub mod payload;
pub mod resolver;
pub mod symbols;
pub mod ui;
pub mod utils;
mod workflows;

use crate::{
    cli::Cli,
    client::RobustClient,
    config::AppConfig,
    error::{AppError, AppResult},
    resolver::LinkResolver,
};
use log::{debug, info};
use std::sync::Arc;

/// 各运行模式共享的上下文。解析器在启动时组装一次，之后只读。
#[derive(Clone)]
pub struct ResolveContext {
    pub config: Arc<AppConfig>,
    pub resolver: Arc<LinkResolver>,
    pub args: Arc<Cli>,
}

/// 库的公共入口点，由 `main.rs` 调用
pub async fn run_from_cli(args: Arc<Cli>) -> AppResult<()> {
    debug!("CLI 参数: {:?}", args);

    let config = Arc::new(AppConfig::new(&args)?);
    debug!("加载的应用配置: {:?}", config);
    if config.strategies.is_empty() {
        return Err(AppError::EmptyChain);
    }

    let http_client = Arc::new(RobustClient::new(config.clone())?);
    let resolver = Arc::new(LinkResolver::from_config(config.clone(), http_client));
    info!("已启用 {} 个解析策略: {:?}", resolver.strategy_names().len(), resolver.strategy_names());

    let context = ResolveContext { config, resolver, args: args.clone() };

    if args.interactive {
        workflows::run_interactive(context).await
    } else if let Some(batch_file) = &args.batch_file {
        workflows::run_batch(batch_file.clone(), context).await
    } else if let Some(url) = &args.url {
        workflows::run_single(context, url).await
    } else {
        Ok(())
    }
}
