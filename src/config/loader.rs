// src/config/loader.rs

use crate::{
    config::ExternalConfig, // 只需要从父模块导入结构体定义
    constants,
    error::{AppError, AppResult},
};
use anyhow::{Context, anyhow};
use log::{debug, info};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const CONFIG_ENV_VAR: &str = "VIDSNAP_CONFIG";

pub(super) fn get_default_config_path() -> AppResult<PathBuf> {
    let path = dirs::home_dir()
        .ok_or_else(|| AppError::Other(anyhow!("无法获取用户主目录")))?
        .join(constants::CONFIG_DIR_NAME)
        .join(constants::CONFIG_FILE_NAME);
    Ok(path)
}

/// 确定配置文件位置: 命令行参数 > 环境变量 > 主目录下的默认位置
pub fn resolve_config_path(cli_path: Option<&Path>) -> AppResult<(PathBuf, String)> {
    if let Some(path) = cli_path {
        debug!("使用来自命令行参数的配置文件");
        return Ok((path.to_path_buf(), "命令行参数".to_string()));
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) && !path.is_empty() {
        debug!("使用来自环境变量 {} 的配置文件", CONFIG_ENV_VAR);
        return Ok((PathBuf::from(path), format!("环境变量 ({})", CONFIG_ENV_VAR)));
    }
    Ok((get_default_config_path()?, "默认位置".to_string()))
}

/// 读取外部配置，不存在时写入一份默认配置。返回配置及其路径。
pub(crate) fn load_or_create_external_config(cli_path: Option<&Path>) -> AppResult<(ExternalConfig, PathBuf)> {
    let (config_path, source) = resolve_config_path(cli_path)?;
    if config_path.is_file() {
        info!("从 {} 加载配置文件: {}", source, config_path.display());
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("读取配置文件 '{}' 失败", config_path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("解析配置文件 '{}' 失败", config_path.display()))?;
        Ok((config, config_path))
    } else {
        info!("配置文件 {:?} 不存在，将创建默认配置。", config_path);
        let config = ExternalConfig::default_app_config();

        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir)?;
        }

        let json_content = serde_json::to_string_pretty(&config)?;
        fs::write(&config_path, json_content)?;

        Ok((config, config_path))
    }
}
