// src/utils.rs

use crate::{cli::LogLevel, constants};
use log::warn;
use std::{env, path::PathBuf};

/// 初始化文件日志。失败时只在终端给出警告，不影响主流程。
pub fn init_logging(level: LogLevel) {
    if level == LogLevel::Off {
        return;
    }

    let app_name = clap::crate_name!();
    let log_file_path = log_file_path(app_name);

    if let Some(dir) = log_file_path.parent() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("警告: 无法创建日志目录 {:?}: {}", dir, e);
        }
    }

    let file_appender = match fern::log_file(&log_file_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("警告: 无法打开日志文件 {:?} : {}。将尝试使用备用日志文件。", log_file_path, e);
            let fallback_path =
                env::temp_dir().join(format!("{}-{}", app_name, constants::LOG_FALLBACK_FILE_NAME));
            match fern::log_file(&fallback_path) {
                Ok(fb_file) => {
                    warn!("日志将写入备用文件: {:?}", fallback_path);
                    fb_file
                }
                Err(e_fb) => {
                    eprintln!("错误: 无法创建备用日志文件 {:?}: {}。日志将不会被记录。", fallback_path, e_fb);
                    return;
                }
            }
        }
    };

    let result = fern::Dispatch::new()
        .level(log::LevelFilter::from(level))
        // 第三方库的调试输出过于嘈杂
        .level_for("headless_chrome", log::LevelFilter::Warn)
        .level_for("tungstenite", log::LevelFilter::Warn)
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] [{:<5}] [{}:{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.line().unwrap_or(0),
                message
            ))
        })
        .chain(file_appender)
        .apply();

    if let Err(e) = result {
        eprintln!("警告: 日志系统初始化失败: {}", e);
    }
}

fn log_file_path(app_name: &str) -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(constants::CONFIG_DIR_NAME).join(constants::LOG_FILE_NAME),
        None => {
            eprintln!("警告: 无法获取用户主目录，日志将写入临时目录。");
            env::temp_dir().join(app_name).join(constants::LOG_FILE_NAME)
        }
    }
}

/// 按显示宽度截断 (CJK 字符按 2 计)，超出时以 "..." 结尾
pub fn truncate_text(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut end_pos = 0;
    for (i, c) in text.char_indices() {
        width += if c.is_ascii() { 1 } else { 2 };
        if width > max_width.saturating_sub(3) {
            end_pos = i;
            break;
        }
    }
    if end_pos == 0 { text.to_string() } else { format!("{}...", &text[..end_pos]) }
}

/// 批量文件: 每行一个链接，忽略空行与 `#` 开头的注释
pub fn parse_batch_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.starts_with('#'))
        .map(str::to_string)
        .collect()
}
