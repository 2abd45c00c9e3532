// src/cli.rs

use crate::models::Platform;
use clap::{Parser, ValueEnum, command, crate_version};
use std::path::PathBuf;

/// 定义日志输出级别
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// 定义支持的平台
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlatformArg {
    #[value(name = "tiktok", alias = "short-video")]
    Tiktok,
    #[value(name = "facebook", alias = "social-video")]
    Facebook,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Tiktok => Platform::ShortVideo,
            PlatformArg::Facebook => Platform::SocialVideo,
        }
    }
}

// command 属性
#[derive(Parser, Debug, Clone)]
#[command(
    version = crate_version!(),
    about,
    long_about = None,
    arg_required_else_help = true,
    disable_help_flag = true,
    disable_version_flag = true,
)]
#[command(group(
    clap::ArgGroup::new("mode")
        .required(true)
        .args(&["interactive", "url", "batch_file"]),
))]
pub struct Cli {
    // --- 运行模式 (Mode) ---
    /// 启动交互式会话，逐一输入链接
    #[arg(short, long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub interactive: bool,
    /// 指定要解析的单个视频链接
    #[arg(long, help_heading = "Mode")]
    pub url: Option<String>,
    /// 从文本文件批量解析多个链接 (每行一个)
    #[arg(short, long, value_name = "FILE", help_heading = "Mode")]
    pub batch_file: Option<PathBuf>,

    // --- 解析选项 (Options) ---
    /// 指定平台；省略时根据链接的域名自动判断
    #[arg(short, long, value_enum, help_heading = "Options")]
    pub platform: Option<PlatformArg>,
    /// 以 JSON 格式输出结果 ({success, data} / {success, error})
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub json: bool,
    /// 显示每个解析策略的执行记录
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub trace: bool,
    /// 覆盖每个解析策略的超时时间 (秒)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..), help_heading = "Options")]
    pub timeout: Option<u64>,
    /// 最多返回的链接数量
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(usize), help_heading = "Options")]
    pub max_links: Option<usize>,
    /// [批量模式] 同时解析的链接数
    #[arg(short, long, value_parser = clap::value_parser!(usize), help_heading = "Options")]
    pub workers: Option<usize>,
    /// 指定配置文件路径 (默认 ~/.vidsnap/config.json)
    #[arg(long, value_name = "FILE", help_heading = "Options")]
    pub config: Option<PathBuf>,

    // --- 通用选项 (General) ---
    /// 显示此帮助信息并退出
    #[arg(short = 'h', long, action = clap::ArgAction::Help, global = true, help_heading = "General")]
    _help: Option<bool>,
    /// 显示版本信息并退出
    #[arg(short = 'V', long, action = clap::ArgAction::Version, global = true, help_heading = "General")]
    _version: Option<bool>,
    /// (隐藏参数) 设置日志文件的输出级别，用于调试
    #[arg(long, value_enum, default_value_t = LogLevel::Off, global = true, hide = true)]
    pub log_level: LogLevel,
}

impl Cli {
    /// 平台: 显式指定优先，其次按域名推断
    pub fn platform_for(&self, url: &str) -> Option<Platform> {
        self.platform.map(Platform::from).or_else(|| Platform::detect(url))
    }
}
