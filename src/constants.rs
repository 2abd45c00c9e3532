// src/constants.rs

pub const UI_WIDTH: usize = 88;
pub const URL_TRUNCATE_LENGTH: usize = 72;
pub const CONFIG_DIR_NAME: &str = concat!(".", clap::crate_name!());
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = "vidsnap.log";
pub const LOG_FALLBACK_FILE_NAME: &str = "fallback.log";
pub const DEFAULT_MAX_LINKS: usize = 5;
pub const DEFAULT_BATCH_WORKERS: usize = 3;
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// 没有可推断清晰度时使用的通用标签
pub const GENERIC_QUALITY: &str = "Video";
pub const QUALITY_HD: &str = "HD";
pub const QUALITY_SD: &str = "SD";

/// 端点模板中的占位符
pub mod placeholders {
    /// 百分号编码后的规范化链接
    pub const URL: &str = "{url}";
    /// 原样的规范化链接
    pub const RAW: &str = "{raw}";
    /// 平台视频 ID (可能为空)
    pub const ID: &str = "{id}";
}

/// 返回给用户的提示文案
pub mod messages {
    pub const MISSING_DATA: &str = "Missing data";
    pub const INVALID_PLATFORM: &str = "Invalid platform";
    pub const SHORT_VIDEO_FAILED: &str = "TikTok download failed";
    pub const SOCIAL_VIDEO_NOT_FOUND: &str =
        "No download links found. Video may be private, restricted, or unsupported.";
    pub const DOWNLOAD_FAILED: &str = "Download failed";
    pub const DEFAULT_SHORT_VIDEO_TITLE: &str = "TikTok Video";
}

pub mod strategy_names {
    pub const STRUCTURED_API: &str = "StructuredAPIStrategy";
    pub const FORM_SCRAPE: &str = "FormScrapeStrategy";
    pub const RAW_PATTERN_SCAN: &str = "RawPatternScanStrategy";
    pub const RENDERED_PAGE: &str = "RenderedPageStrategy";
}

/// 判断一个链接 "看起来像媒体文件" 的特征
pub mod media {
    pub const EXTENSIONS: &[&str] = &[".mp4", ".m3u8", ".webm", ".mov", ".m4v", ".mp3", ".m4a"];
    pub const KEYWORDS: &[&str] = &[
        "fbcdn",
        "tiktokcdn",
        "tikwm",
        "/video/",
        "/play/",
        "video_redirect",
        "mime_type=video",
        "bytevc",
    ];
}
