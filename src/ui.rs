// src/ui.rs

use crate::{
    constants,
    models::{DiagnosticEntry, ResolutionResult},
    symbols, utils,
};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    io::{self, Write},
    time::Duration,
};

pub fn print_header(title: &str) {
    println!("\n{}", "═".repeat(constants::UI_WIDTH));
    println!(" {}", title.cyan().bold());
    println!("{}", "═".repeat(constants::UI_WIDTH));
}

pub fn print_sub_header(title: &str) {
    println!("\n--- {} ---", title.bold());
}

pub fn box_message(title: &str, content: &[&str], color_func: fn(ColoredString) -> ColoredString) {
    println!("\n┌{}┐", "─".repeat(constants::UI_WIDTH - 2));
    println!("  {}", color_func(title.bold()));
    println!("├{}┤", "─".repeat(constants::UI_WIDTH - 2));
    for line in content {
        println!("  {}", line);
    }
    println!("└{}┘", "─".repeat(constants::UI_WIDTH - 2));
}

pub fn plain(message: &str) {
    println!("{}", message);
}

pub fn info(message: &str) {
    println!("{} {}", *symbols::INFO, message);
}

pub fn warn(message: &str) {
    println!("{} {}", *symbols::WARN, message.yellow());
}

pub fn error(message: &str) {
    eprintln!("{} {}", *symbols::ERROR, message.red());
}

pub fn prompt(message: &str, default: Option<&str>) -> io::Result<String> {
    let default_str = default.map_or("".to_string(), |d| format!(" (默认: {})", d));
    print!("\n>>> {}{}: ", message, default_str);
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "输入已关闭"));
    }
    let input = input.trim().to_string();
    if input.is_empty() {
        Ok(default.unwrap_or("").to_string())
    } else {
        Ok(input)
    }
}

/// 单个链接解析期间的等待动画
pub fn new_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]") {
        spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

pub fn new_tasks_progress_bar(len: u64, prefix: &str) -> ProgressBar {
    let pbar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template(
        "{prefix:7.bold.cyan} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}/{len:3} ({percent:>3}%)",
    ) {
        pbar.set_style(style.progress_chars("#>-"));
    }
    pbar.set_prefix(prefix.to_string());
    pbar
}

/// 打印解析结果: 标题、链接列表、音频以及胜出的策略
pub fn print_result(result: &ResolutionResult) {
    let title = result.title.as_deref().unwrap_or("(无标题)");
    let mut lines: Vec<String> = Vec::with_capacity(result.links.len() + 3);
    for (i, link) in result.links.iter().enumerate() {
        lines.push(format!(
            "[{}] {:<5} {}",
            i + 1,
            link.quality.yellow(),
            utils::truncate_text(&link.media_url, constants::URL_TRUNCATE_LENGTH)
        ));
    }
    if let Some(audio) = &result.audio {
        lines.push(format!("音频  {}", utils::truncate_text(audio, constants::URL_TRUNCATE_LENGTH)));
    }
    if let Some(strategy) = &result.succeeded_strategy {
        lines.push(format!("来源  {}", strategy.dimmed()));
    }
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    box_message(&format!("{} {}", *symbols::OK, title), &refs, |s| s.green());

    // 完整链接单独输出，方便复制
    for link in &result.links {
        println!("{}", link.media_url);
    }
}

/// 打印每个策略的执行记录
pub fn print_diagnostic(entries: &[DiagnosticEntry]) {
    print_sub_header("解析记录");
    for entry in entries {
        let (symbol, color_func, detail) = entry.outcome.get_display_info();
        println!(
            "  {} {:<24} {:>8} {}",
            symbol,
            entry.strategy,
            format!("{:.2?}", entry.elapsed).dimmed(),
            color_func(detail.normal())
        );
    }
}
