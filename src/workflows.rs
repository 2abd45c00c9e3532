// src/workflows.rs

use crate::{
    ResolveContext,
    constants::{self, messages},
    error::{AppError, AppResult},
    models::{Platform, ResolutionResult},
    payload::{self, ResponsePayload},
    symbols, ui, utils,
};
use anyhow::anyhow;
use colored::*;
use futures::{StreamExt, stream};
use log::{error, info};
use serde::Serialize;
use std::path::PathBuf;

/// 运行单任务模式 (--url)
pub(crate) async fn run_single(context: ResolveContext, url: &str) -> AppResult<()> {
    let platform = platform_for(&context, url)?;

    if context.args.json {
        let response =
            payload::handle_download_request(&context.resolver, Some(url), Some(platform.as_hint())).await;
        print_json(&response)?;
        return match response.error {
            Some(message) if !response.success => Err(AppError::UserInputError(message)),
            _ => Ok(()),
        };
    }

    let result = resolve_with_spinner(&context, url, platform).await?;
    report(&context, &result, platform)
}

/// 运行交互模式
pub(crate) async fn run_interactive(context: ResolveContext) -> AppResult<()> {
    ui::print_header("交互模式");
    ui::plain(&format!("在此模式下，你可以逐一输入视频链接进行解析。直接回车或按 {} 退出。", *symbols::CTRL_C));

    loop {
        match ui::prompt("请输入 TikTok / Facebook 视频链接", None) {
            Ok(input) if !input.is_empty() => {
                let result = async {
                    let platform = platform_for(&context, &input)?;
                    let result = resolve_with_spinner(&context, &input, platform).await?;
                    report(&context, &result, platform)
                }
                .await;

                if let Err(e) = result {
                    error!("交互模式任务 '{}' 失败: {}", &input, e);
                    match e {
                        AppError::UserInputError(msg) => ui::warn(&msg),
                        e => ui::error(&format!("处理时发生错误: {}", e)),
                    }
                }
            }
            Ok(_) => break,
            Err(_) => return Err(AppError::UserInterrupt),
        }
    }

    ui::plain("");
    ui::info("退出交互模式。");
    Ok(())
}

#[derive(Serialize)]
struct BatchItem {
    input: String,
    #[serde(flatten)]
    response: ResponsePayload,
}

/// 运行批量模式。各链接之间并发，单个链接内部的策略仍按顺序执行。
pub(crate) async fn run_batch(batch_file: PathBuf, context: ResolveContext) -> AppResult<()> {
    let content = std::fs::read_to_string(&batch_file).map_err(|e| {
        error!("读取批量文件 '{}' 失败: {}", batch_file.display(), e);
        AppError::from(e)
    })?;
    let tasks = utils::parse_batch_lines(&content);
    if tasks.is_empty() {
        ui::warn("批量文件为空。");
        return Ok(());
    }
    info!("批量模式: {} 个任务，并发数 {}", tasks.len(), context.config.batch_workers);

    let pbar = (!context.args.json).then(|| {
        ui::print_header(&format!("批量解析 (共 {} 个，按 {} 可随时退出)", tasks.len(), *symbols::CTRL_C));
        ui::new_tasks_progress_bar(tasks.len() as u64, "解析")
    });

    let mut stream = stream::iter(tasks.iter().cloned())
        .map(|task| {
            let context = context.clone();
            async move {
                let response = match platform_for(&context, &task) {
                    Ok(platform) => {
                        payload::handle_download_request(&context.resolver, Some(&task), Some(platform.as_hint()))
                            .await
                    }
                    Err(_) => ResponsePayload::failure(messages::INVALID_PLATFORM),
                };
                BatchItem { input: task, response }
            }
        })
        .buffer_unordered(context.config.batch_workers.max(1));

    let mut items = Vec::with_capacity(tasks.len());
    let mut failed = 0;
    while let Some(item) = stream.next().await {
        if !item.response.success {
            failed += 1;
        }
        if let Some(pbar) = &pbar {
            let short = utils::truncate_text(&item.input, constants::URL_TRUNCATE_LENGTH);
            match (&item.response.data, &item.response.error) {
                (Some(data), _) => pbar.println(format!(
                    "{} {} ({} 个链接)",
                    *symbols::OK,
                    short,
                    data.links.len()
                )),
                (None, Some(err)) => pbar.println(format!("{} {} ({})", *symbols::ERROR, short, err)),
                (None, None) => pbar.println(format!("{} {}", *symbols::WARN, short)),
            }
            pbar.inc(1);
        }
        items.push(item);
    }

    if let Some(pbar) = pbar {
        pbar.finish_and_clear();
        print_batch_report(&items, failed);
    } else {
        print_json(&items)?;
    }

    if failed > 0 {
        Err(AppError::Other(anyhow!("{} 个链接解析失败。", failed)))
    } else {
        Ok(())
    }
}

// --- 模块内部辅助函数 ---

fn platform_for(context: &ResolveContext, url: &str) -> AppResult<Platform> {
    context.args.platform_for(url).ok_or_else(|| {
        AppError::UserInputError(format!("无法从链接 '{}' 判断平台，请使用 --platform 指定。", url))
    })
}

async fn resolve_with_spinner(
    context: &ResolveContext,
    url: &str,
    platform: Platform,
) -> AppResult<ResolutionResult> {
    let spinner = ui::new_spinner(&format!(
        "正在解析 [{}] {}",
        platform,
        utils::truncate_text(url, constants::URL_TRUNCATE_LENGTH)
    ));
    let result = context.resolver.resolve(url, platform).await;
    spinner.finish_and_clear();
    result
}

/// 打印单个结果；未找到链接时以用户可读的错误返回
fn report(context: &ResolveContext, result: &ResolutionResult, platform: Platform) -> AppResult<()> {
    if let Some(reason) = &result.canonical.degraded {
        ui::warn(&format!("链接规范化未完成，按原链接继续: {}", reason));
    }
    if result.is_found() {
        ui::print_result(result);
    }
    if context.args.trace {
        ui::print_diagnostic(&result.diagnostic);
    }

    match ResponsePayload::from_result(result, platform).error {
        Some(message) => Err(AppError::UserInputError(message)),
        None => Ok(()),
    }
}

fn print_batch_report(items: &[BatchItem], failed: usize) {
    ui::print_header("批量任务报告");
    for item in items.iter().filter(|i| i.response.success) {
        if let Some(data) = &item.response.data {
            ui::print_sub_header(&utils::truncate_text(&item.input, constants::URL_TRUNCATE_LENGTH));
            for link in &data.links {
                println!("  {:<5} {}", link.quality.yellow(), link.url);
            }
        }
    }
    println!(
        "\n{} | {} | 总计: {}",
        format!("成功: {}", items.len() - failed).green(),
        format!("失败: {}", failed).red(),
        items.len()
    );
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
