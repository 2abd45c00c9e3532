// src/main.rs

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use std::{env, sync::Arc, time::Duration};
use vidsnap::{
    cli::Cli,
    error::AppError,
    run_from_cli, utils,
};

#[tokio::main]
async fn main() {
    // 为 Windows 终端启用 ANSI 颜色支持
    #[cfg(windows)]
    {
        colored::control::set_virtual_terminal(true).ok();
    }
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n{} 用户强制中断程序。", "[!]".yellow());
            tokio::time::sleep(Duration::from_millis(100)).await;
            std::process::exit(130);
        }
    });

    let bin_name = env::var("CARGO_BIN_NAME").unwrap_or_else(|_| "vidsnap".to_string());

    let after_help = format!(
        "示例:\n  # 启动交互模式\n  {bin} -i\n\n  # 解析单个链接 (平台根据域名自动判断)\n  {bin} --url \"https://vm.tiktok.com/...\"\n\n  # 指定平台并输出 JSON\n  {bin} --url \"https://fb.watch/...\" --platform facebook --json\n\n  # 批量解析，并显示每个策略的执行记录\n  {bin} -b my_links.txt -w 4 --trace",
        bin = bin_name
    );

    let cmd = Cli::command().after_help(after_help);
    let args = match Cli::from_arg_matches(&cmd.get_matches()) {
        Ok(args) => Arc::new(args),
        Err(e) => e.exit(),
    };

    utils::init_logging(args.log_level);

    match run_from_cli(args).await {
        Ok(()) => {}
        Err(AppError::UserInterrupt) => std::process::exit(130),
        Err(AppError::UserInputError(msg)) => {
            eprintln!("\n{} {}", "[!]".yellow(), msg.yellow());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("\n{} {}", "[X]".red(), format!("程序执行出错: {}", e).red());
            std::process::exit(1);
        }
    }
}
