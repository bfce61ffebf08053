//! # Robot Console CLI
//!
//! 连接模拟设备的交互式控制台。
//!
//! ```bash
//! $ robot-console
//! robot> ls SD/
//! robot> select SD/models/cube.gcode
//! robot> start
//! robot> raw
//! raw> M105
//! raw> quit
//! robot> exit
//! ```
//!
//! 配置管理：
//!
//! ```bash
//! robot-console config init
//! robot-console config show --config ./console.toml
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod modes;

use commands::ConfigCommand;
use commands::config::load_config;
use modes::repl::run_repl;

/// Robot Console - 设备交互式控制台
#[derive(Parser, Debug)]
#[command(name = "robot-console")]
#[command(about = "Interactive console for robot devices", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认 <config_dir>/robot-console/console.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 启动交互式 Shell（默认）
    Shell,

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    // 初始化日志：控制台输出不带时间戳和 target
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("robot_console=info,robot_console_cli=info")),
        )
        .with_ansi(std::io::stdout().is_terminal())
        .without_time()
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Config(cmd) => cmd.execute(cli.config.as_deref()),

        Commands::Shell => {
            let config = load_config(cli.config.as_deref())?;
            run_repl(&config)
        },
    }
}
