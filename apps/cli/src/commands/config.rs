//! 配置管理命令
//!
//! 显示生效的配置，或在配置路径写入默认配置

use anyhow::{Context, Result};
use clap::Subcommand;
use robot_console::ConsoleConfig;
use std::path::{Path, PathBuf};

/// 配置文件路径：命令行指定优先，否则使用默认路径
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => ConsoleConfig::default_path().context("无法确定配置目录"),
    }
}

/// 加载配置（文件不存在时使用默认值）
pub fn load_config(explicit: Option<&Path>) -> Result<ConsoleConfig> {
    let path = config_path(explicit)?;
    ConsoleConfig::load_from_file(&path)
        .with_context(|| format!("加载配置失败: {}", path.display()))
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 显示生效的配置及其路径
    Show,

    /// 写入默认配置
    Init {
        /// 覆盖已有的配置文件
        #[arg(short, long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn execute(self, explicit: Option<&Path>) -> Result<()> {
        match self {
            ConfigCommand::Show => Self::show_(explicit),
            ConfigCommand::Init { force } => Self::init_(explicit, force),
        }
    }

    fn show_(explicit: Option<&Path>) -> Result<()> {
        let path = config_path(explicit)?;
        let config = load_config(explicit)?;

        if path.exists() {
            println!("# {}", path.display());
        } else {
            println!("# {} (not found, using defaults)", path.display());
        }
        print!("{}", config.to_toml()?);
        Ok(())
    }

    fn init_(explicit: Option<&Path>, force: bool) -> Result<()> {
        let path = config_path(explicit)?;

        if path.exists() && !force {
            anyhow::bail!(
                "配置文件已存在: {}（使用 --force 覆盖）",
                path.display()
            );
        }

        ConsoleConfig::default()
            .save_to_file(&path)
            .with_context(|| format!("写入配置文件失败: {}", path.display()))?;
        println!("✅ 已写入默认配置: {}", path.display());
        Ok(())
    }
}
