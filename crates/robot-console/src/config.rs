//! 控制台配置
//!
//! 配置文件路径：
//! - Linux: `~/.config/robot-console/console.toml`
//! - macOS: `~/Library/Application Support/robot-console/console.toml`
//! - Windows: `%APPDATA%\robot-console\console.toml`

use crate::relay::RelayConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot determine config directory")]
    NoConfigDir,

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// 控制台配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub raw: RawSection,
    pub preview: PreviewSection,
    pub shell: ShellSection,
}

/// `[raw]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSection {
    /// relay 轮询超时（毫秒）
    pub poll_interval_ms: u64,
    /// 单次读取字节数
    pub read_buffer: usize,
}

impl Default for RawSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            read_buffer: 4096,
        }
    }
}

/// `[preview]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSection {
    /// 外部查看器命令，未设置时使用系统默认程序
    pub viewer: Option<String>,
}

/// `[shell]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSection {
    pub prompt: String,
    pub raw_prompt: String,
    pub history_file: Option<PathBuf>,
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            prompt: "robot> ".to_string(),
            raw_prompt: "raw> ".to_string(),
            history_file: None,
        }
    }
}

impl ConsoleConfig {
    /// 默认配置文件路径
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push("robot-console");
        path.push("console.toml");
        Ok(path)
    }

    /// 从文件加载，文件不存在时返回默认配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 从默认路径加载
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file(Self::default_path()?)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 保存配置（自动创建目录）
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        fs::write(path, self.to_toml()?).map_err(io_err)
    }

    pub fn relay(&self) -> RelayConfig {
        RelayConfig {
            poll_interval: Duration::from_millis(self.raw.poll_interval_ms),
            read_buffer: self.raw.read_buffer,
        }
    }
}
