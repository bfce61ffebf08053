//! Raw 模式 relay 线程
//!
//! 在模式为 Raw 期间轮询 raw socket 读端，把设备输出按行写入日志。

use crate::error::RawError;
use crate::mode::{AtomicConsoleMode, ConsoleMode};
use crate::raw::RawRx;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{error, info, trace, warn};

/// Relay 参数
#[derive(Debug, Clone, Copy)]
pub struct RelayConfig {
    /// 单次轮询超时
    pub poll_interval: Duration,
    /// 单次读取缓冲区大小
    pub read_buffer: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            read_buffer: 4096,
        }
    }
}

/// Relay 线程退出原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayExit {
    /// 前台切回 Standard
    Stopped,
    /// 对端关闭连接
    PeerClosed,
    /// 读取失败
    Failed(String),
}

/// Relay 主循环
///
/// # 参数
/// - `rx`: raw socket 读端
/// - `mode`: 共享模式标志（生命周期联动）
/// - `config`: 轮询参数
///
/// 自行终止（对端关闭或读取失败）时把模式从 Raw 复位为 Standard，
/// 前台下一次处理输入时完成退出流程。
pub fn relay_loop(mut rx: Box<dyn RawRx>, mode: Arc<AtomicConsoleMode>, config: RelayConfig) -> RelayExit {
    let mut buf = vec![0u8; config.read_buffer.max(1)];

    let exit = loop {
        if !mode.get().is_raw() {
            trace!("Relay: mode left raw, exiting");
            break RelayExit::Stopped;
        }

        match rx.receive(&mut buf, config.poll_interval) {
            Ok(0) => {
                error!("Connection closed");
                break RelayExit::PeerClosed;
            },
            Ok(n) => log_lines(&buf[..n]),
            Err(RawError::Timeout) => continue,
            Err(RawError::Closed) => {
                error!("Connection closed");
                break RelayExit::PeerClosed;
            },
            Err(e) => {
                warn!("Raw mode fatal, your session may be broken: {}", e);
                break RelayExit::Failed(e.to_string());
            },
        }
    };

    if exit != RelayExit::Stopped && mode.compare_exchange(ConsoleMode::Raw, ConsoleMode::Standard) {
        info!("raw mode <- (connection lost, press enter to continue)");
    }

    exit
}

/// 启动 relay 线程，继承当前线程的 tracing dispatcher
pub fn spawn_relay(
    rx: Box<dyn RawRx>,
    mode: Arc<AtomicConsoleMode>,
    config: RelayConfig,
) -> std::io::Result<JoinHandle<RelayExit>> {
    let dispatch = tracing::dispatcher::get_default(|d| d.clone());

    thread::Builder::new()
        .name("raw-relay".to_string())
        .spawn(move || tracing::dispatcher::with_default(&dispatch, || relay_loop(rx, mode, config)))
}

/// 解码并逐行记录（无效 UTF-8 被替换，去掉行尾 `\r` 和 `\0`）
fn log_lines(data: &[u8]) {
    let decoded = String::from_utf8_lossy(data);
    let text = decoded.strip_suffix('\n').unwrap_or(&decoded[..]);

    for line in text.split('\n') {
        info!("{}", line.trim_end_matches(['\r', '\0']));
    }
}
