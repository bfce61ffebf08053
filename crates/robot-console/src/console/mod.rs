//! 控制台：命令分发与 raw 模式状态机
//!
//! ```text
//! on_cmd(line)
//!   ├── raw 会话存在:  "quit" -> 退出 raw 模式
//!   │                  relay 已终止 -> 补完退出流程，丢弃输入
//!   │                  其余原样发送到 raw socket
//!   └── 无 raw 会话:   分词 -> 简单命令表（统一输出 ok/结果）
//!                           -> 扩展命令表（处理函数自行输出）
//!                           -> Unknown command
//! ```

mod commands;
mod maintain;
mod playback;
mod settings;
mod storage;

use crate::args::tokenize;
use crate::config::ConsoleConfig;
use crate::error::ConsoleError;
use crate::mode::{AtomicConsoleMode, ConsoleMode};
use crate::preview::{PreviewOpener, SystemViewer};
use crate::raw::RawTx;
use crate::relay::{RelayConfig, RelayExit, spawn_relay};
use crate::robot::Robot;
use crate::table::{CommandTable, command_paths, resolve};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, error, info, warn};

/// 简单命令：返回值交给 [`Console::simple_cmd`] 统一输出
pub type SimpleFn<R> = fn(&mut R, &[String]) -> Result<Option<String>, ConsoleError>;

/// 扩展命令：自行解析参数并输出
pub type CommandFn<R> = fn(&mut Console<R>, &[String]) -> Result<(), ConsoleError>;

/// raw 模式会话：写端 + relay 线程
struct RawSession {
    tx: Box<dyn RawTx>,
    relay: JoinHandle<RelayExit>,
}

/// 交互式控制台
pub struct Console<R: Robot> {
    robot: R,
    simple: CommandTable<SimpleFn<R>>,
    extended: CommandTable<CommandFn<R>>,
    mode: Arc<AtomicConsoleMode>,
    raw: Option<RawSession>,
    relay_config: RelayConfig,
    viewer: Box<dyn PreviewOpener>,
}

impl<R: Robot> Console<R> {
    /// 使用默认配置创建控制台
    pub fn new(robot: R) -> Self {
        Self::with_config(robot, &ConsoleConfig::default())
    }

    pub fn with_config(robot: R, config: &ConsoleConfig) -> Self {
        Self {
            robot,
            simple: commands::simple_table(),
            extended: commands::extended_table(),
            mode: Arc::new(AtomicConsoleMode::new(ConsoleMode::Standard)),
            raw: None,
            relay_config: config.relay(),
            viewer: Box::new(SystemViewer::new(config.preview.viewer.clone())),
        }
    }

    /// 替换预览查看器
    pub fn with_viewer(mut self, viewer: impl PreviewOpener + 'static) -> Self {
        self.viewer = Box::new(viewer);
        self
    }

    pub fn with_relay_config(mut self, config: RelayConfig) -> Self {
        self.relay_config = config;
        self
    }

    pub fn robot(&self) -> &R {
        &self.robot
    }

    pub fn robot_mut(&mut self) -> &mut R {
        &mut self.robot
    }

    /// 当前模式
    pub fn mode(&self) -> ConsoleMode {
        self.mode.get()
    }

    /// 共享模式标志（shell 用于选择提示符）
    pub fn mode_handle(&self) -> Arc<AtomicConsoleMode> {
        self.mode.clone()
    }

    /// relay 线程是否存在
    pub fn has_relay(&self) -> bool {
        self.raw.is_some()
    }

    /// 所有命令路径（用于帮助信息）
    pub fn command_paths(&self) -> Vec<String> {
        let mut paths = command_paths(&self.simple);
        for path in command_paths(&self.extended) {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }

    /// 处理一行输入
    ///
    /// 领域错误和未知命令在这里记录日志并吞掉，其余错误返回给调用方。
    ///
    /// raw 会话存在期间收到的输入永远不会被当作命令分发：
    /// relay 已自行终止时，这一行只用于补完退出流程（`quit` 之外的输入被丢弃）。
    pub fn on_cmd(&mut self, line: &str) -> Result<(), ConsoleError> {
        if self.raw.is_some() {
            if line == "quit" {
                return self.quit_raw_mode();
            }
            if self.mode.get().is_standard() {
                self.quit_raw_mode()?;
                if !line.trim().is_empty() {
                    warn!("Raw session closed, input discarded: {}", line);
                }
                return Ok(());
            }
            return self.send_raw(line);
        }

        let args = tokenize(line)?;
        if args.is_empty() {
            return Ok(());
        }

        match self.dispatch(&args) {
            Ok(true) => Ok(()),
            Ok(false) => {
                error!("Unknown command: {}", line);
                Ok(())
            },
            Err(ConsoleError::Domain(e)) => {
                error!("RuntimeError({}, {})", e.code(), e.detail());
                Ok(())
            },
            Err(e) => Err(e),
        }
    }

    /// 依次尝试简单命令表和扩展命令表，返回是否匹配
    fn dispatch(&mut self, args: &[String]) -> Result<bool, ConsoleError> {
        if let Some((handler, rest)) = resolve(&self.simple, args) {
            debug!("Dispatch simple command {:?}", args[0]);
            let reply = handler(&mut self.robot, rest)?;
            Self::simple_cmd(reply);
            return Ok(true);
        }

        if let Some((handler, rest)) = resolve(&self.extended, args) {
            debug!("Dispatch command {:?}", args[0]);
            handler(self, rest)?;
            return Ok(true);
        }

        Ok(false)
    }

    /// 统一输出：有结果输出结果，否则输出 `ok`
    pub(crate) fn simple_cmd(reply: Option<String>) {
        match reply {
            Some(text) if !text.is_empty() => info!("{}", text),
            _ => info!("ok"),
        }
    }

    /// 进入 raw 模式
    pub(crate) fn raw_mode(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        crate::args::expect_args("raw", args, 0..=0)?;

        let (rx, tx) = self.robot.raw_mode()?.split();
        self.mode.set(ConsoleMode::Raw);

        let relay = match spawn_relay(rx, self.mode.clone(), self.relay_config) {
            Ok(handle) => handle,
            Err(e) => {
                self.mode.set(ConsoleMode::Standard);
                return Err(e.into());
            },
        };

        self.raw = Some(RawSession { tx, relay });
        info!("raw mode ->");
        Ok(())
    }

    /// 退出 raw 模式：切回 Standard、释放 socket、等待 relay 线程、输出设备确认
    pub fn quit_raw_mode(&mut self) -> Result<(), ConsoleError> {
        self.mode.set(ConsoleMode::Standard);

        let Some(session) = self.raw.take() else {
            return Ok(());
        };

        drop(session.tx);
        let exit = session.relay.join().map_err(|_| ConsoleError::RelayPanicked)?;
        debug!("Relay thread exited: {:?}", exit);

        let ack = self.robot.quit_raw_mode()?;
        info!("{}", ack);
        Ok(())
    }

    fn send_raw(&mut self, line: &str) -> Result<(), ConsoleError> {
        let session = self.raw.as_mut().ok_or(ConsoleError::Raw(crate::error::RawError::Closed))?;

        let mut payload = Vec::with_capacity(line.len() + 1);
        payload.extend_from_slice(line.as_bytes());
        payload.push(b'\n');

        session.tx.send(&payload)?;
        Ok(())
    }

    /// 关闭控制台：raw 模式下完整退出
    pub fn close(&mut self) -> Result<(), ConsoleError> {
        if self.raw.is_some() {
            self.quit_raw_mode()?;
        }
        Ok(())
    }

    pub(crate) fn viewer(&self) -> &dyn PreviewOpener {
        self.viewer.as_ref()
    }
}

impl<R: Robot> Drop for Console<R> {
    fn drop(&mut self) {
        // 只停止 relay 线程，不再访问设备
        self.mode.set(ConsoleMode::Standard);
        if let Some(session) = self.raw.take() {
            drop(session.tx);
            if session.relay.join().is_err() {
                warn!("Raw relay thread panicked");
            }
        }
    }
}
