//! # Robot Console
//!
//! 交互式设备控制台的命令分发层。
//!
//! 控制台把用户输入的一行文本分词、在命令表中查找处理函数并调用，
//! 所有设备操作都转发给实现了 [`Robot`] trait 的设备对象。
//! 另外支持 raw 模式：输入原样转发到设备的 raw socket，
//! 后台线程把设备输出逐行写入日志。
//!
//! ## 模块
//!
//! - `console` - 控制台、命令表、各类命令处理函数
//! - `table` - 命令树与查找
//! - `relay` - raw 模式后台读取线程
//! - `raw` - raw socket 抽象（TCP / Unix socket）
//! - `robot` - 设备对象接口与数据类型
//! - `config` - 配置文件
//! - `sim` - 内存模拟设备（`simulator` feature）
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use robot_console::Console;
//!
//! let mut console = Console::new(my_robot);
//! console.on_cmd("ls SD/")?;
//! console.on_cmd("config get nozzle_temp")?;
//! console.on_cmd("raw")?;      // 进入 raw 模式
//! console.on_cmd("M105")?;     // 原样发送
//! console.on_cmd("quit")?;     // 退出 raw 模式
//! ```
//!
//! 所有输出都通过 `tracing` 记录，嵌入方负责安装 subscriber。

pub mod args;
pub mod config;
mod console;
pub mod error;
pub mod mode;
pub mod preview;
pub mod raw;
pub mod relay;
pub mod robot;
pub mod table;

#[cfg(feature = "simulator")]
pub mod sim;

pub use config::{ConfigError, ConsoleConfig};
pub use console::{CommandFn, Console, SimpleFn};
pub use error::{ConsoleError, DomainError, RawError, RobotError};
pub use mode::{AtomicConsoleMode, ConsoleMode};
pub use preview::{PreviewOpener, SystemViewer};
pub use raw::{RawRx, RawSocket, RawTx};
pub use relay::{RelayConfig, RelayExit};
pub use robot::{FileInfo, ListEntry, Metadata, PlayInfo, Preview, Robot, UploadTarget};

#[cfg(feature = "simulator")]
pub use sim::SimulatedRobot;
