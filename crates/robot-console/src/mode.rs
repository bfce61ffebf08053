//! 控制台模式定义
//!
//! 前台线程与 relay 线程共享同一个模式标志，用原子变量实现。

use std::sync::atomic::{AtomicU8, Ordering};

/// 控制台工作模式
///
/// - **Standard**: 输入行被分词并分发到命令表
/// - **Raw**: 输入行原样转发到 raw socket，后台线程回显设备输出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ConsoleMode {
    #[default]
    Standard = 0,
    Raw = 1,
}

impl ConsoleMode {
    /// 从 u8 转换，无效值视为 Standard
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Raw,
            _ => Self::Standard,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_raw(self) -> bool {
        self == Self::Raw
    }

    pub fn is_standard(self) -> bool {
        self == Self::Standard
    }
}

/// 控制台模式（原子版本，用于线程间共享）
///
/// # 使用场景
///
/// - relay 线程每次轮询前读取模式，非 Raw 即退出
/// - 前台线程退出 raw 模式时写入 Standard
/// - relay 线程自行终止时用 `compare_exchange` 把 Raw 改回 Standard
///
/// # 示例
///
/// ```rust
/// use robot_console::mode::{AtomicConsoleMode, ConsoleMode};
///
/// let mode = AtomicConsoleMode::new(ConsoleMode::Standard);
/// mode.set(ConsoleMode::Raw);
/// assert!(mode.get().is_raw());
/// ```
#[derive(Debug, Default)]
pub struct AtomicConsoleMode {
    inner: AtomicU8,
}

impl AtomicConsoleMode {
    pub fn new(mode: ConsoleMode) -> Self {
        Self {
            inner: AtomicU8::new(mode.as_u8()),
        }
    }

    // Acquire/Release: relay 线程看到 Standard 时，也能看到前台在此之前的写入
    pub fn get(&self) -> ConsoleMode {
        ConsoleMode::from_u8(self.inner.load(Ordering::Acquire))
    }

    pub fn set(&self, mode: ConsoleMode) {
        self.inner.store(mode.as_u8(), Ordering::Release);
    }

    /// 比较并交换
    ///
    /// 当前值等于 `current` 时设置为 `new` 并返回 true，否则返回 false。
    pub fn compare_exchange(&self, current: ConsoleMode, new: ConsoleMode) -> bool {
        self.inner
            .compare_exchange(
                current.as_u8(),
                new.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}
