//! 设备对象接口
//!
//! 控制台本身不实现任何设备协议，所有设备操作都通过 [`Robot`] trait 转发。

use crate::error::RobotError;
use crate::raw::RawSocket;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

/// 有序的字符串键值信息（设备信息、文件元数据等）
pub type Metadata = BTreeMap<String, String>;

/// 导航回调：长时间维护操作中的中间状态
pub type NavigateCallback<'a> = &'a mut dyn FnMut(&str);

/// 进度回调：(参数 1, 总字节数)
///
/// 下载时参数 1 为剩余字节数，上传时为已完成字节数。
pub type ProgressCallback<'a> = &'a mut dyn FnMut(u64, u64);

/// 列目录条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEntry {
    Dir(String),
    File(String),
}

/// 设备返回的预览图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub mime: String,
    pub data: Vec<u8>,
}

impl Preview {
    pub fn new(mime: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            mime: mime.into(),
            data: data.into(),
        }
    }
}

/// 文件信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInfo {
    pub metadata: Metadata,
    pub previews: Vec<Preview>,
}

/// 当前打印任务信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayInfo {
    pub metadata: Metadata,
    pub previews: Vec<Preview>,
}

/// 上传目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    /// 存储路径，`#` 表示直接上传到打印槽
    Storage(String),
    /// 主控固件
    Firmware,
    /// 主板固件
    MainboardFirmware,
}

impl Default for UploadTarget {
    fn default() -> Self {
        UploadTarget::Storage("#".to_string())
    }
}

/// 设备对象
///
/// 简单命令的返回值由控制台格式化输出；返回 `RobotError::Rejected`
/// 时控制台记录 `RuntimeError(code, detail)` 并继续运行。
pub trait Robot {
    // === 设备与任务 ===
    fn deviceinfo(&mut self) -> Result<Metadata, RobotError>;
    fn kick(&mut self) -> Result<(), RobotError>;
    fn quit_task(&mut self) -> Result<(), RobotError>;
    fn position(&mut self) -> Result<String, RobotError>;

    // === 打印控制 ===
    fn start_play(&mut self) -> Result<(), RobotError>;
    fn pause_play(&mut self) -> Result<(), RobotError>;
    fn resume_play(&mut self) -> Result<(), RobotError>;
    fn abort_play(&mut self) -> Result<(), RobotError>;
    fn report_play(&mut self) -> Result<String, RobotError>;
    fn quit_play(&mut self) -> Result<(), RobotError>;
    fn play_info(&mut self) -> Result<PlayInfo, RobotError>;

    // === 扫描 ===
    fn begin_scan(&mut self) -> Result<(), RobotError>;
    fn scan_backward(&mut self) -> Result<(), RobotError>;
    fn scan_next(&mut self) -> Result<(), RobotError>;
    fn oneshot(&mut self) -> Result<Vec<Preview>, RobotError>;
    fn scanimages(&mut self) -> Result<Vec<Preview>, RobotError>;

    // === 文件系统 ===
    fn list_files(&mut self, entry: &str, path: &str) -> Result<Vec<ListEntry>, RobotError>;
    fn select_file(&mut self, entry: &str, path: &str) -> Result<(), RobotError>;
    fn fileinfo(&mut self, entry: &str, path: &str) -> Result<FileInfo, RobotError>;
    fn mkdir(&mut self, entry: &str, path: &str) -> Result<(), RobotError>;
    fn rmdir(&mut self, entry: &str, path: &str) -> Result<(), RobotError>;
    fn rmfile(&mut self, entry: &str, path: &str) -> Result<(), RobotError>;
    fn cpfile(
        &mut self,
        source_entry: &str,
        source: &str,
        target_entry: &str,
        target: &str,
    ) -> Result<(), RobotError>;
    fn md5(&mut self, entry: &str, path: &str) -> Result<String, RobotError>;

    /// 下载到 `writer`，进度回调参数为 (剩余, 总数)
    fn download_file(
        &mut self,
        entry: &str,
        path: &str,
        writer: &mut dyn Write,
        progress: ProgressCallback<'_>,
    ) -> Result<(), RobotError>;

    /// 上传本地文件，进度回调参数为 (已完成, 总数)
    fn upload_file(
        &mut self,
        source: &Path,
        target: &UploadTarget,
        progress: ProgressCallback<'_>,
    ) -> Result<(), RobotError>;

    // === Raw 模式 ===
    fn raw_mode(&mut self) -> Result<RawSocket, RobotError>;
    /// 退出 raw 模式，返回设备确认信息
    fn quit_raw_mode(&mut self) -> Result<String, RobotError>;

    // === 键值配置 ===
    fn config_set(&mut self, key: &str, value: &str) -> Result<(), RobotError>;
    fn config_get(&mut self, key: &str) -> Result<Option<String>, RobotError>;
    fn config_del(&mut self, key: &str) -> Result<(), RobotError>;

    // === 维护 ===
    fn begin_maintain(&mut self) -> Result<(), RobotError>;
    fn maintain_home(&mut self) -> Result<(), RobotError>;
    fn maintain_reset_mb(&mut self) -> Result<(), RobotError>;
    fn maintain_headinfo(&mut self) -> Result<Metadata, RobotError>;
    fn maintain_eadj(&mut self, clean: bool, navigate: NavigateCallback<'_>) -> Result<Vec<f64>, RobotError>;
    fn maintain_hadj(
        &mut self,
        manual_h: Option<f64>,
        navigate: NavigateCallback<'_>,
    ) -> Result<f64, RobotError>;
    fn maintain_load_filament(
        &mut self,
        index: u8,
        temperature: f64,
        navigate: NavigateCallback<'_>,
    ) -> Result<(), RobotError>;
    fn maintain_unload_filament(
        &mut self,
        index: u8,
        temperature: f64,
        navigate: NavigateCallback<'_>,
    ) -> Result<(), RobotError>;
    fn maintain_stop_load_filament(&mut self) -> Result<(), RobotError>;
    fn maintain_extruder_temp(&mut self, index: u8, temperature: f64) -> Result<(), RobotError>;
    fn maintain_update_hbfw(
        &mut self,
        mimetype: &str,
        reader: &mut dyn Read,
        size: u64,
        navigate: NavigateCallback<'_>,
    ) -> Result<(), RobotError>;
}

/// 简单命令返回值转为可显示文本，"假值"（空）返回 `None`
pub trait Reply {
    fn into_reply(self) -> Option<String>;
}

impl Reply for () {
    fn into_reply(self) -> Option<String> {
        None
    }
}

impl Reply for String {
    fn into_reply(self) -> Option<String> {
        (!self.is_empty()).then_some(self)
    }
}

impl Reply for Option<String> {
    fn into_reply(self) -> Option<String> {
        self.and_then(Reply::into_reply)
    }
}

impl Reply for Metadata {
    fn into_reply(self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        Some(pairs.join(", "))
    }
}
