//! 测试辅助：记录调用的 Mock 设备、基于 channel 的 raw socket、日志捕获
#![allow(dead_code)]

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use robot_console::error::{RawError, RobotError};
use robot_console::raw::{RawRx, RawSocket, RawTx};
use robot_console::robot::{NavigateCallback, ProgressCallback};
use robot_console::{FileInfo, ListEntry, Metadata, PlayInfo, Preview, Robot, UploadTarget};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

// ============================================================
// 日志捕获
// ============================================================

#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl LogBuffer {
    /// 每行格式化为 `LEVEL message`
    pub fn lines(&self) -> Vec<String> {
        let raw = String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned();
        raw.lines()
            .map(|line| {
                let line = line.trim_start();
                match line.split_once(' ') {
                    Some((level, msg)) => format!("{} {}", level, msg),
                    None => line.to_string(),
                }
            })
            .collect()
    }
}

/// 在捕获日志的 subscriber 下执行
pub fn with_logs<T>(f: impl FnOnce() -> T) -> (T, LogBuffer) {
    let buffer = LogBuffer::default();
    let result = capture_into(&buffer, f);
    (result, buffer)
}

/// 日志写入给定的缓冲区，执行期间可以读取已捕获的内容
pub fn capture_into<T>(buffer: &LogBuffer, f: impl FnOnce() -> T) -> T {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_max_level(tracing::Level::INFO)
        .finish();

    tracing::subscriber::with_default(subscriber, f)
}

/// 只保留指定级别的消息
pub fn messages(lines: &[String], level: &str) -> Vec<String> {
    let prefix = format!("{} ", level);
    lines
        .iter()
        .filter_map(|line| line.strip_prefix(&prefix).map(String::from))
        .collect()
}

// ============================================================
// Channel raw socket
// ============================================================

/// 读端：收到 `None` 或对端 Sender 全部释放时视为关闭
pub struct ChannelRx(Receiver<Option<Vec<u8>>>);

impl RawRx for ChannelRx {
    fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, RawError> {
        match self.0.recv_timeout(timeout) {
            Ok(Some(data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                Ok(n)
            },
            Ok(None) => Ok(0),
            Err(RecvTimeoutError::Timeout) => Err(RawError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Ok(0),
        }
    }
}

pub struct ChannelTx(Sender<Vec<u8>>);

impl RawTx for ChannelTx {
    fn send(&mut self, data: &[u8]) -> Result<(), RawError> {
        self.0.send(data.to_vec()).map_err(|_| RawError::Closed)
    }
}

/// 设备侧端点
pub struct RawPeer {
    pub to_console: Sender<Option<Vec<u8>>>,
    pub from_console: Receiver<Vec<u8>>,
}

impl RawPeer {
    pub fn say(&self, text: &str) {
        self.to_console.send(Some(text.as_bytes().to_vec())).unwrap();
    }

    pub fn close(&self) {
        self.to_console.send(None).unwrap();
    }

    pub fn next_sent(&self) -> Vec<u8> {
        self.from_console.recv_timeout(Duration::from_secs(2)).unwrap()
    }
}

pub fn channel_socket() -> (RawSocket, RawPeer) {
    let (to_console, console_rx) = unbounded();
    let (console_tx, from_console) = unbounded();
    let socket = RawSocket::new(ChannelRx(console_rx), ChannelTx(console_tx));
    (
        socket,
        RawPeer {
            to_console,
            from_console,
        },
    )
}

// ============================================================
// Mock 设备
// ============================================================

/// 记录调用的 Mock 设备
///
/// 每次调用以 `name arg1 arg2 ...` 的形式记录到共享列表。
#[derive(Default)]
pub struct MockRobot {
    pub calls: Arc<Mutex<Vec<String>>>,
    /// 按方法名返回 `Rejected(code, detail)`
    pub rejections: HashMap<&'static str, (String, String)>,
    pub listing: Vec<ListEntry>,
    pub settings: HashMap<String, String>,
    pub previews: Vec<Preview>,
    pub metadata: Metadata,
    pub download_data: Vec<u8>,
    pub eadj_data: Vec<f64>,
    pub navigation: Vec<String>,
    pub position: String,
    pub raw_socket: Option<RawSocket>,
}

impl MockRobot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls_handle(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }

    pub fn reject(mut self, method: &'static str, code: &str, detail: &str) -> Self {
        self.rejections
            .insert(method, (code.to_string(), detail.to_string()));
        self
    }

    fn call(&mut self, method: &'static str, args: &[&str]) -> Result<(), RobotError> {
        let mut record = method.to_string();
        for arg in args {
            record.push(' ');
            record.push_str(arg);
        }
        self.calls.lock().unwrap().push(record);

        match self.rejections.get(method) {
            Some((code, detail)) => Err(RobotError::rejected(code.clone(), detail.clone())),
            None => Ok(()),
        }
    }

    fn navigate(&self, navigate: NavigateCallback<'_>) {
        for nav in &self.navigation {
            navigate(nav);
        }
    }
}

impl Robot for MockRobot {
    fn deviceinfo(&mut self) -> Result<Metadata, RobotError> {
        self.call("deviceinfo", &[])?;
        Ok(self.metadata.clone())
    }

    fn kick(&mut self) -> Result<(), RobotError> {
        self.call("kick", &[])
    }

    fn quit_task(&mut self) -> Result<(), RobotError> {
        self.call("quit_task", &[])
    }

    fn position(&mut self) -> Result<String, RobotError> {
        self.call("position", &[])?;
        Ok(self.position.clone())
    }

    fn start_play(&mut self) -> Result<(), RobotError> {
        self.call("start_play", &[])
    }

    fn pause_play(&mut self) -> Result<(), RobotError> {
        self.call("pause_play", &[])
    }

    fn resume_play(&mut self) -> Result<(), RobotError> {
        self.call("resume_play", &[])
    }

    fn abort_play(&mut self) -> Result<(), RobotError> {
        self.call("abort_play", &[])
    }

    fn report_play(&mut self) -> Result<String, RobotError> {
        self.call("report_play", &[])?;
        Ok("{\"st_label\": \"IDLE\"}".to_string())
    }

    fn quit_play(&mut self) -> Result<(), RobotError> {
        self.call("quit_play", &[])
    }

    fn play_info(&mut self) -> Result<PlayInfo, RobotError> {
        self.call("play_info", &[])?;
        Ok(PlayInfo {
            metadata: self.metadata.clone(),
            previews: self.previews.clone(),
        })
    }

    fn begin_scan(&mut self) -> Result<(), RobotError> {
        self.call("begin_scan", &[])
    }

    fn scan_backward(&mut self) -> Result<(), RobotError> {
        self.call("scan_backward", &[])
    }

    fn scan_next(&mut self) -> Result<(), RobotError> {
        self.call("scan_next", &[])
    }

    fn oneshot(&mut self) -> Result<Vec<Preview>, RobotError> {
        self.call("oneshot", &[])?;
        Ok(self.previews.clone())
    }

    fn scanimages(&mut self) -> Result<Vec<Preview>, RobotError> {
        self.call("scanimages", &[])?;
        Ok(self.previews.clone())
    }

    fn list_files(&mut self, entry: &str, path: &str) -> Result<Vec<ListEntry>, RobotError> {
        self.call("list_files", &[entry, path])?;
        Ok(self.listing.clone())
    }

    fn select_file(&mut self, entry: &str, path: &str) -> Result<(), RobotError> {
        self.call("select_file", &[entry, path])
    }

    fn fileinfo(&mut self, entry: &str, path: &str) -> Result<FileInfo, RobotError> {
        self.call("fileinfo", &[entry, path])?;
        Ok(FileInfo {
            metadata: self.metadata.clone(),
            previews: self.previews.clone(),
        })
    }

    fn mkdir(&mut self, entry: &str, path: &str) -> Result<(), RobotError> {
        self.call("mkdir", &[entry, path])
    }

    fn rmdir(&mut self, entry: &str, path: &str) -> Result<(), RobotError> {
        self.call("rmdir", &[entry, path])
    }

    fn rmfile(&mut self, entry: &str, path: &str) -> Result<(), RobotError> {
        self.call("rmfile", &[entry, path])
    }

    fn cpfile(
        &mut self,
        source_entry: &str,
        source: &str,
        target_entry: &str,
        target: &str,
    ) -> Result<(), RobotError> {
        self.call("cpfile", &[source_entry, source, target_entry, target])
    }

    fn md5(&mut self, entry: &str, path: &str) -> Result<String, RobotError> {
        self.call("md5", &[entry, path])?;
        Ok("d41d8cd98f00b204e9800998ecf8427e".to_string())
    }

    fn download_file(
        &mut self,
        entry: &str,
        path: &str,
        writer: &mut dyn Write,
        progress: ProgressCallback<'_>,
    ) -> Result<(), RobotError> {
        self.call("download_file", &[entry, path])?;
        let size = self.download_data.len() as u64;
        let half = self.download_data.len() / 2;

        writer.write_all(&self.download_data[..half])?;
        progress(size - half as u64, size);
        writer.write_all(&self.download_data[half..])?;
        progress(0, size);
        Ok(())
    }

    fn upload_file(
        &mut self,
        source: &Path,
        target: &UploadTarget,
        progress: ProgressCallback<'_>,
    ) -> Result<(), RobotError> {
        let source_text = source.display().to_string();
        let target_text = format!("{:?}", target);
        self.call("upload_file", &[source_text.as_str(), target_text.as_str()])?;

        let total = std::fs::metadata(source)?.len();
        progress(total / 2, total);
        progress(total, total);
        Ok(())
    }

    fn raw_mode(&mut self) -> Result<RawSocket, RobotError> {
        self.call("raw_mode", &[])?;
        self.raw_socket
            .take()
            .ok_or_else(|| RobotError::Connection("no raw socket prepared".to_string()))
    }

    fn quit_raw_mode(&mut self) -> Result<String, RobotError> {
        self.call("quit_raw_mode", &[])?;
        Ok("<- raw mode".to_string())
    }

    fn config_set(&mut self, key: &str, value: &str) -> Result<(), RobotError> {
        self.call("config_set", &[key, value])?;
        self.settings.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn config_get(&mut self, key: &str) -> Result<Option<String>, RobotError> {
        self.call("config_get", &[key])?;
        Ok(self.settings.get(key).cloned())
    }

    fn config_del(&mut self, key: &str) -> Result<(), RobotError> {
        self.call("config_del", &[key])?;
        self.settings.remove(key);
        Ok(())
    }

    fn begin_maintain(&mut self) -> Result<(), RobotError> {
        self.call("begin_maintain", &[])
    }

    fn maintain_home(&mut self) -> Result<(), RobotError> {
        self.call("maintain_home", &[])
    }

    fn maintain_reset_mb(&mut self) -> Result<(), RobotError> {
        self.call("maintain_reset_mb", &[])
    }

    fn maintain_headinfo(&mut self) -> Result<Metadata, RobotError> {
        self.call("maintain_headinfo", &[])?;
        Ok(self.metadata.clone())
    }

    fn maintain_eadj(&mut self, clean: bool, navigate: NavigateCallback<'_>) -> Result<Vec<f64>, RobotError> {
        let clean_text = clean.to_string();
        self.call("maintain_eadj", &[clean_text.as_str()])?;
        self.navigate(navigate);
        Ok(self.eadj_data.clone())
    }

    fn maintain_hadj(
        &mut self,
        manual_h: Option<f64>,
        navigate: NavigateCallback<'_>,
    ) -> Result<f64, RobotError> {
        let h_text = format!("{:?}", manual_h);
        self.call("maintain_hadj", &[h_text.as_str()])?;
        self.navigate(navigate);
        Ok(manual_h.unwrap_or(242.5))
    }

    fn maintain_load_filament(
        &mut self,
        index: u8,
        temperature: f64,
        navigate: NavigateCallback<'_>,
    ) -> Result<(), RobotError> {
        let (index, temperature) = (index.to_string(), temperature.to_string());
        self.call("maintain_load_filament", &[index.as_str(), temperature.as_str()])?;
        self.navigate(navigate);
        Ok(())
    }

    fn maintain_unload_filament(
        &mut self,
        index: u8,
        temperature: f64,
        navigate: NavigateCallback<'_>,
    ) -> Result<(), RobotError> {
        let (index, temperature) = (index.to_string(), temperature.to_string());
        self.call("maintain_unload_filament", &[index.as_str(), temperature.as_str()])?;
        self.navigate(navigate);
        Ok(())
    }

    fn maintain_stop_load_filament(&mut self) -> Result<(), RobotError> {
        self.call("maintain_stop_load_filament", &[])
    }

    fn maintain_extruder_temp(&mut self, index: u8, temperature: f64) -> Result<(), RobotError> {
        let (index, temperature) = (index.to_string(), temperature.to_string());
        self.call("maintain_extruder_temp", &[index.as_str(), temperature.as_str()])
    }

    fn maintain_update_hbfw(
        &mut self,
        mimetype: &str,
        reader: &mut dyn Read,
        size: u64,
        navigate: NavigateCallback<'_>,
    ) -> Result<(), RobotError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        let (size_text, read_text) = (size.to_string(), data.len().to_string());
        self.call("maintain_update_hbfw", &[mimetype, size_text.as_str(), read_text.as_str()])?;
        self.navigate(navigate);
        Ok(())
    }
}

// ============================================================
// 预览查看器
// ============================================================

/// 记录打开请求的查看器
#[derive(Clone, Default)]
pub struct RecordingViewer {
    pub opened: Arc<Mutex<Vec<Vec<PathBuf>>>>,
}

impl robot_console::PreviewOpener for RecordingViewer {
    fn open(&self, paths: &[PathBuf]) -> std::io::Result<()> {
        self.opened.lock().unwrap().push(paths.to_vec());
        Ok(())
    }
}
