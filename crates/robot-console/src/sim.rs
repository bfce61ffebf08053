//! 内存模拟设备
//!
//! 用于没有硬件时演示和调试控制台：
//! - `SD` / `USB` 两个内存存储
//! - 打印任务状态机（Idle / Running / Paused）
//! - 键值配置
//! - raw 模式：本地 TCP 回环，回显线程对每一行回复 `> <line>`

use crate::error::RobotError;
use crate::raw::RawSocket;
use crate::robot::{
    FileInfo, ListEntry, Metadata, NavigateCallback, PlayInfo, Preview, ProgressCallback, Robot,
    UploadTarget,
};
use std::collections::{BTreeMap, HashMap};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::path::Path;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// 单次传输块大小
const CHUNK_SIZE: usize = 1024;

/// 打印任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Idle,
    Running,
    Paused,
}

/// 内存存储节点：`None` 为目录，`Some` 为文件内容
type Storage = BTreeMap<String, Option<Vec<u8>>>;

/// 模拟设备
pub struct SimulatedRobot {
    storages: HashMap<&'static str, Storage>,
    selected: Option<(String, String)>,
    play: PlayState,
    settings: BTreeMap<String, String>,
    raw: Option<(TcpStream, JoinHandle<()>)>,
}

impl Default for SimulatedRobot {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedRobot {
    pub fn new() -> Self {
        let mut sd = Storage::new();
        sd.insert("models".to_string(), None);
        sd.insert("models/cube.gcode".to_string(), Some(b"G28\nG1 X10 Y10\n".to_vec()));
        sd.insert("hello.gcode".to_string(), Some(b"G28\n".to_vec()));

        let mut usb = Storage::new();
        usb.insert("vase.gcode".to_string(), Some(b"G28\nG1 Z5\n".to_vec()));

        Self {
            storages: HashMap::from([("SD", sd), ("USB", usb)]),
            selected: None,
            play: PlayState::Idle,
            settings: BTreeMap::new(),
            raw: None,
        }
    }

    pub fn play_state(&self) -> PlayState {
        self.play
    }

    /// 读取文件内容
    pub fn file(&self, entry: &str, path: &str) -> Option<&[u8]> {
        self.storages.get(entry)?.get(path)?.as_deref()
    }

    fn storage(&mut self, entry: &str) -> Result<&mut Storage, RobotError> {
        self.storages
            .get_mut(entry)
            .ok_or_else(|| RobotError::rejected("NOT_EXIST", "BAD_ENTRY"))
    }

    fn read_file(&mut self, entry: &str, path: &str) -> Result<Vec<u8>, RobotError> {
        match self.storage(entry)?.get(path) {
            Some(Some(data)) => Ok(data.clone()),
            Some(None) => Err(RobotError::rejected("NOT_FILE", path)),
            None => Err(RobotError::rejected("NOT_EXIST", path)),
        }
    }

    fn expect_play(&self, state: PlayState) -> Result<(), RobotError> {
        if self.play == state {
            Ok(())
        } else {
            Err(RobotError::rejected("OPERATION_ERROR", format!("{:?}", self.play).to_uppercase()))
        }
    }
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// 回显线程：每行回复 `> <line>`，直到对端关闭
fn echo_loop(stream: TcpStream) {
    let mut writer = match stream.try_clone() {
        Ok(writer) => writer,
        Err(_) => return,
    };
    let _ = writer.write_all(b"simulated raw console ready\r\n");

    for line in BufReader::new(stream).lines() {
        let Ok(line) = line else { break };
        if writer.write_all(format!("> {}\r\n", line).as_bytes()).is_err() {
            break;
        }
    }
}

impl Robot for SimulatedRobot {
    fn deviceinfo(&mut self) -> Result<Metadata, RobotError> {
        Ok(Metadata::from([
            ("model".to_string(), "simulator".to_string()),
            ("version".to_string(), env!("CARGO_PKG_VERSION").to_string()),
        ]))
    }

    fn kick(&mut self) -> Result<(), RobotError> {
        Ok(())
    }

    fn quit_task(&mut self) -> Result<(), RobotError> {
        Ok(())
    }

    fn position(&mut self) -> Result<String, RobotError> {
        Ok("CommandTask".to_string())
    }

    fn start_play(&mut self) -> Result<(), RobotError> {
        self.expect_play(PlayState::Idle)?;
        if self.selected.is_none() {
            return Err(RobotError::rejected("NO_TASK", "SELECT_FILE_FIRST"));
        }
        self.play = PlayState::Running;
        Ok(())
    }

    fn pause_play(&mut self) -> Result<(), RobotError> {
        self.expect_play(PlayState::Running)?;
        self.play = PlayState::Paused;
        Ok(())
    }

    fn resume_play(&mut self) -> Result<(), RobotError> {
        self.expect_play(PlayState::Paused)?;
        self.play = PlayState::Running;
        Ok(())
    }

    fn abort_play(&mut self) -> Result<(), RobotError> {
        if self.play == PlayState::Idle {
            return Err(RobotError::rejected("OPERATION_ERROR", "IDLE"));
        }
        self.play = PlayState::Idle;
        Ok(())
    }

    fn report_play(&mut self) -> Result<String, RobotError> {
        Ok(format!("{{\"st_label\": \"{:?}\"}}", self.play).to_uppercase())
    }

    fn quit_play(&mut self) -> Result<(), RobotError> {
        self.play = PlayState::Idle;
        Ok(())
    }

    fn play_info(&mut self) -> Result<PlayInfo, RobotError> {
        let (entry, path) = self
            .selected
            .clone()
            .ok_or_else(|| RobotError::rejected("NO_TASK", "NOT_SELECTED"))?;

        let mut metadata = Metadata::new();
        metadata.insert("FILE".to_string(), format!("{}/{}", entry, path));
        metadata.insert("STATE".to_string(), format!("{:?}", self.play));
        Ok(PlayInfo {
            metadata,
            previews: Vec::new(),
        })
    }

    fn begin_scan(&mut self) -> Result<(), RobotError> {
        Ok(())
    }

    fn scan_backward(&mut self) -> Result<(), RobotError> {
        Ok(())
    }

    fn scan_next(&mut self) -> Result<(), RobotError> {
        Ok(())
    }

    fn oneshot(&mut self) -> Result<Vec<Preview>, RobotError> {
        Ok(Vec::new())
    }

    fn scanimages(&mut self) -> Result<Vec<Preview>, RobotError> {
        Ok(Vec::new())
    }

    fn list_files(&mut self, entry: &str, path: &str) -> Result<Vec<ListEntry>, RobotError> {
        let dir = path.trim_end_matches('/');
        let storage = self.storage(entry)?;

        if !dir.is_empty() && !matches!(storage.get(dir), Some(None)) {
            return Err(RobotError::rejected("NOT_EXIST", path));
        }

        Ok(storage
            .iter()
            .filter(|(name, _)| parent_dir(name) == dir)
            .map(|(name, node)| {
                let base = name.rsplit('/').next().unwrap_or(name).to_string();
                match node {
                    None => ListEntry::Dir(base),
                    Some(_) => ListEntry::File(base),
                }
            })
            .collect())
    }

    fn select_file(&mut self, entry: &str, path: &str) -> Result<(), RobotError> {
        self.read_file(entry, path)?;
        self.selected = Some((entry.to_string(), path.to_string()));
        Ok(())
    }

    fn fileinfo(&mut self, entry: &str, path: &str) -> Result<FileInfo, RobotError> {
        let data = self.read_file(entry, path)?;
        let mut metadata = Metadata::new();
        metadata.insert("size".to_string(), data.len().to_string());
        metadata.insert("lines".to_string(), data.iter().filter(|b| **b == b'\n').count().to_string());
        Ok(FileInfo {
            metadata,
            previews: Vec::new(),
        })
    }

    fn mkdir(&mut self, entry: &str, path: &str) -> Result<(), RobotError> {
        let path = path.trim_end_matches('/').to_string();
        let storage = self.storage(entry)?;
        if storage.contains_key(&path) {
            return Err(RobotError::rejected("FILE_EXISTED", path));
        }
        storage.insert(path, None);
        Ok(())
    }

    fn rmdir(&mut self, entry: &str, path: &str) -> Result<(), RobotError> {
        let dir = path.trim_end_matches('/').to_string();
        let storage = self.storage(entry)?;
        if !matches!(storage.get(&dir), Some(None)) {
            return Err(RobotError::rejected("NOT_EXIST", dir));
        }
        let prefix = format!("{}/", dir);
        storage.retain(|name, _| name != &dir && !name.starts_with(&prefix));
        Ok(())
    }

    fn rmfile(&mut self, entry: &str, path: &str) -> Result<(), RobotError> {
        let storage = self.storage(entry)?;
        if matches!(storage.get(path), Some(Some(_))) {
            storage.remove(path);
            Ok(())
        } else {
            Err(RobotError::rejected("NOT_EXIST", path))
        }
    }

    fn cpfile(
        &mut self,
        source_entry: &str,
        source: &str,
        target_entry: &str,
        target: &str,
    ) -> Result<(), RobotError> {
        let data = self.read_file(source_entry, source)?;
        self.storage(target_entry)?.insert(target.to_string(), Some(data));
        Ok(())
    }

    fn md5(&mut self, entry: &str, path: &str) -> Result<String, RobotError> {
        // 模拟设备不实现真正的摘要，返回内容长度和简单校验和
        let data = self.read_file(entry, path)?;
        let checksum = data.iter().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(*b as u32));
        Ok(format!("{:08x}{:08x}", data.len(), checksum))
    }

    fn download_file(
        &mut self,
        entry: &str,
        path: &str,
        writer: &mut dyn Write,
        progress: ProgressCallback<'_>,
    ) -> Result<(), RobotError> {
        let data = self.read_file(entry, path)?;
        let size = data.len() as u64;
        let mut left = size;

        for chunk in data.chunks(CHUNK_SIZE) {
            writer.write_all(chunk)?;
            left -= chunk.len() as u64;
            progress(left, size);
        }
        writer.flush()?;
        Ok(())
    }

    fn upload_file(
        &mut self,
        source: &Path,
        target: &UploadTarget,
        progress: ProgressCallback<'_>,
    ) -> Result<(), RobotError> {
        let data = std::fs::read(source)?;
        let total = data.len() as u64;

        let mut done = 0u64;
        for chunk in data.chunks(CHUNK_SIZE) {
            done += chunk.len() as u64;
            progress(done, total);
        }

        match target {
            UploadTarget::Storage(path) if path == "#" => {
                let name = source
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload.gcode".to_string());
                self.storage("SD")?.insert(name.clone(), Some(data));
                self.selected = Some(("SD".to_string(), name));
            },
            UploadTarget::Storage(path) => {
                let (entry, path) = path.split_once('/').unwrap_or(("SD", path.as_str()));
                self.storage(entry)?.insert(path.to_string(), Some(data));
            },
            UploadTarget::Firmware | UploadTarget::MainboardFirmware => {
                debug!("Simulated firmware update: {:?}, {} bytes", target, total);
            },
        }
        Ok(())
    }

    fn raw_mode(&mut self) -> Result<RawSocket, RobotError> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let client = TcpStream::connect(listener.local_addr()?)?;
        let (server, _) = listener.accept()?;

        let shutdown_handle = server.try_clone()?;
        let echo = thread::Builder::new()
            .name("sim-raw-echo".to_string())
            .spawn(move || echo_loop(server))?;

        self.raw = Some((shutdown_handle, echo));
        Ok(RawSocket::tcp(client)?)
    }

    fn quit_raw_mode(&mut self) -> Result<String, RobotError> {
        if let Some((stream, echo)) = self.raw.take() {
            let _ = stream.shutdown(Shutdown::Both);
            if echo.join().is_err() {
                return Err(RobotError::Connection("raw echo thread panicked".to_string()));
            }
        }
        Ok("<- raw mode".to_string())
    }

    fn config_set(&mut self, key: &str, value: &str) -> Result<(), RobotError> {
        self.settings.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn config_get(&mut self, key: &str) -> Result<Option<String>, RobotError> {
        Ok(self.settings.get(key).cloned())
    }

    fn config_del(&mut self, key: &str) -> Result<(), RobotError> {
        self.settings.remove(key);
        Ok(())
    }

    fn begin_maintain(&mut self) -> Result<(), RobotError> {
        Ok(())
    }

    fn maintain_home(&mut self) -> Result<(), RobotError> {
        Ok(())
    }

    fn maintain_reset_mb(&mut self) -> Result<(), RobotError> {
        Ok(())
    }

    fn maintain_headinfo(&mut self) -> Result<Metadata, RobotError> {
        Ok(Metadata::from([
            ("module".to_string(), "EXTRUDER".to_string()),
            ("temperature".to_string(), "25.0".to_string()),
        ]))
    }

    fn maintain_eadj(&mut self, clean: bool, navigate: NavigateCallback<'_>) -> Result<Vec<f64>, RobotError> {
        if clean {
            navigate("CLEAN");
        }
        for point in ["POINT_1", "POINT_2", "POINT_3"] {
            navigate(point);
        }
        Ok(vec![-0.0125, 0.0250, 0.0100])
    }

    fn maintain_hadj(
        &mut self,
        manual_h: Option<f64>,
        navigate: NavigateCallback<'_>,
    ) -> Result<f64, RobotError> {
        match manual_h {
            Some(h) => Ok(h),
            None => {
                navigate("MEASURING");
                Ok(242.0)
            },
        }
    }

    fn maintain_load_filament(
        &mut self,
        index: u8,
        temperature: f64,
        navigate: NavigateCallback<'_>,
    ) -> Result<(), RobotError> {
        navigate(&format!("HEATING {} -> {:.1}", index, temperature));
        navigate("LOADING");
        Ok(())
    }

    fn maintain_unload_filament(
        &mut self,
        index: u8,
        temperature: f64,
        navigate: NavigateCallback<'_>,
    ) -> Result<(), RobotError> {
        navigate(&format!("HEATING {} -> {:.1}", index, temperature));
        navigate("UNLOADING");
        Ok(())
    }

    fn maintain_stop_load_filament(&mut self) -> Result<(), RobotError> {
        Ok(())
    }

    fn maintain_extruder_temp(&mut self, _index: u8, _temperature: f64) -> Result<(), RobotError> {
        Ok(())
    }

    fn maintain_update_hbfw(
        &mut self,
        mimetype: &str,
        reader: &mut dyn Read,
        size: u64,
        navigate: NavigateCallback<'_>,
    ) -> Result<(), RobotError> {
        let mut buf = [0u8; CHUNK_SIZE];
        let mut sent = 0u64;
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            sent += n as u64;
            navigate(&format!("UPLOADING {} {}/{}", mimetype, sent, size));
        }
        navigate("WRITING");
        Ok(())
    }
}

impl Drop for SimulatedRobot {
    fn drop(&mut self) {
        if let Some((stream, echo)) = self.raw.take() {
            let _ = stream.shutdown(Shutdown::Both);
            let _ = echo.join();
        }
    }
}
