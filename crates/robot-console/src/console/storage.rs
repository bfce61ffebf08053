//! 文件系统命令：ls / fileinfo / mkdir / rmdir / rmfile / cp / download / upload / md5 / select

use super::Console;
use crate::args::{expect_args, join_path, require_sd, source_entry, split_entry};
use crate::error::{ConsoleError, DomainError, SD_ONLY};
use crate::preview::show_previews;
use crate::robot::{ListEntry, Robot, UploadTarget};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, info};

/// 进度百分比，总数为 0 视为完成
pub(super) fn percent(done: u64, total: u64) -> f64 {
    if total == 0 {
        100.0
    } else {
        done as f64 / total as f64 * 100.0
    }
}

/// 上传进度输出
pub(super) fn log_progress(progress: u64, total: u64) {
    info!(
        "Processing {:3.1} % ({} of {})",
        percent(progress, total),
        progress,
        total
    );
}

impl<R: Robot> Console<R> {
    pub(super) fn list_file(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let path = &expect_args("ls", args, 1..=1)?[0];
        let (entry, dir) = path.split_once('/').unwrap_or((path.as_str(), ""));

        for node in self.robot.list_files(entry, dir)? {
            match node {
                ListEntry::Dir(name) => info!("DIR {}", join_path(path, &name)),
                ListEntry::File(name) => info!("FILE {}", join_path(path, &name)),
            }
        }
        info!("ls done.");
        Ok(())
    }

    pub(super) fn select_file(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let path = &expect_args("select", args, 1..=1)?[0];
        let (entry, filename) = split_entry("select", path)?;
        self.robot.select_file(entry, filename)?;
        Self::simple_cmd(None);
        Ok(())
    }

    pub(super) fn fileinfo(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let path = &expect_args("fileinfo", args, 1..=1)?[0];
        let (entry, filename) = split_entry("fileinfo", path)?;

        let info = self.robot.fileinfo(entry, filename)?;
        info!("{:?}", info.metadata);
        show_previews(self.viewer(), &info.previews)?;
        Ok(())
    }

    pub(super) fn mkdir(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let path = require_sd(&expect_args("mkdir", args, 1..=1)?[0])?;
        self.robot.mkdir("SD", path)?;
        Self::simple_cmd(None);
        Ok(())
    }

    pub(super) fn rmdir(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let path = require_sd(&expect_args("rmdir", args, 1..=1)?[0])?;
        self.robot.rmdir("SD", path)?;
        Self::simple_cmd(None);
        Ok(())
    }

    pub(super) fn rmfile(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let path = require_sd(&expect_args("rmfile", args, 1..=1)?[0])?;
        self.robot.rmfile("SD", path)?;
        Self::simple_cmd(None);
        Ok(())
    }

    /// `cp SRC DST`：源可以是 SD 或 USB，目标只能是 SD
    pub(super) fn cpfile(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let args = expect_args("cp", args, 2..=2)?;
        let (source_entry, source) = source_entry(&args[0])?;
        let target = args[1]
            .strip_prefix("SD/")
            .ok_or(DomainError::NotSupported(SD_ONLY))?;

        self.robot.cpfile(source_entry, source, "SD", target)?;
        Self::simple_cmd(None);
        Ok(())
    }

    /// `download ENTRY/PATH LOCAL`
    pub(super) fn download_file(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let args = expect_args("download", args, 2..=2)?;
        let (entry, path) = split_entry("download", &args[0])?;

        let mut writer = BufWriter::new(File::create(&args[1])?);
        let mut progress = |left: u64, size: u64| {
            let done = size.saturating_sub(left);
            info!("Download {} / {} ({:.1} %)", done, size, percent(done, size));
        };

        if let Err(e) = self.robot.download_file(entry, path, &mut writer, &mut progress) {
            drop(writer);
            // 下载失败时不留下空文件或半截文件
            if let Err(remove) = std::fs::remove_file(&args[1]) {
                debug!("Remove {} failed: {}", args[1], remove);
            }
            return Err(e.into());
        }
        writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        Ok(())
    }

    /// `upload LOCAL [TARGET]`，目标默认为 `#`
    pub(super) fn upload_file(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let args = expect_args("upload", args, 1..=2)?;
        let target = match args.get(1) {
            Some(target) => UploadTarget::Storage(target.clone()),
            None => UploadTarget::default(),
        };

        self.robot
            .upload_file(Path::new(&args[0]), &target, &mut log_progress)?;
        Ok(())
    }

    pub(super) fn md5(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let filename = &expect_args("md5", args, 1..=1)?[0];
        let (entry, path) = split_entry("md5", filename)?;

        let digest = self.robot.md5(entry, path)?;
        info!("MD5 {} {}", filename, digest);
        Ok(())
    }
}
