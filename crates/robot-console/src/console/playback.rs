//! 打印任务、相机与固件命令

use super::Console;
use super::storage::log_progress;
use crate::args::expect_args;
use crate::error::ConsoleError;
use crate::preview::show_previews;
use crate::robot::{Robot, UploadTarget};
use std::path::Path;
use tracing::info;

impl<R: Robot> Console<R> {
    /// `play info`：输出元数据并打开预览
    pub(super) fn play_info(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        expect_args("play info", args, 0..=0)?;

        let info = self.robot.play_info()?;
        info!("Metadata:");
        for (key, value) in &info.metadata {
            info!("  {}={}", key, value);
        }
        show_previews(self.viewer(), &info.previews)?;
        Ok(())
    }

    /// `oneshot`：单次拍照（可选参数被忽略）
    pub(super) fn oneshot(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        expect_args("oneshot", args, 0..=1)?;

        let images = self.robot.oneshot()?;
        show_previews(self.viewer(), &images)?;
        Ok(())
    }

    /// `scanimages`：扫描图像（可选参数被忽略）
    pub(super) fn scanimages(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        expect_args("scanimages", args, 0..=1)?;

        let images = self.robot.scanimages()?;
        show_previews(self.viewer(), &images)?;
        Ok(())
    }

    pub(super) fn update_fw(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let filename = &expect_args("update_fw", args, 1..=1)?[0];
        self.robot
            .upload_file(Path::new(filename.trim_end()), &UploadTarget::Firmware, &mut log_progress)?;
        Ok(())
    }

    pub(super) fn update_mbfw(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let filename = &expect_args("update_mbfw", args, 1..=1)?[0];
        self.robot.upload_file(
            Path::new(filename.trim_end()),
            &UploadTarget::MainboardFirmware,
            &mut log_progress,
        )?;
        Ok(())
    }
}
