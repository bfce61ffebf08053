//! 预览图输出
//!
//! 把设备返回的图片写入临时文件并交给外部查看器打开。

use crate::robot::Preview;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// 常见图片扩展名优先于 mime 表中的别名（如 `jfif`）
const PREFERRED_EXTENSIONS: &[&str] = &["jpg", "png", "gif", "bmp", "webp", "tiff", "svg"];

/// 打开预览文件
pub trait PreviewOpener {
    fn open(&self, paths: &[PathBuf]) -> std::io::Result<()>;
}

/// 系统查看器
///
/// 配置了 `command` 时启动该命令并传入所有路径，否则逐个交给平台默认程序。
#[derive(Debug, Clone, Default)]
pub struct SystemViewer {
    pub command: Option<String>,
}

impl SystemViewer {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

impl PreviewOpener for SystemViewer {
    fn open(&self, paths: &[PathBuf]) -> std::io::Result<()> {
        match &self.command {
            Some(command) => {
                Command::new(command).args(paths).spawn()?;
            },
            None => {
                for path in paths {
                    open::that_detached(path)?;
                }
            },
        }
        Ok(())
    }
}

/// 根据 mime 类型推断扩展名（不含点）
pub fn preview_extension(mime: &str) -> Option<&'static str> {
    let extensions = mime_guess::get_mime_extensions_str(mime)?;
    extensions
        .iter()
        .find(|ext| PREFERRED_EXTENSIONS.contains(*ext))
        .or_else(|| extensions.first())
        .copied()
}

/// 写入临时文件，返回文件路径
///
/// 无法推断扩展名的图片被跳过。文件不会自动删除，查看器需要在命令返回后读取。
pub fn write_previews(previews: &[Preview]) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(previews.len());

    for preview in previews {
        let Some(ext) = preview_extension(&preview.mime) else {
            debug!("Skip preview with unknown mime type {:?}", preview.mime);
            continue;
        };

        let mut file = tempfile::Builder::new()
            .prefix("robot-console-")
            .suffix(&format!(".{}", ext))
            .tempfile()?;
        file.write_all(&preview.data)?;
        let (_, path) = file.keep().map_err(|e| e.error)?;
        paths.push(path);
    }

    Ok(paths)
}

/// 写入并打开预览，没有可写的图片时不启动查看器
pub fn show_previews(opener: &dyn PreviewOpener, previews: &[Preview]) -> std::io::Result<Vec<PathBuf>> {
    let paths = write_previews(previews)?;
    if !paths.is_empty() {
        opener.open(&paths)?;
    }
    Ok(paths)
}
