//! 维护命令：校正、耗材、温度、工具头固件
//!
//! 长时间操作通过导航回调上报中间状态，回调只负责输出日志。

use super::Console;
use crate::args::{expect_args, parse_number};
use crate::error::ConsoleError;
use crate::robot::Robot;
use std::fs::File;
use std::io::BufReader;
use tracing::info;

/// 格式化测量数据并计算极差（max - min），空数据极差为 0
pub(super) fn format_measurements(data: &[f64]) -> (String, f64) {
    let text = data
        .iter()
        .map(|v| format!("{:.4}", v))
        .collect::<Vec<_>>()
        .join(", ");

    let spread = if data.is_empty() {
        0.0
    } else {
        let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = data.iter().copied().fold(f64::INFINITY, f64::min);
        max - min
    };

    (text, spread)
}

impl<R: Robot> Console<R> {
    /// `eadj [clean]`
    pub(super) fn maintain_eadj(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let args = expect_args("eadj", args, 0..=1)?;
        let clean = args.first().is_some_and(|a| a == "clean");

        let mut navigate = |nav: &str| info!("Mainboard info: {}", nav);
        let data = self.robot.maintain_eadj(clean, &mut navigate)?;

        let (text, spread) = format_measurements(&data);
        info!("Data: {}, Error: {:.4}", text, spread);
        info!("ok");
        Ok(())
    }

    /// `cor_h [H]`：不带参数时自动测量
    pub(super) fn maintain_hadj(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let args = expect_args("cor_h", args, 0..=1)?;
        let manual_h = match args.first() {
            Some(h) => Some(parse_number::<f64>("cor_h", "height", h)?),
            None => None,
        };

        let mut navigate = |nav: &str| info!("Mainboard info: {}", nav);
        let data = self.robot.maintain_hadj(manual_h, &mut navigate)?;

        info!("Data: {:.4}", data);
        info!("ok");
        Ok(())
    }

    /// `load_filament INDEX TEMP`
    pub(super) fn maintain_load_filament(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let args = expect_args("load_filament", args, 2..=2)?;
        let index = parse_number::<u8>("load_filament", "index", &args[0])?;
        let temperature = parse_number::<f64>("load_filament", "temperature", &args[1])?;

        let mut navigate = |nav: &str| info!("NAV: {}", nav);
        self.robot.maintain_load_filament(index, temperature, &mut navigate)?;
        info!("ok");
        Ok(())
    }

    pub(super) fn maintain_stop_load_filament(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        expect_args("stop_load_filament", args, 0..=0)?;
        self.robot.maintain_stop_load_filament()?;
        Ok(())
    }

    /// `unload_filament INDEX TEMP`
    pub(super) fn maintain_unload_filament(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let args = expect_args("unload_filament", args, 2..=2)?;
        let index = parse_number::<u8>("unload_filament", "index", &args[0])?;
        let temperature = parse_number::<f64>("unload_filament", "temperature", &args[1])?;

        let mut navigate = |nav: &str| info!("NAV: {}", nav);
        self.robot.maintain_unload_filament(index, temperature, &mut navigate)?;
        info!("ok");
        Ok(())
    }

    /// `extruder_temp INDEX TEMP`
    pub(super) fn maintain_extruder_temp(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let args = expect_args("extruder_temp", args, 2..=2)?;
        let index = parse_number::<u8>("extruder_temp", "index", &args[0])?;
        let temperature = parse_number::<f64>("extruder_temp", "temperature", &args[1])?;

        self.robot.maintain_extruder_temp(index, temperature)?;
        info!("ok");
        Ok(())
    }

    /// `update_hbfw FILE`：mime 类型无法识别时使用 `binary`
    pub(super) fn maintain_update_hbfw(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let filename = &expect_args("update_hbfw", args, 1..=1)?[0];
        let mimetype = mime_guess::from_path(filename).first_raw().unwrap_or("binary");

        let file = File::open(filename)?;
        let size = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let mut navigate = |nav: &str| info!("--> {}", nav);
        self.robot
            .maintain_update_hbfw(mimetype, &mut reader, size, &mut navigate)?;
        info!("ok");
        Ok(())
    }
}
