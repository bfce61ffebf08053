//! 设备键值配置：config set / get / del

use super::Console;
use crate::args::expect_args;
use crate::error::ConsoleError;
use crate::robot::Robot;
use tracing::info;

impl<R: Robot> Console<R> {
    pub(super) fn config_set(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let args = expect_args("config set", args, 2..=2)?;
        self.robot.config_set(&args[0], &args[1])?;
        info!("ok");
        Ok(())
    }

    /// 空值视为未设置
    pub(super) fn config_get(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let key = &expect_args("config get", args, 1..=1)?[0];

        match self.robot.config_get(key)? {
            Some(value) if !value.is_empty() => info!("{}={}", key, value),
            _ => info!("{} not set", key),
        }
        info!("ok");
        Ok(())
    }

    pub(super) fn config_del(&mut self, args: &[String]) -> Result<(), ConsoleError> {
        let key = &expect_args("config del", args, 1..=1)?[0];
        self.robot.config_del(key)?;
        info!("ok");
        Ok(())
    }
}
