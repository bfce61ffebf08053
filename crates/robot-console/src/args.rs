//! 参数解析工具
//!
//! 分词、参数数量检查、存储路径拆分、数值解析。

use crate::error::{BAD_ENTRY, ConsoleError, DomainError, SD_ONLY};
use std::ops::RangeInclusive;
use std::str::FromStr;

/// 按 shell 规则分词（支持单双引号和反斜杠转义）
pub fn tokenize(line: &str) -> Result<Vec<String>, ConsoleError> {
    shlex::split(line).ok_or_else(|| ConsoleError::Tokenize(line.to_string()))
}

/// 检查参数数量
pub fn expect_args<'a>(
    command: &str,
    args: &'a [String],
    count: RangeInclusive<usize>,
) -> Result<&'a [String], ConsoleError> {
    if count.contains(&args.len()) {
        return Ok(args);
    }

    let expected = if count.start() == count.end() {
        format!("{}", count.start())
    } else {
        format!("{} to {}", count.start(), count.end())
    };

    Err(ConsoleError::arguments(
        command,
        format!("expected {} argument(s), got {}", expected, args.len()),
    ))
}

/// 按第一个 `/` 拆分为 (entry, path)
///
/// `SD/a/b.gcode` -> (`SD`, `a/b.gcode`)
pub fn split_entry<'a>(command: &str, path: &'a str) -> Result<(&'a str, &'a str), ConsoleError> {
    path.split_once('/')
        .ok_or_else(|| ConsoleError::arguments(command, format!("`{}` is not ENTRY/PATH", path)))
}

/// 要求路径位于 SD 入口，返回去掉前缀后的路径
pub fn require_sd(path: &str) -> Result<&str, DomainError> {
    path.strip_prefix("SD/")
        .ok_or(DomainError::NotSupported(SD_ONLY))
}

/// 拷贝源路径：支持 SD 和 USB
pub fn source_entry(path: &str) -> Result<(&'static str, &str), DomainError> {
    if let Some(rest) = path.strip_prefix("SD/") {
        Ok(("SD", rest))
    } else if let Some(rest) = path.strip_prefix("USB/") {
        Ok(("USB", rest))
    } else {
        Err(DomainError::NotSupported(BAD_ENTRY))
    }
}

/// 拼接列目录输出路径（`SD/` + `a` = `SD/a`，`SD` + `a` = `SD/a`）
pub fn join_path(base: &str, node: &str) -> String {
    if base.is_empty() || base.ends_with('/') {
        format!("{}{}", base, node)
    } else {
        format!("{}/{}", base, node)
    }
}

/// 解析数值参数
pub fn parse_number<T: FromStr>(command: &str, name: &str, value: &str) -> Result<T, ConsoleError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConsoleError::arguments(command, format!("invalid {}: {:?}", name, value)))
}
