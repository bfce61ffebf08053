//! 运行模式
//!
//! 目前只有 REPL 模式：交互式 Shell

pub mod repl;
