//! REPL 模式（交互式 Shell）
//!
//! 专用输入线程持有 rustyline Editor（保留历史记录）。
//! 主线程每次按当前模式发送提示符，输入线程读取一行后回传事件。
//! raw 模式下设备输出由 relay 线程直接写入日志。

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, bounded};
use robot_console::{Console, ConsoleConfig, ConsoleError, ConsoleMode, SimulatedRobot};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{error, warn};

/// 输入事件
#[derive(Debug, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    /// Ctrl+C：取消当前行
    Interrupted,
    /// Ctrl+D 或输入结束
    Eof,
}

/// REPL 输入（专用输入线程）
pub struct ReplInput {
    prompt_tx: Option<Sender<String>>,
    event_rx: Receiver<InputEvent>,
    input_thread: Option<thread::JoinHandle<()>>,
}

impl ReplInput {
    /// 创建输入线程，`history` 为历史记录文件
    pub fn spawn(history: Option<PathBuf>) -> Result<Self> {
        let (prompt_tx, prompt_rx) = bounded::<String>(1);
        let (event_tx, event_rx) = bounded::<InputEvent>(1);

        let input_thread = thread::Builder::new()
            .name("repl-input".to_string())
            .spawn(move || input_loop(prompt_rx, event_tx, history))
            .context("Failed to spawn input thread")?;

        Ok(Self {
            prompt_tx: Some(prompt_tx),
            event_rx,
            input_thread: Some(input_thread),
        })
    }

    /// 显示提示符并阻塞等待一行输入
    pub fn read_line(&self, prompt: &str) -> InputEvent {
        let Some(prompt_tx) = &self.prompt_tx else {
            return InputEvent::Eof;
        };
        if prompt_tx.send(prompt.to_string()).is_err() {
            return InputEvent::Eof;
        }
        self.event_rx.recv().unwrap_or(InputEvent::Eof)
    }
}

impl Drop for ReplInput {
    fn drop(&mut self) {
        // 关闭提示符通道，输入线程保存历史后退出
        self.prompt_tx.take();
        if let Some(handle) = self.input_thread.take() {
            let _ = handle.join();
        }
    }
}

/// 输入线程主循环：Editor 在线程内创建，生命周期 = REPL 会话
fn input_loop(prompt_rx: Receiver<String>, event_tx: Sender<InputEvent>, history: Option<PathBuf>) {
    let mut rl = match Editor::<(), DefaultHistory>::new() {
        Ok(rl) => rl,
        Err(e) => {
            error!("Failed to initialize readline: {}", e);
            let _ = event_tx.send(InputEvent::Eof);
            return;
        },
    };

    if let Some(path) = &history {
        rl.load_history(path).ok(); // 首次运行时文件不存在
    }

    while let Ok(prompt) = prompt_rx.recv() {
        let event = match rl.readline(&prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                InputEvent::Line(line)
            },
            Err(ReadlineError::Interrupted) => InputEvent::Interrupted,
            Err(ReadlineError::Eof) => InputEvent::Eof,
            Err(err) => {
                error!("Readline error: {}", err);
                InputEvent::Eof
            },
        };

        let eof = event == InputEvent::Eof;
        if event_tx.send(event).is_err() || eof {
            break;
        }
    }

    if let Some(path) = &history
        && let Err(e) = rl.save_history(path)
    {
        warn!("Failed to save history to {}: {}", path.display(), e);
    }
}

/// Shell 对一行输入的处理方式
#[derive(Debug, PartialEq, Eq)]
enum ShellAction {
    Exit,
    Help,
    Console,
}

/// `exit` / `help` 只在标准模式下由 Shell 处理，raw 模式下一律交给控制台发送到设备
fn shell_action(line: &str, mode: ConsoleMode) -> ShellAction {
    if mode.is_raw() {
        return ShellAction::Console;
    }
    match line.trim() {
        "exit" => ShellAction::Exit,
        "help" => ShellAction::Help,
        _ => ShellAction::Console,
    }
}

/// 展开 `~/` 前缀
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// 运行 REPL 模式
pub fn run_repl(config: &ConsoleConfig) -> Result<()> {
    let mut console = Console::with_config(SimulatedRobot::new(), config);
    let mode = console.mode_handle();
    let input = ReplInput::spawn(config.shell.history_file.as_deref().map(expand_home))?;

    println!("Robot Console v{} - 交互式 Shell（模拟设备）", env!("CARGO_PKG_VERSION"));
    println!("输入 'help' 查看帮助，'exit' 退出");
    println!();

    loop {
        let prompt = if mode.get().is_raw() {
            &config.shell.raw_prompt
        } else {
            &config.shell.prompt
        };

        match input.read_line(prompt) {
            InputEvent::Line(line) => match shell_action(&line, mode.get()) {
                ShellAction::Exit => break,
                ShellAction::Help => print_help(&console),
                ShellAction::Console => {
                    if let Err(err) = console.on_cmd(&line) {
                        error!("{}", err);
                        print_help_hint(&err);
                    }
                },
            },

            // Ctrl+C：放弃当前行
            InputEvent::Interrupted => println!("^C"),

            InputEvent::Eof => break,
        }
    }

    // raw 模式下先完整退出
    console.close().context("Failed to leave raw mode")?;
    drop(input);
    println!("👋 再见！");
    Ok(())
}

/// 打印帮助信息
fn print_help(console: &Console<SimulatedRobot>) {
    println!("可用命令:");
    for path in console.command_paths() {
        println!("  {}", path);
    }
    println!();
    println!("Shell:");
    println!("  help                          显示帮助");
    println!("  exit                          退出（仅标准模式）");
    println!();
    println!("raw 模式:");
    println!("  quit                          退出 raw 模式");
    println!("  其他输入（包括 exit/help）    原样发送到设备");
    println!();
    println!("快捷键:");
    println!("  Ctrl+C                        取消当前输入");
    println!("  Ctrl+D                        退出（raw 模式下先退出 raw 模式）");
    println!();
}

/// 提供基于错误的帮助提示
fn print_help_hint(err: &ConsoleError) {
    match err {
        ConsoleError::Arguments { .. } => eprintln!("💡 提示: 参数数量或格式不正确"),
        ConsoleError::Tokenize(_) => eprintln!("💡 提示: 检查引号是否成对"),
        ConsoleError::Raw(_) => eprintln!("💡 提示: raw 连接已断开，按回车继续"),
        _ => eprintln!("💡 提示: 输入 'help' 查看所有命令"),
    }
}
