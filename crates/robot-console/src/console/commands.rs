//! 命令表定义

use super::{CommandFn, Console, SimpleFn};
use crate::args::expect_args;
use crate::error::ConsoleError;
use crate::robot::{Reply, Robot};
use crate::table::{CommandNode, CommandTable};

fn simple<R: Robot>(handler: SimpleFn<R>) -> CommandNode<SimpleFn<R>> {
    CommandNode::Handler(handler)
}

fn command<R: Robot>(handler: CommandFn<R>) -> CommandNode<CommandFn<R>> {
    CommandNode::Handler(handler)
}

/// 无参数的设备调用
fn no_args<T: Reply>(
    name: &str,
    args: &[String],
    call: impl FnOnce() -> Result<T, crate::error::RobotError>,
) -> Result<Option<String>, ConsoleError> {
    expect_args(name, args, 0..=0)?;
    Ok(call()?.into_reply())
}

/// 简单命令表：返回值统一输出
pub(super) fn simple_table<R: Robot>() -> CommandTable<SimpleFn<R>> {
    vec![
        ("deviceinfo", simple::<R>(|r, a| no_args("deviceinfo", a, || r.deviceinfo()))),
        ("start", simple::<R>(|r, a| no_args("start", a, || r.start_play()))),
        ("pause", simple::<R>(|r, a| no_args("pause", a, || r.pause_play()))),
        ("resume", simple::<R>(|r, a| no_args("resume", a, || r.resume_play()))),
        ("abort", simple::<R>(|r, a| no_args("abort", a, || r.abort_play()))),
        ("report", simple::<R>(|r, a| no_args("report", a, || r.report_play()))),
        ("position", simple::<R>(|r, a| no_args("position", a, || r.position()))),
        ("quit", simple::<R>(|r, a| no_args("quit", a, || r.quit_task()))),
        ("kick", simple::<R>(|r, a| no_args("kick", a, || r.kick()))),
        ("scan", simple::<R>(|r, a| no_args("scan", a, || r.begin_scan()))),
        ("scan_backward", simple::<R>(|r, a| no_args("scan_backward", a, || r.scan_backward()))),
        ("scan_next", simple::<R>(|r, a| no_args("scan_next", a, || r.scan_next()))),
        ("maintain", simple::<R>(|r, a| no_args("maintain", a, || r.begin_maintain()))),
        ("home", simple::<R>(|r, a| no_args("home", a, || r.maintain_home()))),
        ("reset_mb", simple::<R>(|r, a| no_args("reset_mb", a, || r.maintain_reset_mb()))),
        ("headinfo", simple::<R>(|r, a| no_args("headinfo", a, || r.maintain_headinfo()))),
        (
            "play",
            CommandNode::Group(vec![(
                "quit",
                simple::<R>(|r, a| no_args("play quit", a, || r.quit_play())),
            )]),
        ),
    ]
}

/// 扩展命令表：处理函数自行解析参数并输出
pub(super) fn extended_table<R: Robot>() -> CommandTable<CommandFn<R>> {
    vec![
        ("ls", command::<R>(Console::list_file)),
        ("fileinfo", command::<R>(Console::fileinfo)),
        ("mkdir", command::<R>(Console::mkdir)),
        ("rmdir", command::<R>(Console::rmdir)),
        ("rmfile", command::<R>(Console::rmfile)),
        ("cp", command::<R>(Console::cpfile)),
        ("download", command::<R>(Console::download_file)),
        ("upload", command::<R>(Console::upload_file)),
        ("md5", command::<R>(Console::md5)),
        ("select", command::<R>(Console::select_file)),
        ("update_fw", command::<R>(Console::update_fw)),
        ("update_mbfw", command::<R>(Console::update_mbfw)),
        ("oneshot", command::<R>(Console::oneshot)),
        ("scanimages", command::<R>(Console::scanimages)),
        ("raw", command::<R>(Console::raw_mode)),
        (
            "config",
            CommandNode::Group(vec![
                ("set", command::<R>(Console::config_set)),
                ("get", command::<R>(Console::config_get)),
                ("del", command::<R>(Console::config_del)),
            ]),
        ),
        ("eadj", command::<R>(Console::maintain_eadj)),
        ("cor_h", command::<R>(Console::maintain_hadj)),
        ("load_filament", command::<R>(Console::maintain_load_filament)),
        ("stop_load_filament", command::<R>(Console::maintain_stop_load_filament)),
        ("unload_filament", command::<R>(Console::maintain_unload_filament)),
        ("extruder_temp", command::<R>(Console::maintain_extruder_temp)),
        ("update_hbfw", command::<R>(Console::maintain_update_hbfw)),
        ("play", CommandNode::Group(vec![("info", command::<R>(Console::play_info))])),
    ]
}

