//! 命令分发测试：简单命令、扩展命令、未知命令、错误处理

mod common;

use common::{MockRobot, RecordingViewer, messages, with_logs};
use robot_console::{Console, ConsoleError, ConsoleMode, Preview};

fn console(robot: MockRobot) -> Console<MockRobot> {
    Console::new(robot).with_viewer(RecordingViewer::default())
}

#[test]
fn test_simple_command_logs_ok() {
    let robot = MockRobot::new();
    let calls = robot.calls_handle();
    let mut console = console(robot);

    let (result, logs) = with_logs(|| console.on_cmd("start"));
    result.unwrap();

    assert_eq!(*calls.lock().unwrap(), vec!["start_play"]);
    assert_eq!(messages(&logs.lines(), "INFO"), vec!["ok"]);
}

#[test]
fn test_simple_command_logs_reply() {
    let mut robot = MockRobot::new();
    robot.position = "X 10.0 Y 20.0 Z 5.0".to_string();
    let mut console = console(robot);

    let (result, logs) = with_logs(|| console.on_cmd("position"));
    result.unwrap();

    assert_eq!(messages(&logs.lines(), "INFO"), vec!["X 10.0 Y 20.0 Z 5.0"]);
}

#[test]
fn test_deviceinfo_joins_metadata() {
    let mut robot = MockRobot::new();
    robot.metadata.insert("model".to_string(), "delta-1".to_string());
    robot.metadata.insert("version".to_string(), "1.0.2".to_string());
    let mut console = console(robot);

    let (result, logs) = with_logs(|| console.on_cmd("deviceinfo"));
    result.unwrap();

    assert_eq!(
        messages(&logs.lines(), "INFO"),
        vec!["model=delta-1, version=1.0.2"]
    );
}

#[test]
fn test_play_quit_is_simple_and_play_info_falls_through() {
    let mut robot = MockRobot::new();
    robot.metadata.insert("TIME_COST".to_string(), "3600".to_string());
    let calls = robot.calls_handle();
    let mut console = console(robot);

    let (result, logs) = with_logs(|| {
        console.on_cmd("play quit")?;
        console.on_cmd("play info")
    });
    result.unwrap();

    assert_eq!(*calls.lock().unwrap(), vec!["quit_play", "play_info"]);
    assert_eq!(
        messages(&logs.lines(), "INFO"),
        vec!["ok", "Metadata:", "  TIME_COST=3600"]
    );
}

#[test]
fn test_unknown_command_logs_single_error() {
    let robot = MockRobot::new();
    let calls = robot.calls_handle();
    let mut console = console(robot);

    let (result, logs) = with_logs(|| console.on_cmd("foo bar"));
    result.unwrap();

    assert!(calls.lock().unwrap().is_empty());
    let lines = logs.lines();
    assert_eq!(messages(&lines, "ERROR"), vec!["Unknown command: foo bar"]);
    assert!(messages(&lines, "INFO").is_empty());
}

#[test]
fn test_unknown_subcommand() {
    let mut console = console(MockRobot::new());

    let (result, logs) = with_logs(|| console.on_cmd("play stop"));
    result.unwrap();

    assert_eq!(
        messages(&logs.lines(), "ERROR"),
        vec!["Unknown command: play stop"]
    );
}

#[test]
fn test_empty_line_is_ignored() {
    let robot = MockRobot::new();
    let calls = robot.calls_handle();
    let mut console = console(robot);

    let (result, logs) = with_logs(|| {
        console.on_cmd("")?;
        console.on_cmd("   ")
    });
    result.unwrap();

    assert!(calls.lock().unwrap().is_empty());
    assert!(logs.lines().is_empty());
}

#[test]
fn test_rejection_is_logged_as_runtime_error() {
    let robot = MockRobot::new().reject("start_play", "BAD_PARAMS", "NO_FILE_SELECTED");
    let mut console = console(robot);

    let (result, logs) = with_logs(|| console.on_cmd("start"));
    result.unwrap();

    let lines = logs.lines();
    assert_eq!(
        messages(&lines, "ERROR"),
        vec!["RuntimeError(BAD_PARAMS, NO_FILE_SELECTED)"]
    );
    assert!(messages(&lines, "INFO").is_empty());
}

#[test]
fn test_argument_count_error_propagates() {
    let robot = MockRobot::new();
    let calls = robot.calls_handle();
    let mut console = console(robot);

    let err = console.on_cmd("start now").unwrap_err();
    assert!(matches!(err, ConsoleError::Arguments { .. }));

    let err = console.on_cmd("cp SD/a").unwrap_err();
    assert!(matches!(err, ConsoleError::Arguments { .. }));

    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn test_unbalanced_quote_propagates() {
    let mut console = console(MockRobot::new());

    let err = console.on_cmd(r#"ls "SD/"#).unwrap_err();
    assert!(matches!(err, ConsoleError::Tokenize(_)));
}

#[test]
fn test_quoted_arguments() {
    let robot = MockRobot::new();
    let calls = robot.calls_handle();
    let mut console = console(robot);

    console.on_cmd(r#"select "SD/my part.gcode""#).unwrap();

    assert_eq!(*calls.lock().unwrap(), vec!["select_file SD my part.gcode"]);
}

#[test]
fn test_config_get_set_del() {
    let robot = MockRobot::new();
    let calls = robot.calls_handle();
    let mut console = console(robot);

    let (result, logs) = with_logs(|| {
        console.on_cmd("config get missing_key")?;
        console.on_cmd("config set nozzle_temp 210")?;
        console.on_cmd("config get nozzle_temp")?;
        console.on_cmd("config del nozzle_temp")
    });
    result.unwrap();

    assert_eq!(
        messages(&logs.lines(), "INFO"),
        vec![
            "missing_key not set",
            "ok",
            "ok",
            "nozzle_temp=210",
            "ok",
            "ok",
        ]
    );
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            "config_get missing_key",
            "config_set nozzle_temp 210",
            "config_get nozzle_temp",
            "config_del nozzle_temp",
        ]
    );
}

#[test]
fn test_config_get_empty_value_is_not_set() {
    let mut robot = MockRobot::new();
    robot.settings.insert("key".to_string(), String::new());
    let calls = robot.calls_handle();
    let mut console = console(robot);

    let (result, logs) = with_logs(|| console.on_cmd("config get key"));
    result.unwrap();

    assert_eq!(messages(&logs.lines(), "INFO"), vec!["key not set", "ok"]);
    assert_eq!(*calls.lock().unwrap(), vec!["config_get key"]);
}

#[test]
fn test_oneshot_opens_previews() {
    let mut robot = MockRobot::new();
    robot.previews = vec![Preview::new("image/jpeg", b"\xff\xd8\xff".to_vec())];
    let viewer = RecordingViewer::default();
    let opened = viewer.opened.clone();
    let mut console = Console::new(robot).with_viewer(viewer);

    console.on_cmd("oneshot").unwrap();

    let opened = opened.lock().unwrap();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].len(), 1);
    let path = &opened[0][0];
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jpg"));
    assert_eq!(std::fs::read(path).unwrap(), b"\xff\xd8\xff");
    let _ = std::fs::remove_file(path);
}

#[test]
fn test_scanimages_without_images_opens_nothing() {
    let viewer = RecordingViewer::default();
    let opened = viewer.opened.clone();
    let mut console = Console::new(MockRobot::new()).with_viewer(viewer);

    console.on_cmd("scanimages").unwrap();

    assert!(opened.lock().unwrap().is_empty());
}

#[test]
fn test_command_paths() {
    let console = console(MockRobot::new());
    let paths = console.command_paths();

    for expected in ["deviceinfo", "play quit", "play info", "config set", "raw", "eadj"] {
        assert!(paths.iter().any(|p| p == expected), "missing {}", expected);
    }
    assert!(!paths.iter().any(|p| p == "play"));
    assert_eq!(console.mode(), ConsoleMode::Standard);
}
