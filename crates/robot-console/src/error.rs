//! 控制台错误类型定义
//!
//! 三类错误：
//! - [`DomainError`]：前置条件不满足或设备拒绝，分发层捕获并记录日志
//! - [`ConsoleError`]：其余错误（参数、IO、Raw socket），向上传播给 shell
//! - [`RobotError`]：设备对象（collaborator）返回的错误

use thiserror::Error;

/// 仅支持 SD 存储
pub const SD_ONLY: &str = "SD_ONLY";

/// 不支持的存储入口
pub const BAD_ENTRY: &str = "BAD_ENTRY";

/// 领域错误：携带 (code, detail)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// 操作不支持（如非 SD 入口上的 mkdir）
    #[error("NOT_SUPPORT: {0}")]
    NotSupported(&'static str),

    /// 参数无效
    #[error("BAD_PARAMS: {0}")]
    BadParams(String),

    /// 设备拒绝执行
    #[error("{code}: {detail}")]
    Rejected { code: String, detail: String },
}

impl DomainError {
    pub fn code(&self) -> &str {
        match self {
            DomainError::NotSupported(_) => "NOT_SUPPORT",
            DomainError::BadParams(_) => "BAD_PARAMS",
            DomainError::Rejected { code, .. } => code,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            DomainError::NotSupported(detail) => detail,
            DomainError::BadParams(detail) => detail,
            DomainError::Rejected { detail, .. } => detail,
        }
    }
}

/// 设备对象错误
#[derive(Error, Debug)]
pub enum RobotError {
    /// 设备以错误码拒绝命令
    #[error("Rejected by device: {code} {detail}")]
    Rejected { code: String, detail: String },

    /// 本地 IO 错误（文件读写、socket）
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 与设备的连接已断开
    #[error("Connection lost: {0}")]
    Connection(String),
}

impl RobotError {
    pub fn rejected(code: impl Into<String>, detail: impl Into<String>) -> Self {
        RobotError::Rejected {
            code: code.into(),
            detail: detail.into(),
        }
    }
}

/// Raw socket 错误
#[derive(Error, Debug)]
pub enum RawError {
    /// 轮询超时（没有可读数据，不是错误）
    #[error("Read timeout")]
    Timeout,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 对端已关闭
    #[error("Raw socket closed")]
    Closed,
}

/// 控制台错误
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// 领域错误（分发层捕获，不会传播到 shell）
    #[error("RuntimeError({}, {})", .0.code(), .0.detail())]
    Domain(#[from] DomainError),

    /// 参数数量或格式错误
    #[error("Invalid arguments for `{command}`: {detail}")]
    Arguments { command: String, detail: String },

    /// 引号不匹配等分词错误
    #[error("Cannot tokenize command line: {0:?}")]
    Tokenize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Raw socket error: {0}")]
    Raw(#[from] RawError),

    /// 设备连接层错误
    #[error("Robot error: {0}")]
    Robot(String),

    /// Relay 线程 panic
    #[error("Raw relay thread panicked")]
    RelayPanicked,
}

impl ConsoleError {
    pub fn arguments(command: &str, detail: impl Into<String>) -> Self {
        ConsoleError::Arguments {
            command: command.to_string(),
            detail: detail.into(),
        }
    }
}

impl From<RobotError> for ConsoleError {
    fn from(err: RobotError) -> Self {
        match err {
            RobotError::Rejected { code, detail } => {
                ConsoleError::Domain(DomainError::Rejected { code, detail })
            },
            RobotError::Io(e) => ConsoleError::Io(e),
            RobotError::Connection(msg) => ConsoleError::Robot(msg),
        }
    }
}
