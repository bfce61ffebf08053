//! Raw socket 抽象
//!
//! raw 模式下 socket 被拆成两半：读端移交给 relay 线程，写端留在前台。

use crate::error::RawError;
use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

/// Raw socket 读端
pub trait RawRx: Send {
    /// 带超时读取
    ///
    /// - `Ok(n)` (n > 0)：读到 n 字节
    /// - `Ok(0)`：对端已关闭
    /// - `Err(RawError::Timeout)`：超时内无数据
    fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, RawError>;
}

/// Raw socket 写端
pub trait RawTx: Send {
    fn send(&mut self, data: &[u8]) -> Result<(), RawError>;
}

/// 已拆分的双向 raw socket
pub struct RawSocket {
    pub rx: Box<dyn RawRx>,
    pub tx: Box<dyn RawTx>,
}

impl RawSocket {
    pub fn new(rx: impl RawRx + 'static, tx: impl RawTx + 'static) -> Self {
        Self {
            rx: Box::new(rx),
            tx: Box::new(tx),
        }
    }

    /// 拆分 TCP 连接
    pub fn tcp(stream: TcpStream) -> std::io::Result<Self> {
        let rx = StreamRx::new(stream.try_clone()?);
        Ok(Self::new(rx, stream))
    }

    /// 拆分 Unix domain socket
    #[cfg(unix)]
    pub fn unix(stream: std::os::unix::net::UnixStream) -> std::io::Result<Self> {
        let rx = StreamRx::new(stream.try_clone()?);
        Ok(Self::new(rx, stream))
    }

    pub fn split(self) -> (Box<dyn RawRx>, Box<dyn RawTx>) {
        (self.rx, self.tx)
    }
}

impl std::fmt::Debug for RawSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawSocket").finish_non_exhaustive()
    }
}

/// 支持读超时的流
pub trait TimeoutStream: Read + Send {
    fn set_timeout(&self, timeout: Option<Duration>) -> std::io::Result<()>;
}

impl TimeoutStream for TcpStream {
    fn set_timeout(&self, timeout: Option<Duration>) -> std::io::Result<()> {
        self.set_read_timeout(timeout)
    }
}

#[cfg(unix)]
impl TimeoutStream for std::os::unix::net::UnixStream {
    fn set_timeout(&self, timeout: Option<Duration>) -> std::io::Result<()> {
        self.set_read_timeout(timeout)
    }
}

/// 流读端：仅在超时变化时重新设置
pub struct StreamRx<S> {
    stream: S,
    timeout: Option<Duration>,
}

impl<S: TimeoutStream> StreamRx<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            timeout: None,
        }
    }
}

impl<S: TimeoutStream> RawRx for StreamRx<S> {
    fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, RawError> {
        // 零超时在 std 中是非法参数
        let timeout = timeout.max(Duration::from_millis(1));
        if self.timeout != Some(timeout) {
            self.stream.set_timeout(Some(timeout))?;
            self.timeout = Some(timeout);
        }

        match self.stream.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                Err(RawError::Timeout)
            },
            Err(e) if e.kind() == ErrorKind::Interrupted => Err(RawError::Timeout),
            Err(e) => Err(RawError::Io(e)),
        }
    }
}

impl RawTx for TcpStream {
    fn send(&mut self, data: &[u8]) -> Result<(), RawError> {
        self.write_all(data)?;
        self.flush()?;
        Ok(())
    }
}

#[cfg(unix)]
impl RawTx for std::os::unix::net::UnixStream {
    fn send(&mut self, data: &[u8]) -> Result<(), RawError> {
        self.write_all(data)?;
        self.flush()?;
        Ok(())
    }
}
