use log::warn;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::transport::Transport;

/// Default timeout for writing one frame (30 seconds).
const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum frame payload (64 KiB). Game messages are a few dozen bytes.
const MAX_MESSAGE_SIZE: u32 = 64 * 1024;

const LEN_PREFIX: usize = 4;

/// Length-prefixed text frames over TCP: a big-endian `u32` length followed
/// by the UTF-8 payload.
///
/// Receives have no timeout; an unresponsive opponent simply stalls the game.
pub struct TcpTransport {
    stream: TcpStream,
    read_buf: Vec<u8>,
    send_timeout: Duration,
    max_message_size: u32,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_config(stream, DEFAULT_SEND_TIMEOUT, MAX_MESSAGE_SIZE)
    }

    pub fn with_config(stream: TcpStream, send_timeout: Duration, max_message_size: u32) -> Self {
        Self {
            stream,
            read_buf: Vec::new(),
            send_timeout,
            max_message_size,
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    /// Split a complete frame off the front of the read buffer, if one is there.
    fn take_frame(&mut self) -> anyhow::Result<Option<String>> {
        if self.read_buf.len() < LEN_PREFIX {
            return Ok(None);
        }
        let mut len_bytes = [0u8; LEN_PREFIX];
        len_bytes.copy_from_slice(&self.read_buf[..LEN_PREFIX]);
        let len = u32::from_be_bytes(len_bytes);

        // Bounded read length check to prevent excessive memory allocation
        if len > self.max_message_size {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                len,
                self.max_message_size
            ));
        }
        if len == 0 {
            return Err(anyhow::anyhow!("Invalid message length: 0"));
        }

        let end = LEN_PREFIX + len as usize;
        if self.read_buf.len() < end {
            return Ok(None);
        }
        let payload: Vec<u8> = self.read_buf.drain(..end).skip(LEN_PREFIX).collect();
        match String::from_utf8(payload) {
            Ok(text) => Ok(Some(text)),
            Err(e) => {
                // The frame boundary is intact, so the stream stays usable. An
                // empty frame is never valid JSON and the codec drops it.
                warn!("dropping frame with invalid UTF-8: {}", e.utf8_error());
                Ok(Some(String::new()))
            }
        }
    }
}

fn map_io_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::ConnectionReset => {
            anyhow::anyhow!("Connection closed by peer")
        }
        _ => anyhow::anyhow!("I/O error: {}", e),
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, frame: String) -> anyhow::Result<()> {
        let data = frame.into_bytes();
        if data.is_empty() {
            return Err(anyhow::anyhow!("Invalid message length: 0"));
        }
        if data.len() as u64 > self.max_message_size as u64 {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                data.len(),
                self.max_message_size
            ));
        }

        let send_op = async {
            let len = (data.len() as u32).to_be_bytes();
            self.stream.write_all(&len).await.map_err(map_io_error)?;
            self.stream.write_all(&data).await.map_err(map_io_error)?;
            self.stream.flush().await.map_err(map_io_error)?;
            anyhow::Ok(())
        };

        timeout(self.send_timeout, send_op)
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", self.send_timeout))?
    }

    async fn recv(&mut self) -> anyhow::Result<String> {
        loop {
            if let Some(frame) = self.take_frame()? {
                return Ok(frame);
            }
            // `read_buf` is cancel safe: bytes already read stay in `read_buf`.
            let n = self
                .stream
                .read_buf(&mut self.read_buf)
                .await
                .map_err(map_io_error)?;
            if n == 0 {
                return Err(anyhow::anyhow!("Connection closed by peer"));
            }
        }
    }
}
