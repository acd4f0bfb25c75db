/// Bidirectional channel carrying UTF-8 text frames, one message per frame.
///
/// `recv` must be cancel safe: a `PeerNode` polls it inside `tokio::select!`
/// and drops the future whenever a local command arrives first.
#[async_trait::async_trait]
pub trait Transport: Send {
    async fn send(&mut self, frame: String) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<String>;
}

pub mod in_memory;
pub mod tcp;
