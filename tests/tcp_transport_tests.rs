use std::time::Duration;

use broadside::transport::tcp::TcpTransport;
use broadside::transport::Transport;
use broadside::{decode, encode, GameError, Message};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

/// A transport on one end and the raw accepted socket on the other.
async fn raw_pair() -> anyhow::Result<(TcpTransport, TcpStream)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (client, accepted) = tokio::join!(TcpTransport::connect(addr), listener.accept());
    Ok((client?, accepted?.0))
}

async fn transport_pair() -> anyhow::Result<(TcpTransport, TcpTransport)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let accept = tokio::spawn(async move {
        let (socket, _) = listener.accept().await?;
        Ok::<TcpTransport, anyhow::Error>(TcpTransport::new(socket))
    });
    let client = TcpTransport::connect(addr).await?;
    let server = accept.await??;
    Ok((server, client))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_messages_cross_in_both_directions() -> anyhow::Result<()> {
    let (mut server, mut client) = transport_pair().await?;

    client.send(encode(&Message::Ready)?).await?;
    client.send(encode(&Message::Attack { x: 3, y: 4 })?).await?;
    assert_eq!(decode(&server.recv().await?)?, Message::Ready);
    assert_eq!(decode(&server.recv().await?)?, Message::Attack { x: 3, y: 4 });

    server
        .send(encode(&Message::AttackResult {
            x: 3,
            y: 4,
            hit: true,
        })?)
        .await?;
    assert_eq!(
        decode(&client.recv().await?)?,
        Message::AttackResult {
            x: 3,
            y: 4,
            hit: true
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_oversized_length_prefix_is_rejected() -> anyhow::Result<()> {
    let (mut transport, mut raw) = raw_pair().await?;
    raw.write_all(&(1_000_000u32).to_be_bytes()).await?;
    raw.flush().await?;
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("Message too large"), "{}", err);
    Ok(())
}

#[tokio::test]
async fn test_zero_length_frame_is_rejected() -> anyhow::Result<()> {
    let (mut transport, mut raw) = raw_pair().await?;
    raw.write_all(&0u32.to_be_bytes()).await?;
    raw.flush().await?;
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("Invalid message length"), "{}", err);
    Ok(())
}

#[tokio::test]
async fn test_invalid_utf8_reaches_codec_as_malformed() -> anyhow::Result<()> {
    let (mut transport, mut raw) = raw_pair().await?;
    let mut inside_string = br#"{"type":"ready","junk":""#.to_vec();
    inside_string.push(0xff);
    inside_string.extend_from_slice(br#""}"#);
    let payloads = [vec![0xffu8, 0xfe, b'{', b'}'], inside_string];
    for payload in &payloads {
        raw.write_all(&(payload.len() as u32).to_be_bytes()).await?;
        raw.write_all(payload).await?;
    }
    raw.write_all(&(16u32).to_be_bytes()).await?;
    raw.write_all(br#"{"type":"ready"}"#).await?;
    raw.flush().await?;

    for _ in &payloads {
        let text = transport.recv().await?;
        assert!(
            matches!(decode(&text), Err(GameError::MalformedMessage(_))),
            "{:?} decoded",
            text
        );
    }
    // The stream is still framed correctly afterwards.
    assert_eq!(decode(&transport.recv().await?)?, Message::Ready);
    Ok(())
}

#[tokio::test]
async fn test_back_to_back_frames_in_one_write() -> anyhow::Result<()> {
    let (mut transport, mut raw) = raw_pair().await?;
    let mut bytes = Vec::new();
    for msg in [Message::Ready, Message::GameStart] {
        let text = encode(&msg)?;
        bytes.extend_from_slice(&(text.len() as u32).to_be_bytes());
        bytes.extend_from_slice(text.as_bytes());
    }
    raw.write_all(&bytes).await?;
    raw.flush().await?;

    assert_eq!(decode(&transport.recv().await?)?, Message::Ready);
    assert_eq!(decode(&transport.recv().await?)?, Message::GameStart);
    Ok(())
}

#[tokio::test]
async fn test_peer_close_is_reported() -> anyhow::Result<()> {
    let (mut transport, raw) = raw_pair().await?;
    drop(raw);
    let err = transport.recv().await.unwrap_err();
    assert!(
        err.to_string().contains("Connection closed by peer"),
        "{}",
        err
    );
    Ok(())
}

#[tokio::test]
async fn test_oversized_send_is_refused_locally() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (stream, _accepted) = tokio::join!(TcpStream::connect(addr), listener.accept());
    let mut transport = TcpTransport::with_config(stream?, Duration::from_secs(1), 16);

    let err = transport.send("x".repeat(17)).await.unwrap_err();
    assert!(err.to_string().contains("Message too large"), "{}", err);
    assert!(transport.send(String::new()).await.is_err());
    Ok(())
}
