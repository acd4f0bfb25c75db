use std::time::Duration;

use broadside::transport::in_memory::InMemoryTransport;
use broadside::transport::tcp::TcpTransport;
use broadside::transport::Transport;
use broadside::{
    decode, drive, encode, AiPlayer, Board, Cell, ConnectionState, Coord, GameError, GameResult,
    Message, Orientation, PeerNode, Phase, PlacementError, Player, Snapshot, Turn, SHIPS,
    TOTAL_SHIP_CELLS,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::net::TcpListener;
use tokio::time::timeout;

const GAME_TIMEOUT: Duration = Duration::from_secs(30);

enum TransportKind {
    InMemory,
    Tcp,
}

async fn ai_peer<T: Transport + 'static>(
    transport: T,
    accepted_incoming: bool,
    seed: u64,
) -> anyhow::Result<Snapshot> {
    let (node, handle) = PeerNode::new(transport, accepted_incoming);
    let node_task = tokio::spawn(node.run());
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut player = AiPlayer::new();
    drive(&mut player, &handle, &mut rng).await?;
    drop(handle);
    node_task.await?
}

async fn play_pair(kind: TransportKind, seed: u64) -> anyhow::Result<(Snapshot, Snapshot)> {
    match kind {
        TransportKind::InMemory => {
            let (t1, t2) = InMemoryTransport::pair();
            tokio::try_join!(ai_peer(t1, true, seed), ai_peer(t2, false, seed + 1))
        }
        TransportKind::Tcp => {
            let listener = TcpListener::bind("127.0.0.1:0").await?;
            let addr = listener.local_addr()?;
            let accept = tokio::spawn(async move {
                let (socket, _) = listener.accept().await?;
                Ok::<TcpTransport, anyhow::Error>(TcpTransport::new(socket))
            });
            let client = TcpTransport::connect(addr).await?;
            let server = accept.await??;
            tokio::try_join!(ai_peer(server, true, seed), ai_peer(client, false, seed + 1))
        }
    }
}

async fn run_game(kind: TransportKind, seed: u64) -> anyhow::Result<(Snapshot, Snapshot)> {
    timeout(GAME_TIMEOUT, play_pair(kind, seed)).await?
}

fn assert_one_winner(host: &Snapshot, joiner: &Snapshot) {
    assert_eq!(host.phase, Phase::GameOver);
    assert_eq!(joiner.phase, Phase::GameOver);
    let (winner, loser) = match (host.result, joiner.result) {
        (GameResult::Win, GameResult::Loss) => (host, joiner),
        (GameResult::Loss, GameResult::Win) => (joiner, host),
        other => panic!("expected one winner, got {:?}", other),
    };
    assert_eq!(loser.own_board.count(Cell::Hit), TOTAL_SHIP_CELLS);
    assert!(loser.own_board.is_fleet_destroyed());
    assert_eq!(winner.opponent_view.count(Cell::Hit), TOTAL_SHIP_CELLS);
    // Both sides saw the same shots.
    assert_eq!(
        winner.opponent_view.count(Cell::Miss),
        loser.own_board.count(Cell::Miss)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ai_game_in_memory() -> anyhow::Result<()> {
    for seed in [1, 7, 42] {
        let (host, joiner) = run_game(TransportKind::InMemory, seed).await?;
        assert_one_winner(&host, &joiner);
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ai_game_over_tcp() -> anyhow::Result<()> {
    let (host, joiner) = run_game(TransportKind::Tcp, 2024).await?;
    assert_one_winner(&host, &joiner);
    Ok(())
}

fn standard_fleet() -> Board {
    let mut board = Board::new();
    let origins = [(0, 0), (0, 2), (1, 4), (0, 6), (0, 8)];
    for (kind, (x, y)) in SHIPS.iter().zip(origins) {
        board
            .place(*kind, Coord::new(x, y), Orientation::Horizontal)
            .unwrap();
    }
    board
}

async fn recv_message(t: &mut InMemoryTransport) -> anyhow::Result<Message> {
    let text = timeout(Duration::from_secs(5), t.recv()).await??;
    Ok(decode(&text)?)
}

/// Drive a node as host against a hand-scripted joiner on the raw transport.
#[tokio::test]
async fn test_node_against_scripted_peer() -> anyhow::Result<()> {
    let (local, mut remote) = InMemoryTransport::pair();
    let (node, handle) = PeerNode::new(local, true);
    let node_task = tokio::spawn(node.run());
    let mut snapshots = handle.subscribe();

    snapshots.wait_for(|s| s.phase == Phase::Placement).await?;
    handle.submit_placement(standard_fleet()).await?;
    assert_eq!(recv_message(&mut remote).await?, Message::Ready);

    // Garbage on the wire is dropped without ending the session.
    remote.send("definitely not json".to_string()).await?;
    remote.send(encode(&Message::GameStart)?).await?;
    let snap = snapshots
        .wait_for(|s| s.phase == Phase::Playing)
        .await?
        .clone();
    assert_eq!(snap.turn, Some(Turn::Local));

    handle.attack(Coord::new(5, 5)).await?;
    assert_eq!(
        recv_message(&mut remote).await?,
        Message::Attack { x: 5, y: 5 }
    );
    assert_eq!(
        handle.attack(Coord::new(6, 6)).await,
        Err(GameError::OutOfTurn)
    );
    remote
        .send(encode(&Message::attack_result(Coord::new(5, 5), true))?)
        .await?;
    snapshots
        .wait_for(|s| s.turn == Some(Turn::Opponent))
        .await?;

    remote.send(encode(&Message::Attack { x: 3, y: 4 })?).await?;
    assert_eq!(
        recv_message(&mut remote).await?,
        Message::attack_result(Coord::new(3, 4), true)
    );

    handle.reset();
    let last = timeout(Duration::from_secs(5), node_task).await???;
    assert_eq!(last.phase, Phase::Connecting);
    assert_eq!(last.own_board, Board::new());

    // The node is gone: the handle reports a closed session.
    assert_eq!(
        handle.attack(Coord::new(1, 1)).await,
        Err(GameError::SessionClosed)
    );
    Ok(())
}

#[tokio::test]
async fn test_peer_disconnect_stops_node() -> anyhow::Result<()> {
    let (local, remote) = InMemoryTransport::pair();
    let (node, handle) = PeerNode::new(local, false);
    let node_task = tokio::spawn(node.run());

    drop(remote);
    let last = timeout(Duration::from_secs(5), node_task).await???;
    assert_eq!(last.connection, ConnectionState::Disconnected);
    assert_eq!(last.phase, Phase::Placement);
    assert_eq!(
        handle.submit_placement(standard_fleet()).await,
        Err(GameError::SessionClosed)
    );
    Ok(())
}

#[tokio::test]
async fn test_rejected_fleet_is_reported_to_caller() -> anyhow::Result<()> {
    let (local, _remote) = InMemoryTransport::pair();
    let (node, handle) = PeerNode::new(local, true);
    let node_task = tokio::spawn(node.run());

    let err = handle.submit_placement(Board::new()).await.unwrap_err();
    assert!(matches!(err, GameError::IllegalPlacement(_)));
    assert!(!handle.snapshot().local_ready);

    drop(handle);
    let last = timeout(Duration::from_secs(5), node_task).await???;
    assert_eq!(last.phase, Phase::Placement);
    Ok(())
}

/// Offers an empty board every time it is asked for a fleet.
#[derive(Default)]
struct EmptyFleet {
    offers: usize,
}

#[async_trait::async_trait]
impl Player for EmptyFleet {
    fn place_fleet(&mut self, _rng: &mut SmallRng) -> Result<Board, PlacementError> {
        self.offers += 1;
        Ok(Board::new())
    }

    async fn select_target(&mut self, _rng: &mut SmallRng, _view: &Board) -> Option<Coord> {
        None
    }
}

#[tokio::test]
async fn test_drive_stops_after_rejected_fleet() -> anyhow::Result<()> {
    let (local, _remote) = InMemoryTransport::pair();
    let (node, handle) = PeerNode::new(local, true);
    let node_task = tokio::spawn(node.run());
    let mut rng = SmallRng::seed_from_u64(3);
    let mut player = EmptyFleet::default();

    let err = timeout(Duration::from_secs(5), drive(&mut player, &handle, &mut rng))
        .await?
        .unwrap_err();
    assert!(err.to_string().contains("fleet rejected"), "{}", err);
    assert_eq!(player.offers, 1);

    drop(handle);
    let last = timeout(Duration::from_secs(5), node_task).await???;
    assert_eq!(last.phase, Phase::Placement);
    assert!(!last.local_ready);
    Ok(())
}
