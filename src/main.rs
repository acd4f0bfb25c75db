use broadside::init_logging;
use broadside::prelude::*;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::net::TcpListener;

/// Two-player naval combat over a direct connection.
#[derive(Parser)]
#[command(name = "broadside", version, about)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Controller {
    /// Type targets at the terminal.
    Human,
    /// Let the probability AI fire.
    Ai,
}

#[derive(Args, Clone, Copy)]
struct SeatArgs {
    /// Who plays this seat.
    #[arg(long = "player", value_enum, default_value_t = Controller::Human)]
    controller: Controller,
    /// Seed for fleet placement and AI targeting.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Mode {
    /// Watch two AI admirals fight over an in-process channel.
    Local {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Wait for an opponent to connect. The host fires first.
    Host {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        #[command(flatten)]
        seat: SeatArgs,
    },
    /// Connect to a waiting host.
    Join {
        #[arg(long, default_value = "127.0.0.1:8080")]
        connect: String,
        #[command(flatten)]
        seat: SeatArgs,
    },
}

fn seeded(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => {
            info!("seed {} fixed, placement and AI shots are reproducible", s);
            SmallRng::seed_from_u64(s)
        }
        None => SmallRng::from_rng(&mut rand::rng()),
    }
}

fn seat_player(controller: Controller) -> Box<dyn Player> {
    match controller {
        Controller::Human => Box::new(CliPlayer::new()),
        Controller::Ai => Box::new(AiPlayer::new()),
    }
}

/// Run one peer to completion: the node loop in a task, the player here.
async fn play<T: Transport + 'static>(
    link: T,
    accepted_incoming: bool,
    mut player: Box<dyn Player>,
    mut rng: SmallRng,
) -> anyhow::Result<Snapshot> {
    let (node, handle) = PeerNode::new(link, accepted_incoming);
    let node_task = tokio::spawn(node.run());
    drive(player.as_mut(), &handle, &mut rng).await?;
    drop(handle);
    node_task.await?
}

fn report(label: &str, snapshot: &Snapshot) {
    let verdict = match snapshot.result {
        GameResult::Win => "won",
        GameResult::Loss => "lost",
        GameResult::Undecided => "did not finish",
    };
    let view = &snapshot.opponent_view;
    println!(
        "{} {} ({} shots fired, {} hits taken)",
        label,
        verdict,
        view.count(Cell::Hit) + view.count(Cell::Miss),
        snapshot.own_board.count(Cell::Hit)
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    match Cli::parse().mode {
        Mode::Local { seed } => {
            let (host_link, joiner_link) = InMemoryTransport::pair();
            let (host, joiner) = tokio::try_join!(
                play(host_link, true, Box::new(AiPlayer::new()), seeded(seed)),
                play(
                    joiner_link,
                    false,
                    Box::new(AiPlayer::new()),
                    seeded(seed.map(|s| s.wrapping_add(1)))
                ),
            )?;
            println!("Host fleet:\n{}", host.own_board);
            println!("Joiner fleet:\n{}", joiner.own_board);
            report("Host", &host);
            report("Joiner", &joiner);
        }
        Mode::Host { bind, seat } => {
            let listener = TcpListener::bind(&bind).await?;
            println!("Listening on {}, waiting for an opponent...", listener.local_addr()?);
            let (stream, peer) = listener.accept().await?;
            info!("accepted connection from {}", peer);
            // One game per connection.
            drop(listener);

            let rng = seeded(seat.seed);
            let snapshot = play(TcpTransport::new(stream), true, seat_player(seat.controller), rng)
                .await?;
            report("You", &snapshot);
        }
        Mode::Join { connect, seat } => {
            let link = TcpTransport::connect(&connect).await?;
            info!("connected to host at {}", connect);

            let rng = seeded(seat.seed);
            let snapshot = play(link, false, seat_player(seat.controller), rng).await?;
            report("You", &snapshot);
        }
    }
    Ok(())
}
