use clap::Parser;
use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use simrelay_client::SimClient;
use simrelay_shared::parse_roster;
use tokio::time::{sleep, Duration};

const DIRECTIONS: [&str; 4] = ["UP", "DOWN", "LEFT", "RIGHT"];

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Relay base url
    #[arg(short = 's', long, default_value = "http://localhost:8080")]
    server: String,

    /// Session id to present; random when omitted
    #[arg(short = 'i', long)]
    id: Option<String>,

    /// Number of press/release pairs to send
    #[arg(short = 'n', long, default_value = "10")]
    moves: u32,

    /// Delay between inputs in milliseconds
    #[arg(short = 'd', long, default_value = "500")]
    delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let mut rng = rand::thread_rng();
    let session_id = args
        .id
        .unwrap_or_else(|| format!("SimPlayer_{}", rng.gen_range(1000..10000)));

    let mut client = SimClient::new(&args.server, session_id)?;
    info!("Joining {} as {}", args.server, client.session_id());
    client.join().await?;

    let delay = Duration::from_millis(args.delay_ms);
    for _ in 0..args.moves {
        let direction = DIRECTIONS.choose(&mut rng).copied().unwrap_or("UP");

        client.send_move(&format!("{}:PRESS", direction)).await?;
        sleep(delay / 2).await;
        client.send_move(&format!("{}:RELEASE", direction)).await?;
        sleep(delay / 2).await;

        match client.poll().await {
            Ok(messages) => report(&messages),
            Err(e) => warn!("Poll failed: {}", e),
        }
    }

    client.exit().await?;
    info!("Sent EXIT, last cursor {}", client.cursor());

    Ok(())
}

fn report(messages: &[String]) {
    for message in messages {
        match parse_roster(message) {
            Some(entries) => {
                let ids: Vec<&str> = entries.iter().map(|e| e.session_id.as_str()).collect();
                info!("Roster: {:?}", ids);
            }
            None => info!("Broadcast: {}", message),
        }
    }
}
