use clap::Parser;
use log::{debug, error, info};
use simrelay::{Args, EventSink, OutboundLog, Relay, RelayConfig, RelayEvent};
use simrelay_shared::parse_roster;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Stand-in game: tracks the roster and echoes inputs back to every poller.
struct EchoHost {
    outbound: Option<Arc<OutboundLog>>,
    players: usize,
    inputs: u64,
}

impl EventSink for EchoHost {
    fn emit(&mut self, event: RelayEvent) {
        match event {
            RelayEvent::Roster(roster) => {
                self.players = parse_roster(&roster).map_or(0, |entries| entries.len());
                info!("Roster update ({} players): {}", self.players, roster);
            }
            RelayEvent::Input(input) => {
                self.inputs += 1;
                debug!("Input: {}", input);
                if let Some(outbound) = &self.outbound {
                    outbound.append(input);
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let config = RelayConfig::from(&args);

    // The host keeps running without the relay if it cannot start.
    let mut relay = match Relay::start(&config) {
        Ok(relay) => Some(relay),
        Err(e) => {
            error!("Relay disabled: {}", e);
            None
        }
    };

    let mut host = EchoHost {
        outbound: relay.as_ref().map(Relay::outbound),
        players: 0,
        inputs: 0,
    };

    let tick_rate = args.tick_rate.max(1);
    let mut tick_timer = interval(Duration::from_secs_f32(1.0 / tick_rate as f32));
    tick_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut tick: u64 = 0;

    info!("Host running at {}Hz", tick_rate);

    loop {
        tokio::select! {
            _ = tick_timer.tick() => {
                tick += 1;
                if let Some(relay) = relay.as_mut() {
                    relay.tick(&mut host);
                }

                // Periodic status every ten seconds
                if tick % (u64::from(tick_rate) * 10) == 0 {
                    debug!("Tick {}: {} players, {} inputs so far", tick, host.players, host.inputs);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Received Ctrl+C, shutting down gracefully...");
                break;
            }
        }
    }

    if let Some(relay) = relay.as_mut() {
        relay.stop();
    }

    Ok(())
}
