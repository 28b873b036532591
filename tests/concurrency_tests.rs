//! Concurrency tests for the shared relay structures
//!
//! Exercises many simultaneous HTTP producers against the single tick-side
//! consumer, and concurrent broadcasters against a polling reader.

use simrelay::{OutboundLog, Relay, RelayConfig, RelayEvent};
use simrelay_client::SimClient;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::time::sleep;
use tokio_test::assert_ok;

fn start_relay() -> Relay {
    let config = RelayConfig {
        port: 0,
        ..RelayConfig::default()
    };
    assert_ok!(Relay::start(&config))
}

/// Concurrent testers: nothing lost, each tester's inputs stay in order
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_clients_lossless_and_ordered() {
    const CLIENTS: usize = 8;
    const MOVES: usize = 20;

    let mut relay = start_relay();
    let base_url = format!("http://{}", relay.local_addr());

    let tasks: Vec<_> = (0..CLIENTS)
        .map(|c| {
            let base_url = base_url.clone();
            tokio::spawn(async move {
                let sim = assert_ok!(SimClient::new(&base_url, format!("S{}", c)));
                assert_ok!(sim.join().await);
                for m in 0..MOVES {
                    assert_ok!(sim.send_move(&m.to_string()).await);
                }
            })
        })
        .collect();
    for task in tasks {
        assert_ok!(task.await);
    }

    let mut events: Vec<RelayEvent> = Vec::new();
    for _ in 0..100 {
        relay.tick(&mut events);
        if events.len() >= CLIENTS * (MOVES + 1) {
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }

    let mut per_session: HashMap<String, Vec<usize>> = HashMap::new();
    let mut rosters = 0;
    for event in &events {
        match event {
            RelayEvent::Roster(_) => rosters += 1,
            RelayEvent::Input(content) => {
                let mut parts = content.splitn(3, ':');
                let session = parts.next().unwrap().to_string();
                assert_eq!(parts.next(), Some("MOVE"));
                let step: usize = parts.next().unwrap().parse().unwrap();
                per_session.entry(session).or_default().push(step);
            }
        }
    }

    assert_eq!(rosters, CLIENTS);
    assert_eq!(relay.sessions().len(), CLIENTS);
    assert_eq!(per_session.len(), CLIENTS);
    for steps in per_session.values() {
        assert_eq!(steps, &(0..MOVES).collect::<Vec<_>>());
    }
}

/// Broadcasting threads never produce duplicate or out-of-order ids for a poller
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_broadcasts_poll_in_id_order() {
    const THREADS: usize = 4;
    const PER_THREAD: usize = 100;

    let relay = start_relay();
    let outbound: Arc<OutboundLog> = relay.outbound();
    let mut poller = assert_ok!(SimClient::new(
        &format!("http://{}", relay.local_addr()),
        "poller"
    ));

    let writers: Vec<_> = (0..THREADS)
        .map(|t| {
            let outbound = Arc::clone(&outbound);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    outbound.append(format!("{}:{}", t, i));
                }
            })
        })
        .collect();

    let mut seen = Vec::new();
    let mut last_cursor = 0;
    loop {
        seen.extend(assert_ok!(poller.poll().await));
        assert!(poller.cursor() >= last_cursor);
        last_cursor = poller.cursor();

        if seen.len() >= THREADS * PER_THREAD && writers.iter().all(|w| w.is_finished()) {
            break;
        }
        sleep(Duration::from_millis(5)).await;
    }
    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(seen.len(), THREADS * PER_THREAD);
    assert_eq!(poller.cursor(), (THREADS * PER_THREAD) as u64);

    // Each writer's records appear in its own append order.
    for t in 0..THREADS {
        let prefix = format!("{}:", t);
        let order: Vec<usize> = seen
            .iter()
            .filter_map(|m| m.strip_prefix(&prefix))
            .map(|i| i.parse().unwrap())
            .collect();
        assert_eq!(order, (0..PER_THREAD).collect::<Vec<_>>());
    }
}
