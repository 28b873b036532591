//! Multi-producer, single-consumer queue of raw envelopes
//!
//! Listener tasks hold an [`InboundSender`] and push each posted body as-is.
//! The tick side owns the single [`InboundQueue`] and drains it without
//! blocking. The queue is unbounded: under sustained overload it grows rather
//! than pushing back on senders.

use log::debug;
use tokio::sync::mpsc;

/// Producer half, cloned into every request handler.
#[derive(Debug, Clone)]
pub struct InboundSender {
    tx: mpsc::UnboundedSender<String>,
}

impl InboundSender {
    /// Never blocks. If the consumer is gone the message is discarded.
    pub fn enqueue(&self, raw: String) {
        if self.tx.send(raw).is_err() {
            debug!("Inbound queue closed, dropping message");
        }
    }
}

/// Consumer half, owned by the tick loop.
#[derive(Debug)]
pub struct InboundQueue {
    rx: mpsc::UnboundedReceiver<String>,
}

impl InboundQueue {
    pub fn new() -> (InboundSender, InboundQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (InboundSender { tx }, InboundQueue { rx })
    }

    /// Removes and returns everything queued right now, in arrival order.
    pub fn drain_all(&mut self) -> Vec<String> {
        let mut drained = Vec::new();
        while let Ok(raw) = self.rx.try_recv() {
            drained.push(raw);
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_drain_empty_queue() {
        let (_tx, mut queue) = InboundQueue::new();
        assert!(queue.drain_all().is_empty());
    }

    #[test]
    fn test_drain_preserves_fifo_order() {
        let (tx, mut queue) = InboundQueue::new();
        for i in 0..5 {
            tx.enqueue(format!("U{}|||JOIN", i));
        }

        let drained = queue.drain_all();
        assert_eq!(
            drained,
            vec![
                "U0|||JOIN",
                "U1|||JOIN",
                "U2|||JOIN",
                "U3|||JOIN",
                "U4|||JOIN"
            ]
        );
        assert!(queue.drain_all().is_empty());
    }

    #[test]
    fn test_enqueue_after_consumer_dropped() {
        let (tx, queue) = InboundQueue::new();
        drop(queue);
        tx.enqueue("U1|||JOIN".to_string());
    }

    #[test]
    fn test_concurrent_producers_keep_per_thread_order() {
        let (tx, mut queue) = InboundQueue::new();

        let handles: Vec<_> = (0..4)
            .map(|producer| {
                let tx = tx.clone();
                thread::spawn(move || {
                    for seq in 0..250 {
                        tx.enqueue(format!("P{}|||{}", producer, seq));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let drained = queue.drain_all();
        assert_eq!(drained.len(), 1000);

        for producer in 0..4 {
            let prefix = format!("P{}|||", producer);
            let seqs: Vec<u32> = drained
                .iter()
                .filter_map(|raw| raw.strip_prefix(&prefix))
                .map(|seq| seq.parse().unwrap())
                .collect();
            assert_eq!(seqs, (0..250).collect::<Vec<_>>());
        }
    }
}
