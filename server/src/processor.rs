//! Per-tick message processing on the host's single-threaded side
//!
//! Once per tick the processor drains the inbound queue, keeps the session
//! registry in step with JOIN/EXIT traffic and hands the host two kinds of
//! event through an [`EventSink`]:
//! - roster updates (`:PLAYERS:...`) whenever membership changes
//! - forwarded inputs (`<id>:MOVE:<detail>`) for everything else
//!
//! Roster updates are also appended to the outbound log so polling browsers
//! see the same membership the host does.

use crate::inbound::InboundQueue;
use crate::outbound::OutboundLog;
use crate::registry::SessionRegistry;
use log::debug;
use simrelay_shared::{format_input, DelimitedCodec, EnvelopeCodec, Payload};
use std::sync::Arc;

/// Event delivered to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    Roster(String),
    Input(String),
}

impl RelayEvent {
    pub fn content(&self) -> &str {
        match self {
            RelayEvent::Roster(content) | RelayEvent::Input(content) => content,
        }
    }
}

/// Receives relay events on the host side.
///
/// Only ever invoked from inside [`RelayProcessor::tick`], i.e. on the thread
/// driving the host's tick loop. Implementations need not be thread-safe.
pub trait EventSink {
    fn emit(&mut self, event: RelayEvent);
}

impl EventSink for Vec<RelayEvent> {
    fn emit(&mut self, event: RelayEvent) {
        self.push(event);
    }
}

/// Counters for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub drained: usize,
    pub dropped: usize,
    pub events: usize,
}

pub struct RelayProcessor<C = DelimitedCodec> {
    inbound: InboundQueue,
    registry: SessionRegistry,
    outbound: Arc<OutboundLog>,
    codec: C,
}

impl RelayProcessor<DelimitedCodec> {
    pub fn new(inbound: InboundQueue, outbound: Arc<OutboundLog>) -> Self {
        Self::with_codec(inbound, outbound, DelimitedCodec)
    }
}

impl<C: EnvelopeCodec> RelayProcessor<C> {
    pub fn with_codec(inbound: InboundQueue, outbound: Arc<OutboundLog>, codec: C) -> Self {
        Self {
            inbound,
            registry: SessionRegistry::new(),
            outbound,
            codec,
        }
    }

    /// Drains everything queued so far and processes it in arrival order.
    ///
    /// Never blocks; the work done is bounded by the current queue length.
    pub fn tick<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> TickSummary {
        let mut summary = TickSummary::default();

        for raw in self.inbound.drain_all() {
            summary.drained += 1;
            match self.process(&raw, sink) {
                Some(events) => summary.events += events,
                None => summary.dropped += 1,
            }
        }

        if summary.drained > 0 {
            debug!(
                "Tick processed {} messages ({} dropped, {} events)",
                summary.drained, summary.dropped, summary.events
            );
        }
        summary
    }

    /// Handles one raw envelope. Returns the number of events emitted, or
    /// `None` if the envelope could not be decoded.
    pub fn process<S: EventSink + ?Sized>(&mut self, raw: &str, sink: &mut S) -> Option<usize> {
        let Some(envelope) = self.codec.decode(raw) else {
            debug!("Dropping malformed envelope {:?}", raw);
            return None;
        };
        let session_id = envelope.session_id.as_str();
        let mut emitted = 0;

        match envelope.command() {
            Payload::Exit => {
                if self.registry.remove(session_id) {
                    self.broadcast_roster(sink);
                    emitted += 1;
                }
            }
            command => {
                // First contact announces the session before its payload is handled.
                if self.registry.admit(session_id) {
                    self.broadcast_roster(sink);
                    emitted += 1;
                }
                if let Some(detail) = command.detail() {
                    sink.emit(RelayEvent::Input(format_input(session_id, detail)));
                    emitted += 1;
                }
            }
        }

        Some(emitted)
    }

    /// Recomputes the roster and sends it to pollers and the host.
    fn broadcast_roster<S: EventSink + ?Sized>(&mut self, sink: &mut S) {
        let roster = self.registry.roster();
        self.outbound.append(roster.clone());
        sink.emit(RelayEvent::Roster(roster));
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn outbound(&self) -> &Arc<OutboundLog> {
        &self.outbound
    }
}
