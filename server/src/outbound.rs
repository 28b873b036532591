//! Bounded broadcast log read by polling clients
//!
//! Every broadcast gets the next id from a single counter. Only the newest
//! `capacity` records are kept; a poller whose cursor falls behind the oldest
//! retained id silently misses the evicted records.

use simrelay_shared::{PollResponse, LOG_CAPACITY};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastRecord {
    pub id: u64,
    pub content: String,
}

#[derive(Debug, Default)]
struct LogState {
    last_id: u64,
    records: VecDeque<BroadcastRecord>,
}

/// Shared between the broadcasting game code and the listener thread.
///
/// A single mutex covers id assignment, append, eviction and scans, so ids
/// are unique and always stored in increasing order.
#[derive(Debug)]
pub struct OutboundLog {
    state: Mutex<LogState>,
    capacity: usize,
}

impl Default for OutboundLog {
    fn default() -> Self {
        Self::new(LOG_CAPACITY)
    }
}

impl OutboundLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(LogState::default()),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LogState> {
        // LogState stays consistent across a panic mid-append.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `content` and returns its id. Ids start at 1.
    pub fn append(&self, content: impl Into<String>) -> u64 {
        let mut state = self.lock();
        state.last_id += 1;
        let id = state.last_id;
        state.records.push_back(BroadcastRecord {
            id,
            content: content.into(),
        });
        while state.records.len() > self.capacity {
            state.records.pop_front();
        }
        id
    }

    /// Returns every retained record newer than `cursor`.
    ///
    /// `last_id` is the newest retained id, or `cursor` when the log is empty,
    /// which lets a client skip past gaps left by eviction.
    pub fn read_since(&self, cursor: u64) -> PollResponse {
        let state = self.lock();
        let mut last_id = cursor;
        let mut messages = Vec::new();

        for record in &state.records {
            last_id = record.id;
            if record.id > cursor {
                messages.push(record.content.clone());
            }
        }

        PollResponse { last_id, messages }
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Id of the oldest record still retained
    pub fn oldest_id(&self) -> Option<u64> {
        self.lock().records.front().map(|record| record.id)
    }
}
