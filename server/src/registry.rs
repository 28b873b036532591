//! Session bookkeeping for connected simulator clients
//!
//! The registry is owned by the tick loop and is never shared with the
//! listener thread. Sessions are keyed by the raw client-supplied id and kept
//! in lexicographic order, which is also the roster's presentation order.

use log::info;
use simrelay_shared::format_roster;
use std::collections::BTreeSet;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: BTreeSet<String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session. Returns false if it was already present.
    pub fn admit(&mut self, session_id: &str) -> bool {
        if self.sessions.contains(session_id) {
            return false;
        }
        self.sessions.insert(session_id.to_string());
        info!("Session {} joined ({} connected)", session_id, self.len());
        true
    }

    /// Removes a session. Returns false if it was not registered.
    pub fn remove(&mut self, session_id: &str) -> bool {
        if self.sessions.remove(session_id) {
            info!("Session {} left ({} connected)", session_id, self.len());
            true
        } else {
            false
        }
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains(session_id)
    }

    /// Session ids in roster order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sessions.iter().map(String::as_str)
    }

    /// Full roster broadcast for the current membership.
    ///
    /// Rebuilt from scratch on every call; rosters are small.
    pub fn roster(&self) -> String {
        format_roster(self.ids())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
