//! In-flight tracking for hover lookups that call back into the client.
//!
//! Asking the client for every hover at a position makes it dispatch a hover
//! request to this server again. While the outer lookup waits, its key sits in
//! the set and the nested request is answered with "no hover".
//!
//! Each entry carries a ticket, so a handle that outlives [`HoverGuard::clear`]
//! only ever releases its own entry.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicU64, Ordering};
use tower_lsp::lsp_types::{Position, Url};
use tracing::debug;

/// Key identifying a hover lookup: document URI, line and character
pub fn hover_key(uri: &Url, position: Position) -> String {
    format!("{}-{}-{}", uri, position.line, position.character)
}

#[derive(Debug, Default)]
pub struct HoverGuard {
    in_flight: DashMap<String, u64>,
    next_ticket: AtomicU64,
}

impl HoverGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight.contains_key(key)
    }

    /// Mark `key` in flight until the returned handle is dropped
    ///
    /// Returns `None` when the key is already in flight.
    pub fn try_enter(&self, key: String) -> Option<InFlight<'_>> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        match self.in_flight.entry(key.clone()) {
            Entry::Occupied(_) => {
                debug!(key, "hover lookup already in flight");
                None
            }
            Entry::Vacant(entry) => {
                entry.insert(ticket);
                Some(InFlight {
                    guard: self,
                    key,
                    ticket,
                })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn clear(&self) {
        self.in_flight.clear();
    }
}

/// Handle for an in-flight key; removes it on drop
#[derive(Debug)]
pub struct InFlight<'a> {
    guard: &'a HoverGuard,
    key: String,
    ticket: u64,
}

impl InFlight<'_> {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.guard
            .in_flight
            .remove_if(&self.key, |_, ticket| *ticket == self.ticket);
    }
}
