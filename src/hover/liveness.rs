//! Recency state: which document was last marked active, and where the last
//! comment hover in each document was shown.

use dashmap::DashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tower_lsp::lsp_types::{Range, Url};

/// Remembers the most recently marked value
///
/// A value is live while it compares equal to the last mark. With a TTL set,
/// a mark also stops being live once it is older than the TTL.
pub struct ShortLive<T> {
    same: fn(&T, &T) -> bool,
    state: Mutex<LiveState<T>>,
}

struct LiveState<T> {
    marked: Option<(T, Instant)>,
    ttl: Option<Duration>,
}

impl<T> ShortLive<T> {
    pub fn new(same: fn(&T, &T) -> bool) -> Self {
        Self {
            same,
            state: Mutex::new(LiveState {
                marked: None,
                ttl: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, LiveState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mark(&self, value: T) {
        self.state().marked = Some((value, Instant::now()));
    }

    pub fn is_live(&self, value: &T) -> bool {
        let state = self.state();
        match &state.marked {
            Some((marked, at)) => {
                (self.same)(marked, value) && state.ttl.is_none_or(|ttl| at.elapsed() <= ttl)
            }
            None => false,
        }
    }

    pub fn set_ttl(&self, ttl: Option<Duration>) {
        self.state().ttl = ttl;
    }

    pub fn clear(&self) {
        self.state().marked = None;
    }
}

impl<T: PartialEq> Default for ShortLive<T> {
    fn default() -> Self {
        Self::new(|a, b| a == b)
    }
}

impl<T> std::fmt::Debug for ShortLive<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("ShortLive")
            .field("marked", &state.marked.is_some())
            .field("ttl", &state.ttl)
            .finish()
    }
}

/// Range of the last comment hover shown per document
#[derive(Debug, Default)]
pub struct LastHovers {
    ranges: DashMap<String, Range>,
}

impl LastHovers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, uri: &Url, range: Range) {
        self.ranges.insert(uri.to_string(), range);
    }

    pub fn get(&self, uri: &Url) -> Option<Range> {
        self.ranges.get(uri.as_str()).map(|entry| *entry.value())
    }

    pub fn clear(&self) {
        self.ranges.clear();
    }
}
