//! In-memory session cache with expiry.

use crate::service::SessionStore;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Single-session cache backed by a map of value + deadline. Entries are
/// evicted lazily on read.
pub struct InMemorySession {
    entries: Mutex<HashMap<String, (String, Instant)>>,
    ttl: Duration,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Override the one-minute expiry, e.g. to shorten it under test.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }
}

impl Default for InMemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySession {
    fn cached(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some((value, deadline)) if *deadline > Instant::now() => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn cache_for_1min(&self, key: &str, value: &str) {
        let deadline = Instant::now() + self.ttl;
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), (value.to_string(), deadline));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_value_roundtrip() {
        let session = InMemorySession::new();
        assert_eq!(session.cached("DSP-token"), None);
        session.cache_for_1min("DSP-token", "abc");
        assert_eq!(session.cached("DSP-token").as_deref(), Some("abc"));
    }

    #[test]
    fn test_entries_expire() {
        let session = InMemorySession::with_ttl(Duration::from_millis(10));
        session.cache_for_1min("DSP-token", "abc");
        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(session.cached("DSP-token"), None);
    }

    #[test]
    fn test_rewrite_resets_deadline() {
        let session = InMemorySession::with_ttl(Duration::from_millis(50));
        session.cache_for_1min("k", "v1");
        session.cache_for_1min("k", "v2");
        assert_eq!(session.cached("k").as_deref(), Some("v2"));
    }
}
