//! Stored cache entries.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// A timestamped JSON payload, stored as `{"ts": <epoch ms>, "data": <json>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Epoch milliseconds of the fetch that produced `data`.
    pub ts: i64,
    pub data: Value,
}

impl CacheEntry {
    pub fn new(ts: i64, data: Value) -> Self {
        Self { ts, data }
    }

    /// Age of the entry at `now_ms`. Entries from the future have age zero.
    #[must_use]
    pub fn age_ms(&self, now_ms: i64) -> u64 {
        u64::try_from(now_ms.saturating_sub(self.ts)).unwrap_or(0)
    }

    /// True while the entry is younger than `ttl`.
    #[must_use]
    pub fn is_fresh(&self, now_ms: i64, ttl: Duration) -> bool {
        u128::from(self.age_ms(now_ms)) < ttl.as_millis()
    }
}

/// Borrowed form used when writing, so payloads are not cloned.
#[derive(Serialize)]
pub(crate) struct CacheEntryRef<'a> {
    pub ts: i64,
    pub data: &'a Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_freshness_window() {
        let entry = CacheEntry::new(1_000, json!({"a": 1}));
        let ttl = Duration::from_millis(500);

        assert!(entry.is_fresh(1_000, ttl));
        assert!(entry.is_fresh(1_499, ttl));
        assert!(!entry.is_fresh(1_500, ttl));
        assert!(entry.is_fresh(900, ttl));
        assert!(!entry.is_fresh(1_000, Duration::ZERO));
    }

    #[test]
    fn test_wire_format() {
        let written = serde_json::to_string(&CacheEntryRef {
            ts: 42,
            data: &json!([1, 2]),
        })
        .unwrap();
        assert_eq!(written, r#"{"ts":42,"data":[1,2]}"#);

        let read: CacheEntry = serde_json::from_str(&written).unwrap();
        assert_eq!(read, CacheEntry::new(42, json!([1, 2])));
    }
}
