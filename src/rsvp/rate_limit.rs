//! Per-client request throttling for the RSVP endpoint.
//!
//! Counters live in process memory, so limits are per instance and reset
//! on restart. Running more than one instance needs a shared counter
//! store instead.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use http::HeaderMap;

/// Bucket shared by every client that sent no identifying header
pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
    /// Upper bound on tracked client identifiers
    pub capacity: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(5 * 60),
            capacity: 10_000,
        }
    }
}

#[derive(Debug)]
struct Entry {
    count: u32,
    reset_at: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    entries: Mutex<HashMap<String, Entry>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request from `client_id` and return whether it may proceed.
    pub fn allow(&self, client_id: &str) -> bool {
        self.allow_at(client_id, Instant::now())
    }

    pub fn allow_at(&self, client_id: &str, now: Instant) -> bool {
        let mut entries = self.entries.lock().expect("Rate limit lock poisoned");

        if let Some(entry) = entries.get_mut(client_id)
            && now <= entry.reset_at
        {
            if entry.count >= self.config.max_requests {
                return false;
            }
            entry.count += 1;
            return true;
        }

        // First request in a fresh window
        if !entries.contains_key(client_id) && entries.len() >= self.config.capacity {
            evict(&mut entries, now, self.config.capacity);
        }
        entries.insert(
            client_id.to_string(),
            Entry {
                count: 1,
                reset_at: now + self.config.window,
            },
        );
        true
    }

    /// Drop every entry whose window has passed. Returns how many were removed.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock().expect("Rate limit lock poisoned");
        let before = entries.len();
        entries.retain(|_, entry| now <= entry.reset_at);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("Rate limit lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Make room for one more entry. Expired windows go first; a live entry
/// is only dropped, closest to its reset, when none had expired.
fn evict(entries: &mut HashMap<String, Entry>, now: Instant, capacity: usize) {
    entries.retain(|_, entry| now <= entry.reset_at);
    if entries.len() < capacity {
        return;
    }
    let oldest = entries
        .iter()
        .min_by_key(|(_, entry)| entry.reset_at)
        .map(|(key, _)| key.clone());
    if let Some(key) = oldest {
        tracing::debug!("Rate limiter full, evicting {}", key);
        entries.remove(&key);
    }
}

/// Identify the caller from proxy headers: the first `x-forwarded-for`
/// hop, then `x-real-ip`, then the shared `unknown` bucket.
///
/// Both headers are set by whatever sits in front of the server and can
/// be forged by a client talking to it directly. This is good enough to
/// slow down accidental resubmits, not to resist abuse.
pub fn client_id(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn limiter(capacity: usize) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            capacity,
            ..Default::default()
        })
    }

    #[test]
    fn test_sixth_request_in_window_is_denied() {
        let limiter = limiter(100);
        let start = Instant::now();
        for i in 0..5 {
            assert!(limiter.allow_at("1.2.3.4", start + Duration::from_secs(i)));
        }
        assert!(!limiter.allow_at("1.2.3.4", start + Duration::from_secs(10)));
        assert!(!limiter.allow_at("1.2.3.4", start + Duration::from_secs(299)));

        // Other clients have their own bucket
        assert!(limiter.allow_at("5.6.7.8", start + Duration::from_secs(10)));
    }

    #[test]
    fn test_window_expiry_resets_count() {
        let limiter = limiter(100);
        let start = Instant::now();
        for _ in 0..5 {
            assert!(limiter.allow_at("a", start));
        }
        assert!(!limiter.allow_at("a", start));

        let later = start + Duration::from_secs(5 * 60) + Duration::from_millis(1);
        assert!(limiter.allow_at("a", later));
        // Count restarted at 1 so four more fit
        for _ in 0..4 {
            assert!(limiter.allow_at("a", later));
        }
        assert!(!limiter.allow_at("a", later));
    }

    #[test]
    fn test_capacity_is_bounded() {
        let limiter = limiter(3);
        let start = Instant::now();
        for (i, key) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            assert!(limiter.allow_at(key, start + Duration::from_secs(i as u64)));
        }
        assert_eq!(limiter.len(), 3);
    }

    #[test]
    fn test_eviction_spares_live_windows_when_expired_ones_free_room() {
        let limiter = limiter(3);
        let start = Instant::now();
        assert!(limiter.allow_at("a", start));
        let busy = start + Duration::from_secs(200);
        for _ in 0..5 {
            assert!(limiter.allow_at("b", busy));
        }
        assert!(!limiter.allow_at("b", busy));
        assert!(limiter.allow_at("c", start + Duration::from_secs(201)));

        // "a" has expired, so making room for "d" only drops "a"
        let later = start + Duration::from_secs(301);
        assert!(limiter.allow_at("d", later));
        assert_eq!(limiter.len(), 3);
        assert!(!limiter.allow_at("b", later));
    }

    #[test]
    fn test_purge_expired() {
        let limiter = limiter(100);
        let start = Instant::now();
        limiter.allow_at("a", start);
        limiter.allow_at("b", start + Duration::from_secs(200));
        let removed = limiter.purge_expired(start + Duration::from_secs(301));
        assert_eq!(removed, 1);
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn test_client_id_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_id(&headers), UNKNOWN_CLIENT);

        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_id(&headers), "10.0.0.2");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" 203.0.113.7 , 10.0.0.1"),
        );
        assert_eq!(client_id(&headers), "203.0.113.7");
    }
}
