//! Cache Entry Module
//!
//! Defines individual cache entries with absolute and sliding expiration.

use std::time::Duration;

use crate::cache::clock::duration_ms;

/// Upper bound on the default sliding window.
pub const MAX_DEFAULT_SLIDING: Duration = Duration::from_secs(30 * 60);

// == Entry Options ==
/// Expiration policy applied when an entry is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryOptions {
    /// Absolute lifetime, measured from the moment of `set`
    pub ttl: Duration,
    /// Inactivity window, reset on every live read. `None` disables sliding expiry.
    pub sliding: Option<Duration>,
}

impl EntryOptions {
    pub const fn new(ttl: Duration, sliding: Option<Duration>) -> Self {
        Self { ttl, sliding }
    }

    /// Absolute expiry only.
    pub const fn absolute(ttl: Duration) -> Self {
        Self { ttl, sliding: None }
    }

    /// Applies the caller-side sliding policy: `min(ttl / 2, 30 minutes)`.
    pub fn with_default_sliding(ttl: Duration) -> Self {
        Self {
            ttl,
            sliding: Some(default_sliding_window(ttl)),
        }
    }
}

/// Sliding window used when a caller does not pick one explicitly.
pub fn default_sliding_window(ttl: Duration) -> Duration {
    (ttl / 2).min(MAX_DEFAULT_SLIDING)
}

// == Cache Entry ==
/// A single stored value plus its expiry bookkeeping.
///
/// All timestamps are Unix milliseconds taken from the store's clock.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value, opaque to the cache
    pub value: V,
    /// Creation timestamp
    pub created_at: u64,
    /// Absolute deadline; the entry is dead once `now >= expires_at`
    pub expires_at: u64,
    /// Sliding window in milliseconds, if any
    pub sliding_window: Option<u64>,
    /// Last live read (or the creation time if never read)
    pub last_access: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry stored at `now` under the given policy.
    pub fn new(value: V, now: u64, options: EntryOptions) -> Self {
        Self {
            value,
            created_at: now,
            expires_at: now.saturating_add(duration_ms(options.ttl)),
            sliding_window: options.sliding.map(duration_ms),
            last_access: now,
        }
    }

    // == Liveness ==
    /// Returns true iff the entry is still live at `now`.
    ///
    /// Live means `now < expires_at` and, when a sliding window is set,
    /// `now - last_access < sliding_window`. Both bounds are exclusive, so an
    /// entry is dead at the exact instant its TTL fully elapses.
    pub fn is_live(&self, now: u64) -> bool {
        if now >= self.expires_at {
            return false;
        }
        match self.sliding_window {
            Some(window) => now.saturating_sub(self.last_access) < window,
            None => true,
        }
    }

    /// Resets the sliding clock.
    pub fn touch(&mut self, now: u64) {
        self.last_access = now;
    }

    // == Time To Live ==
    /// Milliseconds until the entry dies, whichever deadline comes first.
    ///
    /// Returns 0 once the entry is no longer live.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        if !self.is_live(now) {
            return 0;
        }
        let absolute = self.expires_at - now;
        match self.sliding_window {
            Some(window) => absolute.min(self.last_access.saturating_add(window) - now),
            None => absolute,
        }
    }
}
