// ============================
// crates/backend-lib/src/auth/lockout.rs
// ============================
//! Per-account lockout with a sliding time window.
//!
//! Keyed by the submitted email. A key is LOCKED while it holds
//! `max_attempts` or more failed attempts younger than the window;
//! otherwise it is OPEN. The unlock anchor is the *oldest* surviving
//! attempt, so a lockout never lasts longer than one window from the
//! first offending attempt.
//!
//! State is process-local only; a restart clears all lockouts.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// Default number of failed attempts before lockout
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default sliding window length in minutes
pub const DEFAULT_WINDOW_MINUTES: u64 = 15;

/// One failed authentication attempt
#[derive(Debug, Clone)]
struct Attempt {
    at: DateTime<Utc>,
    #[allow(dead_code)]
    source_ip: String,
}

/// Tracks failed authentication attempts per identity key.
///
/// Explicitly constructed and shared via `Arc`; per-key mutation goes
/// through the map's entry API so concurrent requests on the same key
/// never lose attempts or observe a torn list.
pub struct AccountLockout {
    attempts: DashMap<String, Vec<Attempt>>,
    max_attempts: u32,
    window: Duration,
}

impl Default for AccountLockout {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_MINUTES)
    }
}

impl AccountLockout {
    /// Create a lockout store
    pub fn new(max_attempts: u32, window_minutes: u64) -> Self {
        Self {
            attempts: DashMap::new(),
            max_attempts,
            window: Duration::minutes(window_minutes as i64),
        }
    }

    /// Record a failed authentication attempt for a key
    pub fn record_failed_attempt(&self, key: &str, source_ip: &str) {
        self.record_failed_attempt_at(key, source_ip, Utc::now());
    }

    /// Check whether a key is locked.
    /// Returns `(locked, seconds_remaining)`; an OPEN key reports 0 seconds.
    pub fn is_locked(&self, key: &str) -> (bool, u64) {
        self.is_locked_at(key, Utc::now())
    }

    /// Clear all recorded attempts for a key (after successful login)
    pub fn reset(&self, key: &str) {
        self.attempts.remove(key);
    }

    /// Number of failed attempts still inside the window
    pub fn attempt_count(&self, key: &str) -> usize {
        let now = Utc::now();
        match self.attempts.get_mut(key) {
            Some(mut entry) => {
                Self::prune(&mut entry, now, self.window);
                entry.len()
            },
            None => 0,
        }
    }

    /// Drop every expired attempt and empty record.
    /// Returns the number of attempts removed; meant for a periodic sweep.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut removed = 0;
        self.attempts.retain(|_, attempts| {
            let before = attempts.len();
            attempts.retain(|a| now - a.at < self.window);
            removed += before - attempts.len();
            !attempts.is_empty()
        });
        removed
    }

    fn record_failed_attempt_at(&self, key: &str, source_ip: &str, now: DateTime<Utc>) {
        let mut entry = self.attempts.entry(key.to_string()).or_default();
        Self::prune(&mut entry, now, self.window);
        entry.push(Attempt {
            at: now,
            source_ip: source_ip.to_string(),
        });
    }

    fn is_locked_at(&self, key: &str, now: DateTime<Utc>) -> (bool, u64) {
        let Some(mut entry) = self.attempts.get_mut(key) else {
            return (false, 0);
        };
        Self::prune(&mut entry, now, self.window);

        if entry.len() < self.max_attempts as usize {
            return (false, 0);
        }

        // Entries are appended in order, so the first one is the oldest.
        let oldest = entry[0].at;
        let remaining = (oldest + self.window - now).num_seconds().max(0);
        (true, remaining as u64)
    }

    fn prune(attempts: &mut Vec<Attempt>, now: DateTime<Utc>, window: Duration) {
        attempts.retain(|a| now - a.at < window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const IP: &str = "192.168.1.1";

    #[test]
    fn test_open_until_threshold() {
        let lockout = AccountLockout::default();

        for _ in 0..4 {
            lockout.record_failed_attempt("john@example.com", IP);
            let (locked, remaining) = lockout.is_locked("john@example.com");
            assert!(!locked);
            assert_eq!(remaining, 0);
        }

        lockout.record_failed_attempt("john@example.com", IP);
        let (locked, remaining) = lockout.is_locked("john@example.com");
        assert!(locked);
        assert!(remaining > 0);
        assert!(remaining <= DEFAULT_WINDOW_MINUTES * 60);
    }

    #[test]
    fn test_reset_reopens_immediately() {
        let lockout = AccountLockout::default();

        for _ in 0..5 {
            lockout.record_failed_attempt("john@example.com", IP);
        }
        assert!(lockout.is_locked("john@example.com").0);

        lockout.reset("john@example.com");
        assert_eq!(lockout.is_locked("john@example.com"), (false, 0));
        assert_eq!(lockout.attempt_count("john@example.com"), 0);
    }

    #[test]
    fn test_reset_below_threshold() {
        let lockout = AccountLockout::default();
        for _ in 0..3 {
            lockout.record_failed_attempt("john@example.com", IP);
        }
        lockout.reset("john@example.com");
        assert_eq!(lockout.is_locked("john@example.com"), (false, 0));
    }

    #[test]
    fn test_expired_attempts_fall_out_of_window() {
        let lockout = AccountLockout::default();
        let now = Utc::now();
        let stale = now - Duration::minutes(16);

        // Three stale attempts plus two fresh ones: only the fresh count
        for _ in 0..3 {
            lockout.record_failed_attempt_at("john@example.com", IP, stale);
        }
        for _ in 0..2 {
            lockout.record_failed_attempt_at("john@example.com", IP, now);
        }

        assert_eq!(lockout.attempt_count("john@example.com"), 2);
        assert!(!lockout.is_locked("john@example.com").0);
    }

    #[test]
    fn test_lockout_expires_after_window() {
        let lockout = AccountLockout::default();
        let past = Utc::now() - Duration::minutes(20);

        for _ in 0..5 {
            lockout.record_failed_attempt_at("john@example.com", IP, past);
        }

        // All five attempts are outside the window by now
        assert_eq!(lockout.is_locked("john@example.com"), (false, 0));
    }

    #[test]
    fn test_unlock_anchored_to_oldest_attempt() {
        let lockout = AccountLockout::default();
        let now = Utc::now();
        let first = now - Duration::minutes(10);

        lockout.record_failed_attempt_at("john@example.com", IP, first);
        for _ in 0..4 {
            lockout.record_failed_attempt_at("john@example.com", IP, now);
        }

        let (locked, remaining) = lockout.is_locked_at("john@example.com", now);
        assert!(locked);
        // Window anchored to the 10-minute-old attempt: ~5 minutes remain,
        // not a fresh 15 from the latest failure.
        assert!(remaining <= 5 * 60);
        assert!(remaining > 4 * 60);
    }

    #[test]
    fn test_keys_tracked_independently() {
        let lockout = AccountLockout::default();
        for _ in 0..5 {
            lockout.record_failed_attempt("victim@example.com", IP);
        }
        assert!(lockout.is_locked("victim@example.com").0);
        assert!(!lockout.is_locked("other@example.com").0);
    }

    #[test]
    fn test_custom_threshold() {
        let lockout = AccountLockout::new(2, 15);
        lockout.record_failed_attempt("john@example.com", IP);
        assert!(!lockout.is_locked("john@example.com").0);
        lockout.record_failed_attempt("john@example.com", IP);
        assert!(lockout.is_locked("john@example.com").0);
    }

    #[test]
    fn test_purge_expired() {
        let lockout = AccountLockout::default();
        let stale = Utc::now() - Duration::minutes(30);

        for _ in 0..4 {
            lockout.record_failed_attempt_at("a@example.com", IP, stale);
        }
        lockout.record_failed_attempt("b@example.com", IP);

        let removed = lockout.purge_expired();
        assert_eq!(removed, 4);
        assert_eq!(lockout.attempt_count("a@example.com"), 0);
        assert_eq!(lockout.attempt_count("b@example.com"), 1);
    }

    #[test]
    fn test_concurrent_attempts_are_not_lost() {
        let lockout = Arc::new(AccountLockout::new(1000, 15));
        let mut handles = Vec::new();

        for _ in 0..8 {
            let lockout = Arc::clone(&lockout);
            handles.push(std::thread::spawn(move || {
                for _ in 0..50 {
                    lockout.record_failed_attempt("john@example.com", IP);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(lockout.attempt_count("john@example.com"), 400);
    }
}
