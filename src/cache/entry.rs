//! Cache Entry Module
//!
//! Defines TTLs, expiry deadlines and the individual cache entry.

use std::time::{Duration, Instant};

use crate::error::{ProxyError, Result};

// == Ttl ==
/// Time-to-live for a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Expires once the duration has elapsed
    Finite(Duration),
    /// Never expires
    Infinite,
}

impl Ttl {
    /// Shorthand for a finite TTL in milliseconds.
    pub fn from_millis(ms: u64) -> Self {
        Ttl::Finite(Duration::from_millis(ms))
    }

    /// Rejects a zero-length TTL.
    pub fn validate(self) -> Result<Self> {
        match self {
            Ttl::Finite(d) if d.is_zero() => Err(ProxyError::InvalidTtl),
            ttl => Ok(ttl),
        }
    }

    /// Computes the expiry deadline for an entry stored at `now`.
    ///
    /// A deadline that would overflow the clock is treated as never expiring.
    pub fn expiry_from(self, now: Instant) -> Expiry {
        match self {
            Ttl::Finite(d) => now.checked_add(d).map_or(Expiry::Never, Expiry::At),
            Ttl::Infinite => Expiry::Never,
        }
    }
}

// == Expiry ==
/// Expiration deadline of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    At(Instant),
    Never,
}

impl Expiry {
    /// Checks whether the deadline has passed as of `now`.
    ///
    /// Boundary condition: an entry whose deadline equals `now` is expired.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self {
            Expiry::At(deadline) => *deadline <= now,
            Expiry::Never => false,
        }
    }

    /// Remaining lifetime as of `now`, `None` when the entry never expires.
    pub fn remaining_at(&self, now: Instant) -> Option<Duration> {
        match self {
            Expiry::At(deadline) => Some(deadline.saturating_duration_since(now)),
            Expiry::Never => None,
        }
    }
}

// == Cache Entry ==
/// A single stored value and its expiry deadline.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the entry stops being served
    pub expires_at: Expiry,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry stored at `now` with the given TTL.
    pub fn new(value: V, ttl: Ttl, now: Instant) -> Self {
        Self {
            value,
            expires_at: ttl.expiry_from(now),
        }
    }

    // == Is Expired ==
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_expired_at(now)
    }
}
