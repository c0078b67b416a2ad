//! Caching Discovery Proxy
//!
//! [`CachedDiscovery`] fronts any [`EnvironmentDiscovery`] with a
//! time-to-live cache. One mutex guards the cached entry and is held across
//! a refresh, so:
//! - At most one backing discovery runs at a time per proxy
//! - Callers arriving during a refresh wait and then see its outcome
//! - A failed refresh leaves the previous entry in place, already expired,
//!   so the next call retries
//!
//! Time comes from an injected [`Clock`].

use crate::discovery::EnvironmentDiscovery;
use crate::error::DiscoveryResult;
use parking_lot::Mutex;
use srd_model::Environment;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic time
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// [`Instant::now`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    /// Create a clock reading the current instant
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a clock reading `start`
    #[must_use]
    pub fn starting_at(start: Instant) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward by `by`
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// A discovered Environment and the instant it stops being served
#[derive(Debug, Clone)]
pub struct CachedEnvironment {
    pub environment: Arc<Environment>,
    pub expires_at: Instant,
}

impl CachedEnvironment {
    /// Whether the entry has expired at `now`
    #[inline]
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// TTL cache in front of a backing discovery
#[derive(Debug)]
pub struct CachedDiscovery<D, C = SystemClock> {
    backing: D,
    clock: C,
    ttl: Duration,
    entry: Mutex<Option<CachedEnvironment>>,
}

impl<D: EnvironmentDiscovery> CachedDiscovery<D> {
    /// Cache `backing` for `ttl` using the system clock
    pub fn new(backing: D, ttl: Duration) -> Self {
        Self::with_clock(backing, ttl, SystemClock)
    }
}

impl<D: EnvironmentDiscovery, C: Clock> CachedDiscovery<D, C> {
    /// Cache `backing` for `ttl` using `clock`
    pub fn with_clock(backing: D, ttl: Duration, clock: C) -> Self {
        Self {
            backing,
            clock,
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Time-to-live of a refreshed entry
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Backing discovery
    #[inline]
    #[must_use]
    pub fn backing(&self) -> &D {
        &self.backing
    }

    /// Current entry, expired or not, without refreshing
    #[must_use]
    pub fn peek(&self) -> Option<CachedEnvironment> {
        self.entry.lock().clone()
    }

    /// Cached Environment, refreshing it first if absent or expired
    ///
    /// # Errors
    /// Propagates the backing discovery error unchanged; the cached entry is
    /// left as it was.
    pub fn get_or_discover(&self) -> DiscoveryResult<CachedEnvironment> {
        let mut entry = self.entry.lock();

        if let Some(cached) = entry.as_ref() {
            if !cached.is_expired(self.clock.now()) {
                tracing::debug!("serving cached environment");
                return Ok(cached.clone());
            }
        }

        let environment = self.backing.discover_environment().inspect_err(|e| {
            tracing::warn!(error = %e, stale = entry.is_some(), "environment refresh failed");
        })?;

        let now = self.clock.now();
        let expires_at = now.checked_add(self.ttl).unwrap_or_else(|| {
            tracing::warn!(ttl = ?self.ttl, "cache ttl out of clock range, entry expires immediately");
            now
        });
        let refreshed = CachedEnvironment {
            environment: Arc::new(environment),
            expires_at,
        };
        *entry = Some(refreshed.clone());
        tracing::info!(ttl = ?self.ttl, "environment cache refreshed");
        Ok(refreshed)
    }
}

impl<D: EnvironmentDiscovery, C: Clock> EnvironmentDiscovery for CachedDiscovery<D, C> {
    fn discover_environment(&self) -> DiscoveryResult<Environment> {
        let cached = self.get_or_discover()?;
        Ok(Arc::unwrap_or_clone(cached.environment))
    }
}
