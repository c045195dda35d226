//! In-process caches: the staleness window and the memoized project list

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Remembers when the local clone was last compared with the remote head.
///
/// Only a positive ("up to date") result is trusted, and only for
/// `check_interval` after the check started. A negative or failed check is
/// never served from the cache, but it still moves `last_checked`.
#[derive(Debug, Clone)]
pub struct StalenessCache {
    last_checked: Option<Instant>,
    last_up_to_date: bool,
    check_interval: Duration,
}

impl StalenessCache {
    pub fn new(check_interval: Duration) -> Self {
        Self {
            last_checked: None,
            last_up_to_date: false,
            check_interval,
        }
    }

    pub fn last_checked(&self) -> Option<Instant> {
        self.last_checked
    }

    /// Whether a positive result computed within the interval is on record.
    pub fn is_fresh(&self, now: Instant) -> bool {
        self.last_up_to_date
            && self
                .last_checked
                .is_some_and(|checked| now.saturating_duration_since(checked) < self.check_interval)
    }

    /// Stamp the start of a real check. Clears any previous positive result.
    pub fn begin_check(&mut self, now: Instant) {
        self.last_checked = Some(now);
        self.last_up_to_date = false;
    }

    /// Record the outcome of the check started by [`begin_check`](Self::begin_check).
    pub fn record(&mut self, up_to_date: bool) {
        self.last_up_to_date = up_to_date;
    }
}

/// A single memoized value, filled by the first successful computation.
///
/// There is no key: once set, every caller gets the stored value no matter
/// what arguments led to the call.
#[derive(Debug, Clone)]
pub struct Memo<T> {
    value: Arc<Mutex<Option<T>>>,
}

impl<T: Clone> Memo<T> {
    pub fn new() -> Self {
        Self {
            value: Arc::new(Mutex::new(None)),
        }
    }

    /// Return the stored value, or run `compute` and store its success.
    ///
    /// Failures are returned without being stored, so the next call
    /// computes again. The lock is held while computing so concurrent
    /// callers never compute twice.
    pub fn get_or_compute<F>(&self, compute: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let mut value = self.value.lock().map_err(|_| Error::LockPoisoned {
            context: "memoized value".to_string(),
        })?;
        if let Some(cached) = value.as_ref() {
            return Ok(cached.clone());
        }

        let computed = compute()?;
        *value = Some(computed.clone());
        Ok(computed)
    }

    /// Get the stored value without computing
    #[cfg(test)]
    pub fn get(&self) -> Result<Option<T>> {
        let value = self.value.lock().map_err(|_| Error::LockPoisoned {
            context: "memoized value".to_string(),
        })?;
        Ok(value.clone())
    }

    /// Forget the stored value
    #[cfg(test)]
    pub fn clear(&self) -> Result<()> {
        let mut value = self.value.lock().map_err(|_| Error::LockPoisoned {
            context: "memoized value".to_string(),
        })?;
        *value = None;
        Ok(())
    }
}

impl<T: Clone> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}
