//! Time sources. The engine never reads wall-clock time directly; every
//! operator captures `now()` exactly once at entry.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Monotonically non-decreasing time source.
pub trait IClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock source. Successive reads are pinned to be non-decreasing even
/// if the underlying system clock steps backwards.
#[derive(Debug)]
pub struct SystemClock {
    last: Mutex<DateTime<Utc>>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(Utc::now()),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl IClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let mut last = self.last.lock().expect("clock mutex poisoned");
        let wall = Utc::now();
        if wall > *last {
            *last = wall;
        }
        *last
    }
}

/// Test clock with explicit advancement. Interior mutability lets tests keep
/// a shared handle while the engine holds the same clock.
#[derive(Debug)]
pub struct MockClock {
    current: Mutex<DateTime<Utc>>,
}

impl MockClock {
    /// Start at the given instant.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Start at the Unix epoch.
    pub fn new() -> Self {
        Self::starting_at(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock().expect("clock mutex poisoned");
        *current += by;
    }

    /// Jump to an explicit instant.
    pub fn set(&self, to: DateTime<Utc>) {
        let mut current = self.current.lock().expect("clock mutex poisoned");
        *current = to;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl IClock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().expect("clock mutex poisoned")
    }
}
