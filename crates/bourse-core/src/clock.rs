//! Time sources.
//!
//! The engine stamps every mutation with a single `now()` reading, so all
//! products touched by one decay tick share one timestamp.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};

pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// A clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
  now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
  pub fn new(start: DateTime<Utc>) -> Self {
    Self { now: Arc::new(Mutex::new(start)) }
  }

  pub fn set(&self, at: DateTime<Utc>) {
    *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
  }

  pub fn advance(&self, by: TimeDelta) {
    let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
    *now += by;
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    *self.now.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

/// Exposes when the periodic decay trigger fires next.
pub trait TickSchedule: Send + Sync {
  /// `None` once the trigger has been shut down.
  fn next_run_time(&self) -> Option<DateTime<Utc>>;
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn manual_clock_clones_share_time() {
    let start = Utc.with_ymd_and_hms(2025, 6, 21, 20, 0, 0).unwrap();
    let clock = ManualClock::new(start);
    let other = clock.clone();

    other.advance(TimeDelta::minutes(2));
    assert_eq!(clock.now(), start + TimeDelta::minutes(2));

    clock.set(start);
    assert_eq!(other.now(), start);
  }
}
