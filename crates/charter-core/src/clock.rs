//! Clock abstraction.
//!
//! Two workflow guards are time-gated (the contact-confirmation deadline and
//! the defense start gate), so stores take the clock as an explicit
//! collaborator rather than calling `Utc::now()` inline.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// A clock that only moves when told to. Used by tests that exercise
/// deadline and defense-start guards.
#[derive(Debug)]
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
  pub fn at(instant: DateTime<Utc>) -> Self {
    Self(Mutex::new(instant))
  }

  pub fn set(&self, instant: DateTime<Utc>) {
    *self.0.lock().expect("clock lock poisoned") = instant;
  }

  pub fn advance(&self, by: Duration) {
    let mut guard = self.0.lock().expect("clock lock poisoned");
    *guard += by;
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    *self.0.lock().expect("clock lock poisoned")
  }
}
