use std::time::Instant;

use crate::Durn;

pub trait Clock {
  /// Time elapsed since the clock's origin.
  fn now(&self) -> Durn;
}

#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
  origin: Instant,
}

impl Default for MonotonicClock {
  fn default() -> Self {
    Self { origin: Instant::now() }
  }
}

impl Clock for MonotonicClock {
  fn now(&self) -> Durn {
    self.origin.elapsed()
  }
}
