use std::collections::VecDeque;

use crate::RATE_WINDOW_LEN;

/// The most recent throughput samples, oldest evicted first.
#[derive(Clone, Debug, PartialEq)]
pub struct RateWindow {
  cap: usize,
  samples: VecDeque<f64>,
}

impl Default for RateWindow {
  fn default() -> Self {
    Self::new(RATE_WINDOW_LEN)
  }
}

impl RateWindow {
  pub fn new(cap: usize) -> Self {
    let cap = cap.max(1);
    Self { cap, samples: VecDeque::with_capacity(cap) }
  }

  pub fn push(&mut self, sample: f64) {
    if self.samples.len() == self.cap {
      self.samples.pop_front();
    }
    self.samples.push_back(sample);
  }

  /// Arithmetic mean of the held samples, `None` before the first push.
  pub fn mean(&self) -> Option<f64> {
    if self.samples.is_empty() {
      return None;
    }
    Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
  }

  pub fn cap(&self) -> usize {
    self.cap
  }

  pub fn len(&self) -> usize {
    self.samples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &f64> + '_ {
    self.samples.iter()
  }
}
