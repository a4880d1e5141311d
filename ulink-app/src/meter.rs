use crate::window::RateWindow;
use crate::Durn;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
  pub bytes: usize,
  pub elapsed: Durn,
  /// Bytes per second over `elapsed`.
  pub rate: f64,
  /// Mean of the window after `rate` was pushed.
  pub average: f64,
  pub window_len: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sample {
  Measured(Measurement),
  /// No time passed since the previous mark; the bytes wait for the next one.
  Deferred { pending: usize },
}

/// Turns per-iteration byte counts into instantaneous and rolling rates.
#[derive(Clone, Debug)]
pub struct RateMeter {
  window: RateWindow,
  mark: Durn,
  pending: usize,
}

impl RateMeter {
  pub fn new(window: RateWindow, start: Durn) -> Self {
    Self { window, mark: start, pending: 0 }
  }

  pub fn record(&mut self, bytes: usize, now: Durn) -> Sample {
    self.pending += bytes;
    let elapsed = now.saturating_sub(self.mark);
    if elapsed.is_zero() {
      return Sample::Deferred { pending: self.pending };
    }

    let rate = self.pending as f64 / elapsed.as_secs_f64();
    self.window.push(rate);
    let m = Measurement {
      bytes: self.pending,
      elapsed,
      rate,
      average: self.window.mean().unwrap_or(rate),
      window_len: self.window.len(),
    };
    self.mark = now;
    self.pending = 0;
    Sample::Measured(m)
  }

  /// Moves the mark to `now` and drops pending bytes; the window is kept.
  pub fn restart(&mut self, now: Durn) {
    self.mark = now;
    self.pending = 0;
  }

  pub fn window(&self) -> &RateWindow {
    &self.window
  }
}
