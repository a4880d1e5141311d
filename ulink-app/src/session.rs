use std::io::Write;

use bytes::Bytes;
use tracing::{debug, info, instrument, trace, warn};

use crate::clock::Clock;
use crate::error::LinkError;
use crate::link::Link;
use crate::meter::{RateMeter, Sample};
use crate::reply::Reply;
use crate::window::RateWindow;
use crate::{mk_err_str, Dbg};

/// Outcome of one `Link::send`.
#[derive(Clone, Copy, Dbg, PartialEq, Eq)]
pub struct SendReport {
  pub written: usize,
  pub expected: usize,
}

impl SendReport {
  pub fn is_partial(&self) -> bool {
    self.written != self.expected
  }
}

#[derive(Clone, Copy, Dbg, Default, PartialEq, Eq)]
pub struct Stats {
  pub iterations: u64,
  pub sent_bytes: u64,
  pub received_bytes: u64,
  pub partial_writes: u64,
  pub decode_failures: u64,
  pub deferred_samples: u64,
}

#[derive(Clone, Copy, Dbg, PartialEq, Eq)]
pub enum Step {
  Continue,
  Stop,
}

/// Drives one exchange session over a link it owns. The link is closed when
/// the session is dropped, whichever way `run` ends.
pub struct Session<L: Link, C: Clock, W: Write> {
  link: L,
  clock: C,
  console: W,
  payload: Bytes,
  meter: RateMeter,
  stats: Stats,
}

impl<L: Link, C: Clock, W: Write> Session<L, C, W> {
  pub fn new(link: L, clock: C, console: W, payload: Bytes) -> Self {
    Self::with_window(link, clock, console, payload, RateWindow::default())
  }

  pub fn with_window(link: L, clock: C, console: W, payload: Bytes, window: RateWindow) -> Self {
    let meter = RateMeter::new(window, clock.now());
    Self { link, clock, console, payload, meter, stats: Stats::default() }
  }

  pub fn stats(&self) -> Stats {
    self.stats
  }

  pub fn meter(&self) -> &RateMeter {
    &self.meter
  }

  /// Initial send, then iterate until the remote goes silent or the link fails.
  #[instrument(skip_all)]
  pub fn run(mut self) -> Result<Stats, LinkError> {
    match self.exchange() {
      Ok(()) => {
        info!(stats = ?self.stats, "Session finished.");
        Ok(self.stats)
      }
      Err(e) => {
        self.say(format_args!("Serial port error: {e}"));
        warn!(stats = ?self.stats, error = %e, "Session ended by link failure!");
        Err(e)
      }
    }
  }

  fn exchange(&mut self) -> Result<(), LinkError> {
    let first = self.send_payload()?;
    if !first.is_partial() {
      self.say(format_args!("Successfully wrote {} bytes.", first.written));
    }
    self.meter.restart(self.clock.now());

    while self.step()? == Step::Continue {}
    Ok(())
  }

  /// Writes the payload once; a short write is reported and otherwise ignored.
  pub fn send_payload(&mut self) -> Result<SendReport, LinkError> {
    let written = self.link.send(&self.payload)?;
    let report = SendReport { written, expected: self.payload.len() };
    self.stats.sent_bytes += written as u64;
    if report.is_partial() {
      self.stats.partial_writes += 1;
      self.say(format_args!(
        "Error: Failed to write all bytes. Wrote {} out of {} bytes.",
        report.written, report.expected
      ));
      warn!(report = ?report, "Partial write.");
    } else {
      trace!(written = written, "Sent payload.");
    }
    Ok(report)
  }

  pub fn step(&mut self) -> Result<Step, LinkError> {
    self.send_payload()?;
    let raw = self.link.read_line()?;
    let now = self.clock.now();
    self.stats.iterations += 1;

    let reply = Reply::decode(raw);
    match reply {
      Reply::Silent => {
        info!(iterations = self.stats.iterations, "Remote stopped responding.");
        Ok(Step::Stop)
      }
      Reply::Undecodable { error, .. } => {
        self.stats.decode_failures += 1;
        let hex = reply.raw_hex();
        self.say(format_args!("Decoding error. Raw data: {hex}"));
        warn!(raw = %hex, "{}", mk_err_str(error, "Failed to decode response!"));
        Ok(Step::Continue)
      }
      Reply::Text { text, raw } => {
        self.stats.received_bytes += raw.len() as u64;
        let shown = text.trim_end_matches(['\r', '\n']);
        self.say(format_args!("response received from MCU : {shown}"));
        match self.meter.record(raw.len(), now) {
          Sample::Measured(m) => {
            self.say(format_args!("Instantaneous Rate: {:.2} bytes/s", m.rate));
            self.say(format_args!("Average Rate: {:.2} bytes/s", m.average));
            debug!(measurement = ?m, "Measured.");
          }
          Sample::Deferred { pending } => {
            self.stats.deferred_samples += 1;
            self.say(format_args!("Rate sample deferred: zero elapsed time."));
            debug!(pending = pending, "Deferred sample.");
          }
        }
        Ok(Step::Continue)
      }
    }
  }

  fn say(&mut self, line: core::fmt::Arguments<'_>) {
    if let Err(e) = writeln!(self.console, "{line}") {
      warn!("{}", mk_err_str(e, "Failed to write to console!"));
    }
  }
}

impl<L: Link, C: Clock, W: Write> Drop for Session<L, C, W> {
  fn drop(&mut self) {
    self.link.close();
    if let Err(e) = self.console.flush() {
      warn!("{}", mk_err_str(e, "Failed to flush console!"));
    }
  }
}
