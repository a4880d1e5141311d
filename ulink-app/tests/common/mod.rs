#![allow(dead_code)]

use core::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{self, ErrorKind, Write};
use std::rc::Rc;

use bytes::Bytes;
use snafu::ResultExt;
use ulink_app::clock::Clock;
use ulink_app::error::{IoSnafu, LinkError};
use ulink_app::link::Link;
use ulink_app::Durn;

/// Console sink the test keeps a handle to after the session is consumed.
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
  pub fn text(&self) -> String {
    String::from_utf8_lossy(&self.0.borrow()).into_owned()
  }

  pub fn lines_with(&self, prefix: &str) -> Vec<String> {
    self.text().lines().filter(|l| l.starts_with(prefix)).map(str::to_owned).collect()
  }
}

impl Write for SharedBuf {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.0.borrow_mut().extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

/// Advances by a fixed step every time it is read.
pub struct StepClock {
  now: Cell<Durn>,
  step: Durn,
}

impl StepClock {
  pub fn new(step: Durn) -> Self {
    Self { now: Cell::new(Durn::ZERO), step }
  }

  pub fn stopped() -> Self {
    Self::new(Durn::ZERO)
  }
}

impl Clock for StepClock {
  fn now(&self) -> Durn {
    let now = self.now.get();
    self.now.set(now + self.step);
    now
  }
}

pub enum Scripted {
  Line(Vec<u8>),
  Fail(ErrorKind),
  Panic,
}

/// Replays a fixed list of read results; an exhausted script reads empty.
pub struct ScriptedLink {
  replies: VecDeque<Scripted>,
  short_by: usize,
  fail_send_at: Option<usize>,
  sends: Rc<Cell<usize>>,
  closes: Rc<Cell<usize>>,
}

impl ScriptedLink {
  pub fn new(replies: impl IntoIterator<Item = Scripted>) -> Self {
    Self {
      replies: replies.into_iter().collect(),
      short_by: 0,
      fail_send_at: None,
      sends: Rc::default(),
      closes: Rc::default(),
    }
  }

  pub fn lines<I, B>(lines: I) -> Self
  where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
  {
    Self::new(lines.into_iter().map(|l| Scripted::Line(l.as_ref().to_vec())))
  }

  /// Every send accepts `n` bytes fewer than offered.
  pub fn short_by(mut self, n: usize) -> Self {
    self.short_by = n;
    self
  }

  /// The `n`th send (1-based, the initial one included) fails with a broken pipe.
  pub fn fail_send_at(mut self, n: usize) -> Self {
    self.fail_send_at = Some(n);
    self
  }

  pub fn sends(&self) -> Rc<Cell<usize>> {
    self.sends.clone()
  }

  pub fn closes(&self) -> Rc<Cell<usize>> {
    self.closes.clone()
  }
}

impl Link for ScriptedLink {
  fn send(&mut self, buf: &[u8]) -> Result<usize, LinkError> {
    let n = self.sends.get() + 1;
    self.sends.set(n);
    if self.fail_send_at == Some(n) {
      return Err(io::Error::from(ErrorKind::BrokenPipe)).context(IoSnafu { op: "send" });
    }
    Ok(buf.len().saturating_sub(self.short_by))
  }

  fn read_line(&mut self) -> Result<Bytes, LinkError> {
    match self.replies.pop_front() {
      None => Ok(Bytes::new()),
      Some(Scripted::Line(l)) => Ok(Bytes::from(l)),
      Some(Scripted::Fail(kind)) => Err(io::Error::from(kind)).context(IoSnafu { op: "read_line" }),
      Some(Scripted::Panic) => panic!("scripted fault"),
    }
  }

  fn close(&mut self) {
    self.closes.set(self.closes.get() + 1);
  }
}

/// Behaves like the ESP32 echo firmware: every received chunk is echoed
/// back and kept as the stored blob; once 1000 bytes have come in since the
/// last replay, the stored blob is sent back again.
pub struct EchoResponder {
  out: VecDeque<u8>,
  stored: Vec<u8>,
  total: usize,
  rounds_left: usize,
  closes: Rc<Cell<usize>>,
}

impl EchoResponder {
  pub const CHUNK: usize = 999;
  pub const REPLAY_AT: usize = 1000;

  /// Answers `rounds` sends, then ignores everything.
  pub fn new(rounds: usize) -> Self {
    Self {
      out: VecDeque::new(),
      stored: Vec::new(),
      total: 0,
      rounds_left: rounds,
      closes: Rc::default(),
    }
  }

  pub fn closes(&self) -> Rc<Cell<usize>> {
    self.closes.clone()
  }

  fn take_chunk(&mut self, chunk: &[u8]) {
    self.total += chunk.len();
    self.stored = chunk.to_vec();
    self.out.extend(chunk);
    if self.total >= Self::REPLAY_AT {
      self.out.extend(&self.stored);
      self.total = 0;
    }
  }
}

impl Link for EchoResponder {
  fn send(&mut self, buf: &[u8]) -> Result<usize, LinkError> {
    if self.rounds_left == 0 {
      return Ok(buf.len());
    }
    self.rounds_left -= 1;
    for chunk in buf.chunks(Self::CHUNK) {
      self.take_chunk(chunk);
    }
    Ok(buf.len())
  }

  fn read_line(&mut self) -> Result<Bytes, LinkError> {
    let end = match self.out.iter().position(|&b| b == b'\n') {
      Some(i) => i + 1,
      None => self.out.len(),
    };
    Ok(self.out.drain(..end).collect::<Vec<_>>().into())
  }

  fn close(&mut self) {
    self.closes.set(self.closes.get() + 1);
  }
}

pub fn secs(s: u64) -> Durn {
  Durn::from_secs(s)
}
