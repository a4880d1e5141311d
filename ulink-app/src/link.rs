use std::io::{self, BufRead, BufReader, ErrorKind, Write};

use bytes::Bytes;
use serialport::{ClearBuffer, SerialPort, SerialPortInfo, SerialPortType};
use snafu::ResultExt;
use tracing::{debug, info, trace, warn};

use crate::error::{IoSnafu, LinkError, OpenSnafu};
use crate::{f, mk_err_str, Durn, Opt, Str, LINE_TERMINATOR};

/// A blocking byte-stream to the remote device.
pub trait Link {
  /// Blocks until the transport accepts some of `buf` and returns how many
  /// bytes it took.
  fn send(&mut self, buf: &[u8]) -> Result<usize, LinkError>;

  /// Blocks until a full line (terminator included) arrives. An empty result
  /// means the remote stopped responding.
  fn read_line(&mut self) -> Result<Bytes, LinkError>;

  /// Releases the transport. Called exactly once by the owning session.
  fn close(&mut self);
}

pub struct SerialLink {
  path: Str,
  sp: Opt<BufReader<Box<dyn SerialPort>>>,
}

impl SerialLink {
  pub fn open(path: &str, baud_rate: u32, poll: Durn) -> Result<Self, LinkError> {
    let sp = serialport::new(path, baud_rate)
      .timeout(poll)
      .open()
      .context(OpenSnafu { path, baud_rate })?;
    info!(path = path, baud_rate = baud_rate, "Successfully opened sp.");
    Ok(Self { path: path.into(), sp: Some(BufReader::new(sp)) })
  }

  fn port(&mut self, op: &'static str) -> Result<&mut BufReader<Box<dyn SerialPort>>, LinkError> {
    self.sp.as_mut().ok_or_else(|| io::Error::from(ErrorKind::NotConnected)).context(IoSnafu { op })
  }
}

impl Link for SerialLink {
  fn send(&mut self, buf: &[u8]) -> Result<usize, LinkError> {
    let sp = self.port("send")?.get_mut();
    let num = loop {
      match sp.write(buf) {
        Ok(num) => break num,
        // The OS buffer is full until the wire drains it; keep waiting.
        Err(e) if e.kind() == ErrorKind::TimedOut => continue,
        Err(e) => return Err(e).context(IoSnafu { op: "send" }),
      }
    };
    trace!(num = num, len = buf.len(), "Sent payload.");
    Ok(num)
  }

  fn read_line(&mut self) -> Result<Bytes, LinkError> {
    let sp = self.port("read_line")?;
    let mut line = Vec::new();
    loop {
      match sp.read_until(LINE_TERMINATOR, &mut line) {
        Ok(_) => break,
        // A poll timeout is not the end of the line, the read stays blocking.
        Err(e) if e.kind() == ErrorKind::TimedOut => continue,
        Err(e) => return Err(e).context(IoSnafu { op: "read_line" }),
      }
    }
    trace!(num = line.len(), "Read line.");
    Ok(Bytes::from(line))
  }

  fn close(&mut self) {
    let Some(mut sp) = self.sp.take() else {
      return;
    };
    // Unsent output is dropped rather than drained at the line rate.
    if let Err(e) = sp.get_mut().clear(ClearBuffer::Output) {
      warn!(path = %self.path, "{}", mk_err_str(e, "Failed to clear sp output before closing!"));
    }
    drop(sp);
    info!(path = %self.path, "Closed sp.");
  }
}

/// Names of the serial ports the OS reports, formatted for logs.
pub fn available_ports() -> Vec<Str> {
  match serialport::available_ports() {
    Ok(all_sps) => {
      debug!(all_sps = ?all_sps, "Got available serial ports.");
      all_sps.iter().map(describe_port).collect()
    }
    Err(e) => {
      warn!("{}", mk_err_str(e, "Failed to get serial ports!"));
      Vec::new()
    }
  }
}

fn describe_port(sp: &SerialPortInfo) -> Str {
  if let SerialPortType::UsbPort(_) = sp.port_type {
    f!("{} UsbPort", sp.port_name)
  } else {
    f!("{} {:?}", sp.port_name, sp.port_type)
  }
}
