use snafu::Snafu;

use crate::Str;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LinkError {
  #[snafu(display("Failed to open {path} at {baud_rate} baud: {source}"))]
  Open { path: Str, baud_rate: u32, source: serialport::Error },

  #[snafu(display("Link failed during {op}: {source}"))]
  Io { op: &'static str, source: std::io::Error },
}

impl LinkError {
  pub fn is_open(&self) -> bool {
    matches!(self, Self::Open { .. })
  }
}
