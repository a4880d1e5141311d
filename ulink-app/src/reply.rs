use core::str::Utf8Error;

use bytes::Bytes;

use crate::Str;

/// What one read produced once decoded as UTF-8.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
  Text { text: Str, raw: Bytes },
  Undecodable { raw: Bytes, error: Utf8Error },
  /// Nothing arrived; the remote stopped responding.
  Silent,
}

impl Reply {
  pub fn decode(raw: Bytes) -> Self {
    if raw.is_empty() {
      return Self::Silent;
    }
    match core::str::from_utf8(&raw).map(Str::from) {
      Ok(text) => Self::Text { text, raw },
      Err(error) => Self::Undecodable { raw, error },
    }
  }

  pub fn raw(&self) -> &[u8] {
    match self {
      Self::Text { raw, .. } | Self::Undecodable { raw, .. } => raw,
      Self::Silent => &[],
    }
  }

  pub fn raw_hex(&self) -> Str {
    const_hex::encode(self.raw())
  }
}
