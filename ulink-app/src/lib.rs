pub use core::fmt::Debug as Dbg;
pub use core::option::Option as Opt;
pub use core::time::Duration as Durn;
pub use snafu::whatever as we;
use std::error::Error;
pub use std::format as f;
pub use std::string::String as Str;

pub mod clock;
pub mod error;
pub mod link;
pub mod logger;
pub mod meter;
pub mod reply;
pub mod session;
pub mod window;

pub type Rst<T, E = snafu::Whatever> = Result<T, E>;

#[cfg(windows)]
pub const SP_PATH: &str = "COM3";
#[cfg(not(windows))]
pub const SP_PATH: &str = "/dev/ttyUSB0";
pub const SP_BAUD_RATE: u32 = 2400;
/// How long one read poll waits before the driver polls again.
pub const SP_POLL_TIMEOUT: Durn = Durn::from_secs(1);
pub const RATE_WINDOW_LEN: usize = 10;
pub const LINE_TERMINATOR: u8 = b'\n';

pub const PAYLOAD: &str = "Finance Minister Arun Jaitley Tuesday hit out at former RBI governor 
Raghuram Rajan for predicting that the next banking crisis would be triggered by 
MSME lending, saying postmortem is easier than taking action when it was required. 
Rajan, who had as the chief economist at IMF warned of impending financial crisis of 
2008, in a note to a parliamentary committee warned against ambitious credit targets 
and loan waivers, saying that they could be the sources of the next banking crisis. 
Government should focus on sources of the next crisis, not just the last one. 
In particular, government should refrain from setting ambitious credit targets or 
waiving loans. Credit targets are sometimes achieved by abandoning appropriate 
due diligence, creating the environment for future NPAs,\" Rajan said in the note.\" 
Both MUDRA loans as well as the Kisan Credit Card, while popular, have to be examined 
more closely for potential credit risk. Rajan, who was RBI governor for three years 
till September 2016, is currently.";

#[inline]
pub fn mk_err_str(e: impl Error, desc: &str) -> Str {
  f!("{}: {e:?}; {desc}", core::any::type_name_of_val(&e))
}
