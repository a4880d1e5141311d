use std::path::Path;

use tracing_appender::non_blocking as non_blk;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::{self, time::ChronoLocal};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{mk_err_str, we, Dbg, Opt, Rst, Str};

pub const ENV_LOG_DIR: &str = "ULINK_LOG_DIR";
pub const ENV_DIS_LOG_FILE: &str = "ULINK_DIS_LOG_FILE";
pub const ENV_ENBL_LOG_CNSL: &str = "ULINK_ENBL_LOG_CNSL";
pub const DEFAULT_LOG_DIR: &str = "./log";

/// Where tracing output goes. Both sinks write through non-blocking workers.
#[derive(Clone, Dbg, PartialEq, Eq)]
pub struct Config {
  log_dir: Str,
  log_to_file: bool,
  log_to_cnsl: bool,
}

/// Keeps the non-blocking writers flushing. Must outlive every log call.
pub type Guards = (Opt<WorkerGuard>, Opt<WorkerGuard>);

impl Config {
  const LOG_PREFIX: &'static str =
    concat!(env!("CARGO_PKG_NAME"), '-', env!("CARGO_PKG_VERSION"), '-');

  pub fn new(log_dir: impl Into<Str>, log_to_file: bool, log_to_cnsl: bool) -> Self {
    Self { log_dir: log_dir.into(), log_to_file, log_to_cnsl }
  }

  pub fn from_env() -> Self {
    Self::from_lookup(|k| std::env::var(k).ok())
  }

  /// Builds the config from any key lookup; presence of the toggles matters,
  /// not their value.
  pub fn from_lookup(lookup: impl Fn(&str) -> Opt<Str>) -> Self {
    let log_dir = lookup(ENV_LOG_DIR).unwrap_or_else(|| DEFAULT_LOG_DIR.into());
    let log_to_file = lookup(ENV_DIS_LOG_FILE).is_none();
    let log_to_cnsl = lookup(ENV_ENBL_LOG_CNSL).is_some();
    Self::new(log_dir, log_to_file, log_to_cnsl)
  }

  pub fn log_dir(&self) -> &str {
    &self.log_dir
  }

  pub fn log_to_file(&self) -> bool {
    self.log_to_file
  }

  pub fn log_to_cnsl(&self) -> bool {
    self.log_to_cnsl
  }

  pub async fn init(&self) -> Rst<Guards> {
    let mut layers = Vec::new();
    let file_guard = if self.log_to_file {
      if let Err(e) = tokio::fs::create_dir_all(Path::new(&self.log_dir)).await {
        we!("{} conf={self:?}", mk_err_str(e, "Failed to initialize log directory!"));
      };
      let dir = match tokio::fs::canonicalize(&self.log_dir).await {
        Ok(d) => d,
        Err(e) => {
          we!("{} conf={self:?}", mk_err_str(e, "Failed to canonicalize log directory!"))
        }
      };
      let (file_writer, file_guard) =
        non_blk(tracing_appender::rolling::daily(dir, Self::LOG_PREFIX));
      layers.push(
        fmt::Layer::new()
          .with_ansi(false)
          .with_level(true)
          .with_line_number(true)
          .with_target(true)
          .with_thread_ids(false)
          .with_thread_names(true)
          .with_timer(ChronoLocal::default())
          .with_writer(file_writer),
      );
      Some(file_guard)
    } else {
      None
    };
    let cnsl_guard = if self.log_to_cnsl {
      let (cnsl_writer, cnsl_guard) = non_blk(std::io::stderr());
      layers.push(
        fmt::Layer::new()
          .with_ansi(true)
          .with_level(true)
          .with_line_number(true)
          .with_target(true)
          .with_thread_ids(false)
          .with_thread_names(true)
          .with_timer(ChronoLocal::default())
          .with_writer(cnsl_writer),
      );
      Some(cnsl_guard)
    } else {
      None
    };

    let filter =
      EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy();
    if let Err(e) = tracing_subscriber::registry().with(layers).with(filter).try_init() {
      we!("{}", mk_err_str(e, "Failed to install tracing subscriber!"));
    }
    Ok((file_guard, cnsl_guard))
  }
}
