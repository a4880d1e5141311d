use bytes::Bytes;
use tracing::{debug, error, info, trace};
use ulink_app::clock::MonotonicClock;
use ulink_app::link::{available_ports, SerialLink};
use ulink_app::session::{Session, Stats};
use ulink_app::{logger, mk_err_str, we, Rst, PAYLOAD, SP_BAUD_RATE, SP_PATH, SP_POLL_TIMEOUT};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Rst<()> {
  // !!! the result should never be ignored or named `_` !!!
  let _guards = logger::Config::from_env().init().await?;

  trace!("Tracing Initialization finished.");
  #[cfg(debug_assertions)]
  debug!("Running on debug mode.");

  let sps = available_ports();
  info!(sps = ?sps, "Serial ports present.");

  let link = match SerialLink::open(SP_PATH, SP_BAUD_RATE, SP_POLL_TIMEOUT) {
    Ok(link) => link,
    Err(e) => {
      println!("Serial port error: {e}");
      if !sps.is_empty() {
        println!("Available ports: {}", sps.join(", "));
      }
      error!(error = ?e, "Failed to open the link.");
      we!("{e}");
    }
  };

  // One blocking context owns the link for the whole session.
  let task = tokio::task::spawn_blocking(move || {
    let console = std::io::stdout();
    Session::new(link, MonotonicClock::default(), console, Bytes::from_static(PAYLOAD.as_bytes()))
      .run()
  });

  match task.await {
    Ok(Ok(stats)) => {
      report(&stats);
      info!(stats = ?stats, "Application finished.");
      Ok(())
    }
    Ok(Err(e)) => {
      error!(error = ?e, "Session aborted.");
      we!("{e}");
    }
    Err(e) => {
      println!("An error occurred: {e}");
      let e = mk_err_str(e, "Session task failed!");
      error!("{e}");
      we!("{e}");
    }
  }
}

fn report(stats: &Stats) {
  println!(
    "Session ended after {} iterations: sent {} bytes, received {} bytes, {} partial writes, {} \
     decode failures.",
    stats.iterations,
    stats.sent_bytes,
    stats.received_bytes,
    stats.partial_writes,
    stats.decode_failures
  );
}
