// src/log.rs
//! Logging setup: stderr for humans, `<store>/debug.log` for post-mortems.
//! Both timestamps are elapsed time since start.

use std::fs::{self, OpenOptions};
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::Uptime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::consts::LOG_FILE;

/// Default filter for a `-v` count; `RUST_LOG` overrides it.
fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "lb_scrape=info",
        1 => "lb_scrape=debug",
        _ => "lb_scrape=trace",
    }
}

/// Install the global subscriber. Keep the returned guard alive for the whole
/// run; dropping it flushes the file writer. `None` when file logging could not
/// be set up (stderr logging still works).
pub fn init(dir: &Path, verbose: u8) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(Uptime::default())
        .with_target(false);

    // rolling::never panics if the file cannot be created, so preflight it
    let writable = fs::create_dir_all(dir).is_ok()
        && OpenOptions::new().create(true).append(true).open(dir.join(LOG_FILE)).is_ok();
    let (file_layer, guard) = if writable {
        let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, LOG_FILE));
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_timer(Uptime::default())
            .with_target(true);
        (Some(layer), Some(guard))
    } else {
        eprintln!("Warning: could not write to {}, file logging disabled", dir.display());
        (None, None)
    };

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(default_directive(0), "lb_scrape=info");
        assert_eq!(default_directive(1), "lb_scrape=debug");
        assert_eq!(default_directive(9), "lb_scrape=trace");
    }
}
