use std::env;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

const LOG_ENV: &str = "BROADSIDE_LOG";

/// Stderr logger for this crate's records only, so rendered boards on stdout
/// stay readable. Each line carries the time since start-up.
struct PeerLogger {
    started: Instant,
}

impl Log for PeerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && metadata.target().starts_with("broadside")
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let elapsed = self.started.elapsed();
        let module = record
            .target()
            .strip_prefix("broadside::")
            .unwrap_or(record.target());
        eprintln!(
            "{:>4}.{:03} {:<5} {}: {}",
            elapsed.as_secs(),
            elapsed.subsec_millis(),
            record.level(),
            module,
            record.args()
        );
    }

    fn flush(&self) {}
}

/// Level named by `value`, e.g. `debug` or `OFF`; `info` when absent or unknown.
fn parse_level(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|lvl| lvl.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Install the logger with the level from `BROADSIDE_LOG`.
/// Calling it more than once keeps the first logger.
pub fn init_logging() {
    let level = parse_level(env::var(LOG_ENV).ok().as_deref());
    let logger = Box::new(PeerLogger {
        started: Instant::now(),
    });
    if log::set_boxed_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_defaults_to_info() {
        assert_eq!(parse_level(None), LevelFilter::Info);
        assert_eq!(parse_level(Some("chatty")), LevelFilter::Info);
    }

    #[test]
    fn level_names_are_case_insensitive() {
        assert_eq!(parse_level(Some("DEBUG")), LevelFilter::Debug);
        assert_eq!(parse_level(Some(" trace ")), LevelFilter::Trace);
        assert_eq!(parse_level(Some("off")), LevelFilter::Off);
    }

    #[test]
    fn foreign_targets_are_filtered() {
        log::set_max_level(LevelFilter::Trace);
        let logger = PeerLogger {
            started: Instant::now(),
        };
        let ours = Metadata::builder()
            .level(log::Level::Debug)
            .target("broadside::machine")
            .build();
        let theirs = Metadata::builder()
            .level(log::Level::Error)
            .target("tokio::net")
            .build();
        assert!(logger.enabled(&ours));
        assert!(!logger.enabled(&theirs));
    }
}
