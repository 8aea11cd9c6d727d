//! Logging setup for the resolver
//!
//! The resolver logs through the `log` facade; the embedding driver decides
//! whether anything is printed. These helpers install `env_logger` for
//! binaries and tests that have no logger of their own.
//!
//! # Log Levels
//!
//! - `warn!` - Loader misbehaviour the resolver recovered from
//! - `debug!` - Load state transitions, template instantiation, relinking
//! - `trace!` - Individual lookups and targeted loads
//!
//! # Environment Variable
//!
//! ```bash
//! RUST_LOG=resolver=debug cargo test          # state transitions
//! RUST_LOG=resolver::resolver=trace cargo test # every lookup
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging at the default level (Warn).
///
/// Only the first call has an effect.
pub fn init() {
    init_with_level(LevelFilter::Warn);
}

/// Initialize logging with a specific level.
///
/// Only the first call has an effect.
pub fn init_with_level(level: LevelFilter) {
    INIT.call_once(|| {
        Builder::new()
            .filter_level(level)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{:5}] {} - {}",
                    record.level(),
                    record.module_path().unwrap_or("unknown"),
                    record.args()
                )
            })
            .init();
    });
}

/// Initialize logging from the RUST_LOG environment variable, defaulting to
/// Warn when it is not set.
pub fn init_from_env() {
    INIT.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    });
}

/// Initialize logging for tests.
///
/// Output is captured by the test harness; a logger that was already
/// installed is left alone.
pub fn init_test() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .is_test(true)
        .try_init();
}
