//! Logger initialisation for the command-line adapter.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger.
///
/// When `verbose` is `true`, enemy decisions and other debug messages are
/// printed. Otherwise only info level and above are shown. `RUST_LOG`
/// overrides both.
pub(crate) fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);

    // A logger may already be installed when running under a test harness.
    let _ = builder.try_init();
}
