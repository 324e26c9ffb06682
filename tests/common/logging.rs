//! Route the crate's log callback into `tracing`, printed through the test
//! writer so output only shows for failing tests or with `--nocapture`.

use text_overlay::{LogLevel, set_log_callback};
use tracing::Level;

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_target(true)
        .with_test_writer()
        .try_init();

    set_log_callback(|level, message| match level {
        LogLevel::Debug => tracing::debug!(target: "text_overlay", "{message}"),
        LogLevel::Info => tracing::info!(target: "text_overlay", "{message}"),
        LogLevel::Warn => tracing::warn!(target: "text_overlay", "{message}"),
        LogLevel::Error => tracing::error!(target: "text_overlay", "{message}"),
    });
}
