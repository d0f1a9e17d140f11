//! Logger setup for the terminal viewer.
//!
//! The viewer owns the alternate screen, so records go to stderr and are
//! best redirected (`2> vrcam.log`) when raising the level.

use std::sync::Once;

/// `env_filter` follows the `env_logger` filter syntax
/// (e.g. "warn", "vrcam_core=debug").
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
}

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            // Anything chattier would scribble over the rendered frame
            builder.filter_level(log::LevelFilter::Warn);
        }

        builder.init();
        log::debug!("logging initialized");
    });
}
