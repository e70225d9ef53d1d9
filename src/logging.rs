use std::sync::Once;

use serde::{Deserialize, Serialize};

/// `[logging]` section of the viewer configuration.
///
/// `filter` uses the `env_logger` syntax (`"info"`,
/// `"phong_viewer=debug,wgpu_core=warn"`). Without it `RUST_LOG` is used,
/// then `info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub filter: Option<String>,
}

static INIT: Once = Once::new();

/// Installs the global logger. Later calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        if let Some(filter) = &config.filter {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }
        // Tests may already have installed a logger.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}
