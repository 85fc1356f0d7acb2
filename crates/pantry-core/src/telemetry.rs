//! Process-wide tracing subscriber setup.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogFormat, LoggingSettings};
use crate::error::{Error, Result};

/// Install a fmt subscriber filtered by `RUST_LOG`, or by `settings.level`
/// when `RUST_LOG` is unset. A second call leaves the first subscriber in place.
pub fn init(settings: &LoggingSettings) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)
            .map_err(|e| Error::InvalidConfig(format!("logging.level '{}': {}", settings.level, e)))?,
    };
    let builder = fmt().with_writer(std::io::stderr).with_env_filter(filter).with_target(true);
    let installed = match settings.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}
