//! Subscriber initialization.
//!
//! `RUST_LOG` always wins over the configured level.

use roiforge_config::{LogFormat, LoggingSettings};
use tracing_subscriber::EnvFilter;

/// JSON logs at `info` unless `RUST_LOG` says otherwise.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    init_with(&LoggingSettings::default());
}

pub fn init_with(settings: &LoggingSettings) {
    let filter = filter_for(settings);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let _ = match settings.format {
        LogFormat::Json => builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
}

fn filter_for(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_a_no_op() {
        init();
        init_with(&LoggingSettings {
            level: "debug".to_string(),
            format: LogFormat::Compact,
        });
        ::tracing::info!("still logging");
    }
}
