//! Tracing subscriber bootstrap.

use anyhow::anyhow;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use bookstore_kernel::settings::{LogFormat, TelemetrySettings};

/// Build the filter: `RUST_LOG` wins over the configured level.
pub fn env_filter(settings: &TelemetrySettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let formatting_layer = match settings.log_format {
        LogFormat::Json => fmt::layer().json().boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter(settings))
        .with(formatting_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))?;

    tracing::info!(
        target: "bookstore-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails() {
        let settings = TelemetrySettings {
            log_level: "debug".to_string(),
            log_format: LogFormat::Json,
        };

        // Only one test in this crate installs the global subscriber.
        init(&settings).unwrap();
        assert!(init(&settings).is_err());
    }

    #[test]
    fn configured_level_is_used_as_filter() {
        let settings = TelemetrySettings::default();
        let filter = env_filter(&settings);
        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(filter.to_string(), "info");
        }
    }
}
