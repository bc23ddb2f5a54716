//! Subscriber initialization

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}' (expected pretty or json)")),
        }
    }
}

/// Initialize console logging. Filtering follows `RUST_LOG`, defaulting to `info`.
///
/// Only the first call installs a subscriber; later calls are no-ops.
pub fn init_telemetry(service_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    init_with_format(service_name, LogFormat::Pretty)
}

/// Initialize logging as JSON lines, one object per event.
pub fn init_json_telemetry(service_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    init_with_format(service_name, LogFormat::Json)
}

/// Initialize logging with an explicit output format.
pub fn init_with_format(
    service_name: &str,
    format: LogFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let mut result = Ok(());

    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(filter);
        let installed = match format {
            LogFormat::Pretty => registry
                .with(tracing_subscriber::fmt::layer().with_target(true).with_line_number(true))
                .try_init(),
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
                .try_init(),
        };
        if let Err(e) = installed {
            result = Err(e.to_string());
            return;
        }

        tracing::info!(service.name = service_name, log.format = ?format, "Telemetry initialized");
    });

    result.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_init_is_idempotent() {
        assert!(init_telemetry("pmk-test").is_ok());
        assert!(init_with_format("pmk-test", LogFormat::Json).is_ok());
        assert!(init_json_telemetry("pmk-test").is_ok());
    }
}
