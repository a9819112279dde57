// Logging module - Logging infrastructure
use crate::domain::{config::GlobalConfig, error::{ClientError, ClientResult}};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Map a configured level name to a filter directive, falling back to `warn`
pub fn level_directive(log_level: &str, verbose: bool) -> &'static str {
    if verbose {
        return "debug";
    }
    match log_level.to_ascii_lowercase().as_str() {
        "error" => "error",
        "warn" => "warn",
        "info" => "info",
        "debug" => "debug",
        "trace" => "trace",
        _ => "warn",
    }
}

/// Initialize logging to stderr so stdout stays reserved for results.
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &GlobalConfig, verbose: bool) -> ClientResult<()> {
    let directive = level_directive(&config.log_level, verbose);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(verbose)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init()
        .map_err(|e| ClientError::Config {
            message: format!("Failed to initialize logging: {}", e),
        })?;

    tracing::debug!("Logging initialized at {}", directive);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directive() {
        assert_eq!(level_directive("INFO", false), "info");
        assert_eq!(level_directive("trace", false), "trace");
        assert_eq!(level_directive("loud", false), "warn");
        assert_eq!(level_directive("error", true), "debug");
    }

    #[test]
    fn test_logging_init() {
        // a second init in the same process reports an error instead of panicking
        let config = GlobalConfig::default();
        let _ = init_logging(&config, false);
        assert!(init_logging(&config, false).is_err());
    }
}
