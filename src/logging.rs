use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "SNIP_LOG";
pub const DEFAULT_FILTER: &str = "warn";

/// Picks the filter directive: `SNIP_LOG`, then `-v` count, then the config
/// file, then the default.
pub fn filter_directive(env_value: Option<&str>, verbosity: u8, configured: Option<&str>) -> String {
    if let Some(raw) = env_value.map(str::trim).filter(|raw| !raw.is_empty()) {
        return raw.to_string();
    }
    match verbosity {
        0 => configured.unwrap_or(DEFAULT_FILTER).to_string(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Installs the stderr subscriber. Safe to call more than once.
pub fn init(verbosity: u8, configured: Option<&str>) {
    let env_value = std::env::var(LOG_ENV).ok();
    let directive = filter_directive(env_value.as_deref(), verbosity, configured);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::{filter_directive, init, DEFAULT_FILTER};

    #[test]
    fn env_wins_over_flags_and_config() {
        assert_eq!(filter_directive(Some("snip=trace"), 2, Some("info")), "snip=trace");
    }

    #[test]
    fn verbosity_wins_over_config() {
        assert_eq!(filter_directive(None, 1, Some("error")), "info");
        assert_eq!(filter_directive(Some("  "), 2, None), "debug");
        assert_eq!(filter_directive(None, 5, None), "trace");
    }

    #[test]
    fn config_then_default() {
        assert_eq!(filter_directive(None, 0, Some("error")), "error");
        assert_eq!(filter_directive(None, 0, None), DEFAULT_FILTER);
    }

    #[test]
    fn init_is_idempotent() {
        init(0, None);
        init(2, Some("debug"));
    }
}
