use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

fn default_level(verbose: bool) -> (LevelFilter, &'static str) {
    if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::WARN, "warn")
    }
}

/// Installs the global subscriber on stderr. Application logs show warnings
/// and above, or debug output when `verbose` is set. `RUST_LOG` overrides
/// the default level.
pub fn init_logging(verbose: bool) {
    let (level_filter, level) = default_level(verbose);
    let app_filter = Targets::new().with_target("streampay", level_filter);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
        .with(app_filter)
        .with(env_filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_keeps_warnings_visible() {
        assert_eq!(default_level(false), (LevelFilter::WARN, "warn"));
        assert_eq!(default_level(true), (LevelFilter::DEBUG, "debug"));
    }
}
