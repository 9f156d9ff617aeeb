use tracing_subscriber::EnvFilter;

/// Default filter for the given verbosity flags; `--quiet` wins.
pub fn default_filter(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "listing_squeeze=debug,info"
    } else {
        "warn"
    }
}

/// Installs the global subscriber, writing to stderr.
///
/// `RUST_LOG` overrides the flag-derived filter. Calling this twice is
/// harmless; the second call is ignored.
pub fn init_logging(quiet: bool, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(quiet, verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(true, true), "error");
        assert_eq!(default_filter(false, true), "listing_squeeze=debug,info");
        assert_eq!(default_filter(false, false), "warn");
    }

    #[test]
    fn test_init_logging_twice_is_harmless() {
        init_logging(false, false);
        init_logging(true, false);
    }
}
