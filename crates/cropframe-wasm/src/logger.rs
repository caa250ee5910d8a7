//! Logging setup for the bindings.
//!
//! In the browser, `log` records go to the console through `console_log`
//! and panics are reported with `console_error_panic_hook`. Native builds
//! (host tests) use `env_logger`, which honours `RUST_LOG`.

use log::LevelFilter;

/// Parse a level name, falling back to `warn`.
pub(crate) fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Warn)
}

/// Install the logger once. Later calls only change the level.
pub(crate) fn install(level: LevelFilter) {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Trace).is_err() {
            // Logger already initialized; only the level changes.
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let mut builder = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(LevelFilter::Trace.as_str()),
        );
        builder.is_test(cfg!(test));
        if builder.try_init().is_err() {
            // Logger already initialized; only the level changes.
        }
    }

    log::set_max_level(level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("TRACE"), LevelFilter::Trace);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("nonsense"), LevelFilter::Warn);
    }

    #[test]
    fn test_install_twice() {
        install(LevelFilter::Info);
        install(LevelFilter::Debug);
        assert_eq!(log::max_level(), LevelFilter::Debug);
    }
}
