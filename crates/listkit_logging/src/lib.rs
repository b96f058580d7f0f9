#![deny(missing_docs)]
//! Log macros and level defaults shared by the listkit crates.
//!
//! Every crate logs through the `listkit_*` macros so request tracing can be
//! redirected in one place. The binary installs the real logger; tests call
//! [`initialize_for_tests`].

/// Per-command detail from the request engine.
#[macro_export]
macro_rules! listkit_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! listkit_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// State transitions of the list, such as tickets acquired and released.
#[macro_export]
macro_rules! listkit_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Recoverable failures: rejected requests, failed pages, missing config.
#[macro_export]
macro_rules! listkit_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! listkit_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Picks the default level for the current build profile.
///
/// Debug builds log at `Debug`, release builds at `Info`.
pub fn default_level() -> log::LevelFilter {
    if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

/// Sends test output to the terminal at [`default_level`].
///
/// Later calls, and calls after another logger was installed, do nothing.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        default_level(),
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_is_harmless() {
        initialize_for_tests();
        initialize_for_tests();
        listkit_debug!("logger initialized twice without panicking");
    }

    #[test]
    fn default_level_follows_build_profile() {
        let expected = if cfg!(debug_assertions) {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        assert_eq!(default_level(), expected);
    }
}
