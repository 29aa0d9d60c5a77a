//! The `log` module configures where and how much episim logs. Logging describes what the
//! engine is doing while it runs; it is not to be confused with the _reports_ in
//! [`crate::report`], which record the results of a run.
//!
//! This module (re)exports the five logging macros: `error!`, `warn!`, `info!`, `debug!` and
//! `trace!`. The engine logs at these levels:
//!
//!  - `info`: creation of a simulation (with its seed) and the end of a run
//!  - `debug`: the counts of every simulated day
//!  - `trace`: individual infections, state transitions and file I/O
//!
//! Logging is _disabled_ by default. It can be enabled from the command line with
//! `--log-level <level>` or `-v`/`-vv`/`-vvv`, or from code:
//!
//!  - `disable_logging()`: turns off all log messages (`--log-level off`)
//!  - `set_log_level(level: LevelFilter)`: enables only log messages with priority at least `level`
//!
//! In addition, per-module filtering of messages can be configured using `set_module_filters()`:
//!
//! ```rust
//! use episim::log::{set_module_filters, LevelFilter, set_log_level};
//!
//! pub fn setup_logging() {
//!     // Enable `info` log messages globally.
//!     set_log_level(LevelFilter::Info);
//!     // Show every state transition of every agent.
//!     set_module_filters(&[(&"episim::agent", LevelFilter::Trace)]);
//! }
//! ```
#[cfg(feature = "logging")]
mod standard_logger;

#[cfg(not(feature = "logging"))]
mod null_logger;

pub use log::{debug, error, info, trace, warn, LevelFilter};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::str::FromStr;

#[cfg(feature = "logging")]
use log4rs::Handle;
use std::sync::LazyLock;
use std::sync::{Mutex, MutexGuard};

use crate::error::EpiError;

// Logging disabled
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;

/// A global instance of the logging configuration.
static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// Different log level filters can be applied to the log messages emitted from different modules
/// according to the module path (e.g. `"episim::agent"`). These are stored in the global
/// `LogConfiguration`.
#[derive(Debug, PartialEq)]
struct ModuleLogConfiguration {
    /// The module path this configuration applies to
    module: String,
    /// The maximum log level for this module path
    level: LevelFilter,
}

impl From<(&str, LevelFilter)> for ModuleLogConfiguration {
    fn from((module, level): (&str, LevelFilter)) -> Self {
        Self {
            module: module.to_string(),
            level,
        }
    }
}

/// Holds logging configuration. Its primary responsibility is to keep track of the filter levels
/// of modules and hold a handle to the global logger.
///
/// Because loggers are globally installed, only one instance of this struct should exist. The
/// public API are free functions which fetch the singleton and call the appropriate member
/// function.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    /// The "default" level filter for modules ("targets") without an explicitly set filter. A
    /// global filter level of `LevelFilter::Off` disables logging.
    pub(in crate::log) global_log_level: LevelFilter,
    pub(in crate::log) module_configurations: HashMap<String, ModuleLogConfiguration>,

    #[cfg(feature = "logging")]
    /// Handle to the `log4rs` logger.
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            global_log_level: DEFAULT_LOG_LEVEL,
            module_configurations: HashMap::new(),

            #[cfg(feature = "logging")]
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    pub(in crate::log) fn set_log_level(&mut self, level: LevelFilter) {
        self.global_log_level = level;
        self.set_config();
    }

    /// Returns true if the configuration was mutated, false otherwise.
    fn insert_module_filter(&mut self, module: &String, level: LevelFilter) -> bool {
        match self.module_configurations.entry(module.clone()) {
            Entry::Occupied(mut entry) => {
                let module_config = entry.get_mut();
                if module_config.level == level {
                    return false;
                }
                module_config.level = level;
            }

            Entry::Vacant(entry) => {
                entry.insert((module.as_str(), level).into());
            }
        }
        true
    }

    pub(in crate::log) fn set_module_filters<S: ToString>(
        &mut self,
        module_filters: &[(&S, LevelFilter)],
    ) {
        let mut mutated: bool = false;
        for (module, level) in module_filters {
            mutated |= self.insert_module_filter(&module.to_string(), *level);
        }
        if mutated {
            self.set_config();
        }
    }
}

// The public API

/// Disables logging completely. Equivalent to `set_log_level(LevelFilter::Off)`.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

/// Sets the global log level. A global filter level of `LevelFilter::Off` disables logging.
pub fn set_log_level(level: LevelFilter) {
    let mut log_configuration = get_log_configuration();
    log_configuration.set_log_level(level);
}

/// Sets the level filters for a set of modules. Modules without a filter follow the global
/// level.
pub fn set_module_filters<S: ToString>(module_filters: &[(&S, LevelFilter)]) {
    let mut log_configuration = get_log_configuration();
    log_configuration.set_module_filters(module_filters);
}

/// A global level (if one was given) and per-module levels, in the order they appear.
pub type LogLevels = (Option<LevelFilter>, Vec<(String, LevelFilter)>);

/// Parses a log level specification of the form `"info"` or `"episim::agent=trace,warn"`.
///
/// A bare level sets the global level; `module=level` pairs set module filters.
///
/// # Errors
///
/// Returns an `EpiError` naming the first entry that is not a valid level.
pub fn parse_log_levels(spec: &str) -> Result<LogLevels, EpiError> {
    let mut global = None;
    let mut modules = Vec::new();
    for entry in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match entry.split_once('=') {
            Some((module, level)) => {
                let level = LevelFilter::from_str(level.trim())
                    .map_err(|_| EpiError::from(format!("invalid log level in `{entry}`")))?;
                modules.push((module.trim().to_string(), level));
            }
            None => {
                let level = LevelFilter::from_str(entry)
                    .map_err(|_| EpiError::from(format!("invalid log level `{entry}`")))?;
                global = Some(level);
            }
        }
    }
    Ok((global, modules))
}

/// Fetches a mutable reference to the global `LogConfiguration`.
fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("Mutex poisoned")
}

#[cfg(test)]
mod tests {
    use super::{
        disable_logging, get_log_configuration, parse_log_levels, set_log_level,
        set_module_filters,
    };
    use log::{error, trace, LevelFilter};
    use std::sync::{LazyLock, Mutex};

    // Force logging tests to run serially for consistent behavior.
    static TEST_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(Mutex::default);

    #[test]
    fn test_set_log_level() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        set_log_level(LevelFilter::Trace);
        set_log_level(LevelFilter::Error);
        {
            let config = get_log_configuration();
            assert_eq!(config.global_log_level, LevelFilter::Error);
            error!("test_set_log_level: global set to error");
            trace!("test_set_log_level: NOT EMITTED");
        }
        disable_logging();
        {
            let config = get_log_configuration();
            assert_eq!(config.global_log_level, LevelFilter::Off);
        }
    }

    #[test]
    fn test_set_module_filters() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        set_log_level(LevelFilter::Off);

        let filters: [(&&str, LevelFilter); 2] = [
            (&"episim::agent", LevelFilter::Error),
            (&"episim::simulation", LevelFilter::Debug),
        ];
        set_module_filters(&filters);
        {
            let config = get_log_configuration();
            assert_eq!(config.module_configurations.len(), 2);
            for (module_path, level) in &filters {
                assert_eq!(
                    config.module_configurations.get(**module_path),
                    Some(&((**module_path, *level).into()))
                );
            }
        }

        // Setting an existing filter replaces its level
        set_module_filters(&[(&"episim::agent", LevelFilter::Trace)]);
        {
            let mut config = get_log_configuration();
            assert_eq!(config.module_configurations.len(), 2);
            assert_eq!(
                config.module_configurations.get("episim::agent"),
                Some(&("episim::agent", LevelFilter::Trace).into())
            );
            config.module_configurations.clear();
            config.set_log_level(LevelFilter::Off);
        }
    }

    #[test]
    fn test_parse_log_levels() {
        assert_eq!(
            parse_log_levels("info").unwrap(),
            (Some(LevelFilter::Info), vec![])
        );
        assert_eq!(
            parse_log_levels("episim::agent=trace, warn").unwrap(),
            (
                Some(LevelFilter::Warn),
                vec![("episim::agent".to_string(), LevelFilter::Trace)]
            )
        );
        assert_eq!(parse_log_levels("").unwrap(), (None, vec![]));
        assert!(parse_log_levels("loud").is_err());
        assert!(parse_log_levels("episim=loud").is_err());
    }
}
