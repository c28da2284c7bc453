//! Server Configuration
//!
//! Environment-supplied constants for the discovery pipeline and the
//! execution engine. Every knob has a default that matches a bare
//! `docker run` of the server image; CLI flags override environment
//! variables, which override the defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Default root directory scanned for tool executables
pub const DEFAULT_TOOLS_ROOT: &str = "/opt/tools";

/// Default per-variant timeout when harvesting help text (seconds)
pub const DEFAULT_HELP_TIMEOUT_SECS: u64 = 10;

/// Default wall-clock timeout for tool execution (seconds)
pub const DEFAULT_EXEC_TIMEOUT_SECS: u64 = 300;

/// Default cap on captured stdout/stderr, per stream (1 MiB)
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Default catalog cache time-to-live (seconds)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Default bound on simultaneously running tool subprocesses
pub const DEFAULT_MAX_CONCURRENT_EXECS: usize = 8;

/// Runtime configuration for the server
///
/// One instance is built at startup and shared (via `Arc`) with the
/// discovery cache and the executor; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Root directory scanned for tool executables
    pub tools_root: PathBuf,

    /// Optional directory of markdown documentation files
    pub docs_root: Option<PathBuf>,

    /// Timeout applied to each help-flag invocation during harvesting
    pub help_timeout: Duration,

    /// Wall-clock timeout for a single tool execution
    pub exec_timeout: Duration,

    /// Maximum bytes retained from each of stdout and stderr
    pub max_output_bytes: usize,

    /// Maximum age of the cached catalog before a refresh rebuilds it
    pub cache_ttl: Duration,

    /// Maximum number of tool subprocesses running at once
    pub max_concurrent_execs: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tools_root: PathBuf::from(DEFAULT_TOOLS_ROOT),
            docs_root: None,
            help_timeout: Duration::from_secs(DEFAULT_HELP_TIMEOUT_SECS),
            exec_timeout: Duration::from_secs(DEFAULT_EXEC_TIMEOUT_SECS),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            max_concurrent_execs: DEFAULT_MAX_CONCURRENT_EXECS,
        }
    }
}

impl ServerConfig {
    /// Build a configuration from environment variables
    ///
    /// Unset or unparseable variables fall back to their defaults; a typo in
    /// `ARMORY_EXEC_TIMEOUT_SECS` must not prevent the server from starting.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            tools_root: env_var("ARMORY_TOOLS_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.tools_root),
            docs_root: env_var("ARMORY_DOCS_ROOT").map(PathBuf::from),
            help_timeout: env_secs("ARMORY_HELP_TIMEOUT_SECS").unwrap_or(defaults.help_timeout),
            exec_timeout: env_secs("ARMORY_EXEC_TIMEOUT_SECS").unwrap_or(defaults.exec_timeout),
            max_output_bytes: env_parse("ARMORY_MAX_OUTPUT_BYTES")
                .unwrap_or(defaults.max_output_bytes),
            cache_ttl: env_secs("ARMORY_CACHE_TTL_SECS").unwrap_or(defaults.cache_ttl),
            max_concurrent_execs: env_parse("ARMORY_MAX_CONCURRENT_EXECS")
                .unwrap_or(defaults.max_concurrent_execs),
        }
    }
}

/// Read a non-empty environment variable
fn env_var(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

/// Read an environment variable as a number of seconds
fn env_secs(name: &str) -> Option<Duration> {
    env_parse::<u64>(name).map(Duration::from_secs)
}

/// Read and parse an environment variable, warning on garbage
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env_var(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparseable {}={:?}", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();

        assert_eq!(config.tools_root, PathBuf::from("/opt/tools"));
        assert!(config.docs_root.is_none());
        assert_eq!(config.help_timeout, Duration::from_secs(10));
        assert_eq!(config.exec_timeout, Duration::from_secs(300));
        assert_eq!(config.max_output_bytes, 1024 * 1024);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.max_concurrent_execs, 8);
    }

    #[test]
    fn test_env_overrides() {
        // Env var manipulation is process-global; use names no other test reads.
        std::env::set_var("ARMORY_TOOLS_ROOT", "/srv/kit");
        std::env::set_var("ARMORY_CACHE_TTL_SECS", "60");
        std::env::set_var("ARMORY_MAX_OUTPUT_BYTES", "not-a-number");

        let config = ServerConfig::from_env();

        assert_eq!(config.tools_root, PathBuf::from("/srv/kit"));
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        // Garbage falls back to the default rather than failing startup
        assert_eq!(config.max_output_bytes, DEFAULT_MAX_OUTPUT_BYTES);

        std::env::remove_var("ARMORY_TOOLS_ROOT");
        std::env::remove_var("ARMORY_CACHE_TTL_SECS");
        std::env::remove_var("ARMORY_MAX_OUTPUT_BYTES");
    }

    #[test]
    fn test_empty_env_ignored() {
        std::env::set_var("ARMORY_DOCS_ROOT", "   ");
        let config = ServerConfig::from_env();
        assert!(config.docs_root.is_none());
        std::env::remove_var("ARMORY_DOCS_ROOT");
    }
}
