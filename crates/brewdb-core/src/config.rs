use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a recognized env var holds an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a recognized env var holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<bool>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let require_nonzero = |var: &str, value: usize| -> Result<usize, ConfigError> {
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("BREWDB_ENV", "development"));
    let bind_addr = parse_addr("BREWDB_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("BREWDB_LOG_LEVEL", "info");

    let upstream_base_url = or_default(
        "BREWDB_UPSTREAM_BASE_URL",
        "https://api.openbrewerydb.org/v1/breweries",
    );
    let upstream_page_size = parse_u32("BREWDB_UPSTREAM_PAGE_SIZE", "200")?;
    let upstream_max_pages = parse_u32("BREWDB_UPSTREAM_MAX_PAGES", "100")?;
    let refresh_interval_secs = parse_u64("BREWDB_REFRESH_INTERVAL_SECS", "600")?;
    let request_timeout_secs = parse_u64("BREWDB_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("BREWDB_USER_AGENT", "brewdb/0.1 (brewery-catalog)");
    let max_retries = parse_u32("BREWDB_MAX_RETRIES", "3")?;
    let retry_backoff_base_secs = parse_u64("BREWDB_RETRY_BACKOFF_BASE_SECS", "5")?;

    let default_page_size = require_nonzero(
        "BREWDB_DEFAULT_PAGE_SIZE",
        parse_usize("BREWDB_DEFAULT_PAGE_SIZE", "50")?,
    )?;
    let default_sort_by = or_default("BREWDB_DEFAULT_SORT_BY", "name");
    let default_sort_ascending = parse_bool("BREWDB_DEFAULT_SORT_ASCENDING", "true")?;
    let autocomplete_default_limit = require_nonzero(
        "BREWDB_AUTOCOMPLETE_DEFAULT_LIMIT",
        parse_usize("BREWDB_AUTOCOMPLETE_DEFAULT_LIMIT", "10")?,
    )?;
    let autocomplete_max_limit = require_nonzero(
        "BREWDB_AUTOCOMPLETE_MAX_LIMIT",
        parse_usize("BREWDB_AUTOCOMPLETE_MAX_LIMIT", "50")?,
    )?;

    if upstream_page_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BREWDB_UPSTREAM_PAGE_SIZE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        upstream_base_url,
        upstream_page_size,
        upstream_max_pages,
        refresh_interval_secs,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        default_page_size,
        default_sort_by,
        default_sort_ascending,
        autocomplete_default_limit,
        autocomplete_max_limit,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
