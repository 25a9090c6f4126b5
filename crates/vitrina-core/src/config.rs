use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files, which is useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup, no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
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

    let env = parse_environment(&or_default("VITRINA_ENV", "development"))?;
    let log_level = or_default("VITRINA_LOG_LEVEL", "info");
    let catalog_urls = parse_url_list(&or_default("VITRINA_CATALOG_URLS", ""));
    let cache_dir = PathBuf::from(or_default("VITRINA_CACHE_DIR", "./.vitrina-cache"));

    let request_timeout_secs = parse_u64("VITRINA_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("VITRINA_USER_AGENT", "vitrina/0.1 (catalog-sync)");
    let max_retries = parse_u32("VITRINA_MAX_RETRIES", "2")?;
    let retry_backoff_base_secs = parse_u64("VITRINA_RETRY_BACKOFF_BASE_SECS", "1")?;

    let search_cache_capacity = parse_usize("VITRINA_SEARCH_CACHE_CAPACITY", "100")?;
    if search_cache_capacity == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "VITRINA_SEARCH_CACHE_CAPACITY".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        catalog_urls,
        cache_dir,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        search_cache_capacity,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "VITRINA_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Splits a comma-separated URL list, dropping blank entries.
fn parse_url_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
