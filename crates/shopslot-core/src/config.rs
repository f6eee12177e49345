use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it from a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    // usize rejects negative capacities at parse time.
    let parse_capacity = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_radius = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        let radius = raw
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(invalid(var, format!("radius must be positive, got {raw}")));
        }
        Ok(radius)
    };

    let catalog_url = require("SHOPSLOT_CATALOG_URL")?;
    let env = parse_environment(&or_default("SHOPSLOT_ENV", "development"))?;
    let bind_addr = parse_addr("SHOPSLOT_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SHOPSLOT_LOG_LEVEL", "info");

    let catalog_timeout_ms = parse_u64("SHOPSLOT_CATALOG_TIMEOUT_MS", "4000")?;
    if catalog_timeout_ms == 0 {
        return Err(invalid(
            "SHOPSLOT_CATALOG_TIMEOUT_MS",
            "timeout must be greater than zero".to_string(),
        ));
    }
    let catalog_user_agent = or_default(
        "SHOPSLOT_CATALOG_USER_AGENT",
        "shopslot/0.1 (slot-allocation)",
    );
    let nearby_radius_km = parse_radius("SHOPSLOT_NEARBY_RADIUS_KM", "25")?;

    let left_capacity = parse_capacity("SHOPSLOT_LEFT_CAPACITY", "3")?;
    let right_capacity = parse_capacity("SHOPSLOT_RIGHT_CAPACITY", "3")?;
    let bottom_capacity = parse_capacity("SHOPSLOT_BOTTOM_CAPACITY", "30")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        catalog_url,
        catalog_timeout_ms,
        catalog_user_agent,
        nearby_radius_km,
        left_capacity,
        right_capacity,
        bottom_capacity,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHOPSLOT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
