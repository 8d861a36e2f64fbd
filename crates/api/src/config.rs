//! Application configuration loaded from environment variables.

use std::time::Duration;

use domain::{Currency, Money, PricingPolicy};

/// Server and pricing configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `DATABASE_URL` — PostgreSQL connection string; in-memory stores when
///   unset
/// - `FREE_SHIPPING_THRESHOLD` — items total (minor units) at which
///   shipping is free (default: ₹500)
/// - `SHIPPING_FLAT_RATE` — flat shipping below the threshold, in minor
///   units (default: ₹50)
/// - `TAX_RATE_PERCENT` — tax as a whole percentage (default: `5`)
/// - `GATEWAY_CAPTURE_TIMEOUT_MS` — bound on the gateway capture call
///   (default: `10000`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub free_shipping_threshold_minor: i64,
    pub shipping_flat_rate_minor: i64,
    pub tax_rate_percent: u8,
    pub gateway_capture_timeout_ms: u64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_parse("PORT", defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: std::env::var("DATABASE_URL").ok(),
            free_shipping_threshold_minor: env_parse(
                "FREE_SHIPPING_THRESHOLD",
                defaults.free_shipping_threshold_minor,
            ),
            shipping_flat_rate_minor: env_parse(
                "SHIPPING_FLAT_RATE",
                defaults.shipping_flat_rate_minor,
            ),
            tax_rate_percent: env_parse("TAX_RATE_PERCENT", defaults.tax_rate_percent),
            gateway_capture_timeout_ms: env_parse(
                "GATEWAY_CAPTURE_TIMEOUT_MS",
                defaults.gateway_capture_timeout_ms,
            ),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the storefront's pricing policy.
    ///
    /// Falls back to the default policy if a configured amount is
    /// negative.
    pub fn pricing(&self) -> PricingPolicy {
        let threshold = Money::from_minor(self.free_shipping_threshold_minor, Currency::Inr);
        let flat_rate = Money::from_minor(self.shipping_flat_rate_minor, Currency::Inr);
        match (threshold, flat_rate) {
            (Ok(free_shipping_threshold), Ok(flat_shipping_rate)) => PricingPolicy {
                free_shipping_threshold,
                flat_shipping_rate,
                tax_rate_percent: self.tax_rate_percent,
            },
            _ => {
                tracing::warn!("negative pricing configuration ignored, using defaults");
                PricingPolicy::default()
            }
        }
    }

    /// Returns the gateway capture timeout.
    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.gateway_capture_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            free_shipping_threshold_minor: Money::inr(500).amount(),
            shipping_flat_rate_minor: Money::inr(50).amount(),
            tax_rate_percent: 5,
            gateway_capture_timeout_ms: 10_000,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
