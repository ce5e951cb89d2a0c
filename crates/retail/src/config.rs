//! Shop configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SHOP_SHIPPING_BASE` - Shipping for the first unit (default: 50)
//! - `SHOP_SHIPPING_PER_UNIT` - Shipping for each further unit (default: 20)
//! - `SHOP_TAX_RATE` - Flat tax percentage on the subtotal (default: 18)
//! - `SHOP_COUPONS` - `CODE=PCT` pairs, comma separated (default: `SAVE10=10,SAVE20=20,WELCOME15=15`)
//! - `SHOP_PAYMENT_DELAY_MS` - Simulated gateway latency (default: 500)
//! - `SHOP_PAYMENT_SUCCESS_RATE` - Simulated approval probability, 0 to 1 (default: 0.9)
//! - `SHOP_ACTOR_BUFFER` - Mailbox size of each actor (default: 32)
//! - `SHOP_ORDER_NUMBER_ATTEMPTS` - Order-number generations before giving up (default: 5)

use crate::pricing::PricingPolicy;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_COUPONS: &str = "SAVE10=10,SAVE20=20,WELCOME15=15";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Payment simulator tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSettings {
    pub delay: Duration,
    pub success_rate: f64,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            success_rate: 0.9,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShopConfig {
    pub pricing: PricingPolicy,
    pub payment: PaymentSettings,
    pub actor_buffer: usize,
    pub order_number_attempts: u32,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            pricing: PricingPolicy::default(),
            payment: PaymentSettings::default(),
            actor_buffer: 32,
            order_number_attempts: 5,
        }
    }
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let pricing = PricingPolicy::new(
            parse_env("SHOP_SHIPPING_BASE", "50")?,
            parse_env("SHOP_SHIPPING_PER_UNIT", "20")?,
            parse_env("SHOP_TAX_RATE", "18")?,
            parse_coupons(&get_env_or_default("SHOP_COUPONS", DEFAULT_COUPONS))?,
        );

        let success_rate: f64 = parse_env("SHOP_PAYMENT_SUCCESS_RATE", "0.9")?;
        if !(0.0..=1.0).contains(&success_rate) {
            return Err(ConfigError::InvalidEnvVar(
                "SHOP_PAYMENT_SUCCESS_RATE".to_string(),
                format!("{success_rate} is not between 0 and 1"),
            ));
        }
        let payment = PaymentSettings {
            delay: Duration::from_millis(parse_env("SHOP_PAYMENT_DELAY_MS", "500")?),
            success_rate,
        };

        let actor_buffer: usize = parse_env("SHOP_ACTOR_BUFFER", "32")?;
        if actor_buffer == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOP_ACTOR_BUFFER".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            pricing,
            payment,
            actor_buffer,
            order_number_attempts: parse_env("SHOP_ORDER_NUMBER_ATTEMPTS", "5")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parses `CODE=PCT,CODE=PCT`. Percentages must lie in `[0, 100]`.
fn parse_coupons(raw: &str) -> Result<Vec<(String, Decimal)>, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("SHOP_COUPONS".to_string(), reason);

    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (code, pct) = entry
                .split_once('=')
                .ok_or_else(|| invalid(format!("expected CODE=PCT, got {entry:?}")))?;
            let pct = Decimal::from_str(pct.trim()).map_err(|e| invalid(e.to_string()))?;
            if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
                return Err(invalid(format!("{code} discount {pct}% is out of range")));
            }
            Ok((code.trim().to_string(), pct))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_coupon_table_parses() {
        let coupons = parse_coupons(DEFAULT_COUPONS).unwrap();
        assert_eq!(coupons.len(), 3);
        assert_eq!(coupons[2], ("WELCOME15".to_string(), Decimal::from(15)));
    }

    #[test]
    fn coupon_entries_tolerate_spacing() {
        let coupons = parse_coupons(" VIP = 12.5 , ,").unwrap();
        assert_eq!(coupons, vec![("VIP".to_string(), Decimal::new(125, 1))]);
    }

    #[test]
    fn malformed_coupon_entry_is_an_error() {
        assert!(parse_coupons("SAVE10").is_err());
        assert!(parse_coupons("HALF=150").is_err());
    }

    #[test]
    fn defaults_match_policy_defaults() {
        let config = ShopConfig::default();
        assert_eq!(config.pricing, PricingPolicy::default());
        assert_eq!(config.actor_buffer, 32);
        assert_eq!(config.order_number_attempts, 5);
    }
}
