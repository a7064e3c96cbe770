//! # Validation Configuration
//!
//! Tunable limits for the transaction validator.
//!
//! Defaults come from the crate constants, which are also the loosest values
//! accepted. Deployments tighten them through the `[validation]` section of
//! `upkeep.toml` (loaded by `upkeep-db`):
//!
//! ```toml
//! [validation]
//! max_line_items = 50
//! min_quantity = "0.01"
//! max_quantity = "999999"
//! description_min_length = 5
//! low_stock_warnings = true
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{DESCRIPTION_MAX_LENGTH, DESCRIPTION_MIN_LENGTH, MAX_LINE_ITEMS, MAX_QUANTITY, MIN_QUANTITY_HUNDREDTHS};

/// Limits applied by [`crate::validation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum line items per transaction.
    #[serde(default = "default_max_line_items")]
    pub max_line_items: usize,

    /// Smallest quantity accepted on a line (inclusive).
    #[serde(default = "default_min_quantity")]
    pub min_quantity: Decimal,

    /// Largest quantity accepted on a line (inclusive).
    #[serde(default = "default_max_quantity")]
    pub max_quantity: Decimal,

    /// Minimum description length in characters.
    #[serde(default = "default_description_min_length")]
    pub description_min_length: usize,

    /// Emit low-stock warnings for outbound transactions.
    #[serde(default = "default_true")]
    pub low_stock_warnings: bool,
}

fn default_max_line_items() -> usize {
    MAX_LINE_ITEMS
}

fn default_min_quantity() -> Decimal {
    Decimal::new(MIN_QUANTITY_HUNDREDTHS, 2)
}

fn default_max_quantity() -> Decimal {
    Decimal::from(MAX_QUANTITY)
}

fn default_description_min_length() -> usize {
    DESCRIPTION_MIN_LENGTH
}

fn default_true() -> bool {
    true
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            max_line_items: default_max_line_items(),
            min_quantity: default_min_quantity(),
            max_quantity: default_max_quantity(),
            description_min_length: default_description_min_length(),
            low_stock_warnings: true,
        }
    }
}

impl ValidationConfig {
    /// Parses a standalone `[validation]` table body.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Checks the limits are internally consistent and no looser than the
    /// built-in ones.
    ///
    /// Deployments may tighten the rules (fewer lines, a narrower quantity
    /// range, longer descriptions) but never relax them.
    pub fn check(&self) -> Result<(), String> {
        if self.max_line_items == 0 {
            return Err("max_line_items must be greater than 0".into());
        }
        if self.max_line_items > MAX_LINE_ITEMS {
            return Err(format!("max_line_items must not exceed {}", MAX_LINE_ITEMS));
        }
        if self.min_quantity < default_min_quantity() {
            return Err(format!("min_quantity must be at least {}", default_min_quantity()));
        }
        if self.max_quantity > default_max_quantity() {
            return Err(format!("max_quantity must not exceed {}", default_max_quantity()));
        }
        if self.max_quantity < self.min_quantity {
            return Err("max_quantity must not be below min_quantity".into());
        }
        if self.description_min_length < DESCRIPTION_MIN_LENGTH {
            return Err(format!(
                "description_min_length must be at least {}",
                DESCRIPTION_MIN_LENGTH
            ));
        }
        if self.description_min_length > DESCRIPTION_MAX_LENGTH {
            return Err(format!(
                "description_min_length must not exceed {}",
                DESCRIPTION_MAX_LENGTH
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = ValidationConfig::default();
        assert_eq!(config.max_line_items, 50);
        assert_eq!(config.min_quantity, dec!(0.01));
        assert_eq!(config.max_quantity, dec!(999999));
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ValidationConfig::from_toml_str("max_line_items = 20\n").unwrap();
        assert_eq!(config.max_line_items, 20);
        assert_eq!(config.description_min_length, 5);
        assert!(config.low_stock_warnings);
    }

    #[test]
    fn test_quantity_bounds_parse_from_strings() {
        let config = ValidationConfig::from_toml_str("min_quantity = \"0.5\"\nmax_quantity = \"100\"\n").unwrap();
        assert_eq!(config.min_quantity, dec!(0.5));
        assert_eq!(config.max_quantity, dec!(100));
    }

    #[test]
    fn test_check_rejects_inverted_bounds() {
        let config = ValidationConfig {
            min_quantity: dec!(10),
            max_quantity: dec!(1),
            ..ValidationConfig::default()
        };
        assert!(config.check().is_err());

        let config = ValidationConfig {
            max_line_items: 0,
            ..ValidationConfig::default()
        };
        assert!(config.check().is_err());
    }

    #[test]
    fn test_check_rejects_looser_limits() {
        let looser = [
            ValidationConfig {
                max_line_items: 100,
                ..ValidationConfig::default()
            },
            ValidationConfig {
                max_quantity: dec!(1000000),
                ..ValidationConfig::default()
            },
            ValidationConfig {
                min_quantity: dec!(0.001),
                ..ValidationConfig::default()
            },
            ValidationConfig {
                description_min_length: 0,
                ..ValidationConfig::default()
            },
        ];
        for config in looser {
            assert!(config.check().is_err(), "{:?}", config);
        }

        let tighter = ValidationConfig {
            max_line_items: 10,
            min_quantity: dec!(1),
            max_quantity: dec!(500),
            description_min_length: 12,
            low_stock_warnings: false,
        };
        assert!(tighter.check().is_ok());
    }
}
