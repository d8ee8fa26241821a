// 7.0 config.rs: protocol parameters in one place. thresholds, bonus, oracle timeout.
// defaults are the protocol constants; validate() guards hand-edited values.

use serde::{Deserialize, Serialize};

use crate::constants::{
    LIQUIDATION_BONUS, LIQUIDATION_PRECISION, LIQUIDATION_THRESHOLD, MIN_HEALTH_FACTOR,
    ORACLE_TIMEOUT_SECS,
};
use crate::types::HealthFactor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParams {
    // Share of collateral value counted toward solvency (over liquidation_precision)
    pub liquidation_threshold: u64,
    // Liquidator discount on seized collateral (over liquidation_precision)
    pub liquidation_bonus: u64,
    // Denominator for threshold and bonus
    pub liquidation_precision: u64,
    // Health factor every debt-bearing position must keep
    pub min_health_factor: HealthFactor,
    // Oracle answers older than this are rejected
    pub max_price_age_secs: u64,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            liquidation_threshold: LIQUIDATION_THRESHOLD, // 50%
            liquidation_bonus: LIQUIDATION_BONUS,         // 10%
            liquidation_precision: LIQUIDATION_PRECISION,
            min_health_factor: MIN_HEALTH_FACTOR, // 1.0
            max_price_age_secs: ORACLE_TIMEOUT_SECS, // 3 hours
        }
    }
}

impl ProtocolParams {
    // Validate the parameters for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.liquidation_precision == 0 {
            return Err(ConfigError::InvalidPrecision);
        }

        // a threshold above 100% would let positions borrow more than their collateral is worth
        if self.liquidation_threshold == 0 || self.liquidation_threshold > self.liquidation_precision {
            return Err(ConfigError::InvalidThreshold {
                threshold: self.liquidation_threshold,
                precision: self.liquidation_precision,
            });
        }

        if self.liquidation_bonus >= self.liquidation_precision {
            return Err(ConfigError::InvalidBonus {
                bonus: self.liquidation_bonus,
                precision: self.liquidation_precision,
            });
        }

        if self.min_health_factor.raw().is_zero() || self.min_health_factor.is_max() {
            return Err(ConfigError::InvalidMinHealthFactor);
        }

        if self.max_price_age_secs == 0 {
            return Err(ConfigError::InvalidOracleTimeout);
        }

        Ok(())
    }
}

// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("liquidation precision must be positive")]
    InvalidPrecision,

    #[error("liquidation threshold {threshold} must be in (0, {precision}]")]
    InvalidThreshold { threshold: u64, precision: u64 },

    #[error("liquidation bonus {bonus} must be below {precision}")]
    InvalidBonus { bonus: u64, precision: u64 },

    #[error("minimum health factor must be positive and finite")]
    InvalidMinHealthFactor,

    #[error("oracle timeout must be positive")]
    InvalidOracleTimeout,
}
