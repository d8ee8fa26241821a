//! Protocol constants.
//!
//! These are the defaults behind [`crate::config::ProtocolParams`]. Health factor
//! boundary behaviour depends on their exact values, so change them only together
//! with the liquidation tests.

use crate::math::WAD;
use crate::types::HealthFactor;
use primitive_types::U256;

/// Fixed-point scale for amounts, USD values and health factors (1e18).
pub const PRECISION: U256 = WAD;

/// Price feeds quote with 8 decimals.
pub const FEED_DECIMALS: u32 = 8;

/// Scales an 8 decimal feed answer up to 18 decimals (1e10).
pub const ADDITIONAL_FEED_PRECISION: U256 = U256([10_000_000_000, 0, 0, 0]);

/// Share of nominal collateral value that counts toward solvency, over
/// [`LIQUIDATION_PRECISION`]. 50 means 200% overcollateralization.
pub const LIQUIDATION_THRESHOLD: u64 = 50;

/// Liquidator discount on seized collateral, over [`LIQUIDATION_PRECISION`].
pub const LIQUIDATION_BONUS: u64 = 10;

pub const LIQUIDATION_PRECISION: u64 = 100;

pub const MIN_HEALTH_FACTOR: HealthFactor = HealthFactor::from_raw(PRECISION);

/// Oldest oracle answer the engine will act on.
pub const ORACLE_TIMEOUT_SECS: u64 = 3 * 60 * 60;
