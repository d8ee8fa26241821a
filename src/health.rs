// 3.0 health.rs: the solvency ratio. pure function, no state, no oracle access.
//
// hf = (collateral_usd * threshold / precision) * 1e18 / debt
//
// both divisions truncate, in that order. rounding the adjusted collateral down
// first is what puts scenario A exactly on the 1e18 boundary.

use crate::config::ProtocolParams;
use crate::constants::PRECISION;
use crate::math::mul_div_floor;
use crate::types::{Amount, HealthFactor, Usd};
use primitive_types::U256;

pub fn calculate_health_factor(debt_minted: Amount, collateral_value: Usd, params: &ProtocolParams) -> HealthFactor {
    if debt_minted.is_zero() {
        return HealthFactor::MAX;
    }

    let adjusted = match mul_div_floor(
        collateral_value.raw(),
        U256::from(params.liquidation_threshold),
        U256::from(params.liquidation_precision),
    ) {
        Ok(v) => v,
        // only reachable with precision == 0, which validate() rejects
        Err(_) => return HealthFactor::MAX,
    };

    // a ratio past u256 is solvent by any measure
    mul_div_floor(adjusted, PRECISION, debt_minted.raw())
        .map(HealthFactor::from_raw)
        .unwrap_or(HealthFactor::MAX)
}

/// True when `hf` is at or above the configured minimum.
pub fn is_healthy(hf: HealthFactor, params: &ProtocolParams) -> bool {
    hf >= params.min_health_factor
}
