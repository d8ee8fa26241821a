// 2.0 math.rs: 18 decimal fixed point on U256.
// products are widened to U512 before dividing, so a * b / c only fails when
// the quotient itself does not fit. every division truncates toward zero.

use primitive_types::{U256, U512};

/// 1e18, the scale shared by amounts, USD values and health factors.
pub const WAD: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    #[error("arithmetic overflow")]
    Overflow,

    #[error("division by zero")]
    DivisionByZero,
}

/// floor(a * b / c) with a 512 bit intermediate.
pub fn mul_div_floor(a: U256, b: U256, c: U256) -> Result<U256, MathError> {
    if c.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let quotient = U256::full_mul(a, b) / U512::from(c);
    U256::try_from(quotient).map_err(|_| MathError::Overflow)
}

pub fn checked_mul(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}
