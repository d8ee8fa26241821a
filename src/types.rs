// 1.0: all the primitives live here. nothing in the engine works without these types.
// addresses, token amounts, usd values, health factors, timestamps. each is a newtype
// so the compiler catches an amount being passed where a usd value belongs.

use crate::math::WAD;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// users, collateral assets, price feeds and the engine's own custody all share one
// address space. the zero address is the null handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub u64);

impl Address {
    pub const ZERO: Address = Address(0);

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:040x}", self.0)
    }
}

// 1.1: token quantity in 18 decimal fixed point. used for collateral and the debt token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Amount(U256);

impl Amount {
    pub const MAX: Amount = Amount(U256::MAX);

    pub fn new(raw: U256) -> Self {
        Self(raw)
    }

    pub fn zero() -> Self {
        Self(U256::zero())
    }

    // smallest unit, 1e-18 of a token
    pub fn from_wei(wei: u128) -> Self {
        Self(U256::from(wei))
    }

    // whole tokens
    pub fn from_units(units: u64) -> Self {
        Self(U256::from(units) * WAD)
    }

    #[must_use]
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        decimal_to_wad(value).map(Self)
    }

    pub fn raw(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(&self, other: Amount) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(&self, other: Amount) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn to_decimal(&self) -> Option<Decimal> {
        wad_to_decimal(self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal() {
            Some(d) => write!(f, "{}", d.normalize()),
            None => write!(f, "{}e-18", self.0),
        }
    }
}

// 1.2: USD value in 18 decimal fixed point. one debt token is pegged to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Usd(U256);

impl Usd {
    pub fn new(raw: U256) -> Self {
        Self(raw)
    }

    pub fn zero() -> Self {
        Self(U256::zero())
    }

    pub fn from_dollars(dollars: u64) -> Self {
        Self(U256::from(dollars) * WAD)
    }

    pub fn raw(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(&self, other: Usd) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn to_decimal(&self) -> Option<Decimal> {
        wad_to_decimal(self.0)
    }
}

impl From<Amount> for Usd {
    // debt token amounts are USD at par
    fn from(amount: Amount) -> Self {
        Self(amount.raw())
    }
}

impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal() {
            Some(d) => write!(f, "${}", d.normalize()),
            None => write!(f, "${}e-18", self.0),
        }
    }
}

// 1.3: solvency ratio scaled by 1e18. 1e18 means exactly at the minimum.
// MAX is the sentinel for a position with no debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HealthFactor(U256);

impl HealthFactor {
    pub const MAX: HealthFactor = HealthFactor(U256::MAX);

    pub const fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> U256 {
        self.0
    }

    pub fn is_max(&self) -> bool {
        self.0 == U256::MAX
    }

    pub fn to_decimal(&self) -> Option<Decimal> {
        wad_to_decimal(self.0)
    }
}

impl fmt::Display for HealthFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_max() {
            return write!(f, "inf");
        }
        match self.to_decimal() {
            Some(d) => write!(f, "{}", d.normalize()),
            None => write!(f, "{}e-18", self.0),
        }
    }
}

// 1.4: millisecond timestamp. oracle staleness is measured in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    pub fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub fn from_secs(secs: i64) -> Self {
        Self(secs * 1000)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    pub fn as_secs(&self) -> i64 {
        self.0 / 1000
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    // whole seconds from `earlier` to self, zero if earlier is in the future
    pub fn secs_since(&self, earlier: Timestamp) -> u64 {
        u64::try_from(self.as_secs() - earlier.as_secs()).unwrap_or(0)
    }
}

// display/input only. protocol math never goes through Decimal.
fn wad_to_decimal(raw: U256) -> Option<Decimal> {
    if raw > U256::from(i128::MAX as u128) {
        return None;
    }
    Decimal::try_from_i128_with_scale(raw.as_u128() as i128, 18).ok()
}

fn decimal_to_wad(value: Decimal) -> Option<U256> {
    if value.is_sign_negative() {
        return None;
    }
    let mantissa = U256::from(value.mantissa().unsigned_abs());
    let scale = value.scale() as usize;
    if scale <= 18 {
        mantissa.checked_mul(U256::exp10(18 - scale))
    } else {
        Some(mantissa / U256::exp10(scale - 18))
    }
}
