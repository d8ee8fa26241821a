// 8.0.2: result types and errors for engine operations.

use crate::config::ConfigError;
use crate::ledger::LedgerError;
use crate::math::MathError;
use crate::oracle::OracleError;
use crate::settlement::SettlementError;
use crate::types::{Address, Amount, HealthFactor};
use serde::{Deserialize, Serialize};

/// Collateral a liquidation of `debt_to_cover` would seize at the current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeizureQuote {
    pub seized_base: Amount,
    pub bonus: Amount, // liquidator discount, paid in the same asset
    pub total: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationResult {
    pub user: Address,
    pub liquidator: Address,
    pub collateral_asset: Address,
    pub debt_covered: Amount,
    pub collateral_seized: Amount,
    pub bonus: Amount,
    pub starting_health_factor: HealthFactor,
    pub ending_health_factor: HealthFactor,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Amount must be more than zero")]
    AmountMustBeMoreThanZero,

    #[error("Zero address")]
    ZeroAddress,

    #[error("Collateral token {0} is not allowed")]
    CollateralTokenNotAllowed(Address),

    #[error("Transfer of {amount} {token} from {from} to {to} failed")]
    TransferFailed {
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    },

    #[error("Mint of {amount} to {to} failed")]
    MintFailed { to: Address, amount: Amount },

    #[error("Burn of {amount} failed")]
    BurnFailed { amount: Amount },

    #[error("Health factor of {user} is broken: {health_factor}")]
    HealthFactorIsBroken { user: Address, health_factor: HealthFactor },

    #[error("Health factor of {user} is okay: {health_factor}")]
    HealthFactorIsOkay { user: Address, health_factor: HealthFactor },

    #[error("Health factor of {user} not improved: {starting} -> {ending}")]
    HealthFactorIsNotImproved {
        user: Address,
        starting: HealthFactor,
        ending: HealthFactor,
    },

    #[error("Engine is already executing a call")]
    Reentrant,

    #[error("Ledger error: {0}")]
    Ledger(LedgerError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

// a null address is one error wherever it is caught
impl From<LedgerError> for EngineError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::ZeroAddress => EngineError::ZeroAddress,
            other => EngineError::Ledger(other),
        }
    }
}

impl From<SettlementError> for EngineError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::TransferFailed { token, from, to, amount } => {
                EngineError::TransferFailed { token, from, to, amount }
            }
            SettlementError::MintFailed { to, amount } => EngineError::MintFailed { to, amount },
            SettlementError::BurnFailed { amount } => EngineError::BurnFailed { amount },
        }
    }
}
