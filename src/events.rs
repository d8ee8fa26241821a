// 11.0: every successful state change produces an event. used for audit trails and
// notifying external systems. events of a failed call are never recorded.

use crate::types::{Address, Amount, HealthFactor, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    // Collateral events
    CollateralDeposited(CollateralDepositedEvent),
    CollateralRedeemed(CollateralRedeemedEvent),

    // Debt events
    DebtMinted(DebtMintedEvent),
    DebtBurned(DebtBurnedEvent),

    // Risk events
    Liquidation(LiquidationEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralDepositedEvent {
    pub user: Address,
    pub asset: Address,
    pub amount: Amount,
}

// from == to for a plain redeem. a liquidation redeems from the user to the liquidator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralRedeemedEvent {
    pub from: Address,
    pub to: Address,
    pub asset: Address,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtMintedEvent {
    pub user: Address,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtBurnedEvent {
    pub on_behalf_of: Address,
    pub payer: Address,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationEvent {
    pub user: Address,
    pub liquidator: Address,
    pub collateral_asset: Address,
    pub debt_covered: Amount,
    pub collateral_seized: Amount,
    pub bonus: Amount,
    pub starting_health_factor: HealthFactor,
    pub ending_health_factor: HealthFactor,
}

impl EventPayload {
    /// The position whose balances this event changed.
    pub fn subject(&self) -> Address {
        match self {
            EventPayload::CollateralDeposited(e) => e.user,
            EventPayload::CollateralRedeemed(e) => e.from,
            EventPayload::DebtMinted(e) => e.user,
            EventPayload::DebtBurned(e) => e.on_behalf_of,
            EventPayload::Liquidation(e) => e.user,
        }
    }
}
