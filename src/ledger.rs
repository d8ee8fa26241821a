//! Collateral ledger.
//!
//! The single owner of balance state: which assets are accepted and which feed
//! prices each one, and per-user collateral and debt. Mutators are plain
//! bookkeeping with checked arithmetic. Solvency rules live in the engine.

use crate::math::MathError;
use crate::oracle::{OracleError, PriceFeed, PriceOracleAdapter};
use crate::types::{Address, Amount, Timestamp, Usd};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPosition {
    pub collateral: HashMap<Address, Amount>,
    pub debt_minted: Amount,
}

impl UserPosition {
    pub fn collateral_of(&self, asset: Address) -> Amount {
        self.collateral.get(&asset).copied().unwrap_or_default()
    }
}

/// Ledger state of a set of users, captured before a mutation so it can be undone.
#[derive(Debug, Clone)]
pub struct LedgerCheckpoint {
    positions: Vec<(Address, Option<UserPosition>)>,
}

#[derive(Debug, Clone)]
pub struct CollateralLedger {
    collateral_assets: Vec<Address>,
    price_feeds: HashMap<Address, Address>,
    positions: HashMap<Address, UserPosition>,
}

impl CollateralLedger {
    pub fn new(assets: &[Address], feeds: &[Address]) -> Result<Self, LedgerError> {
        if assets.len() != feeds.len() {
            return Err(LedgerError::AssetFeedLengthMismatch {
                assets: assets.len(),
                feeds: feeds.len(),
            });
        }

        let mut ledger = Self {
            collateral_assets: Vec::with_capacity(assets.len()),
            price_feeds: HashMap::with_capacity(assets.len()),
            positions: HashMap::new(),
        };
        for (asset, feed) in assets.iter().zip(feeds) {
            ledger.register_asset(*asset, *feed)?;
        }
        Ok(ledger)
    }

    // construction time only. the asset set is fixed once the ledger exists.
    fn register_asset(&mut self, asset: Address, feed: Address) -> Result<(), LedgerError> {
        if asset.is_zero() || feed.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        if self.price_feeds.contains_key(&asset) {
            return Err(LedgerError::DuplicateCollateralAsset(asset));
        }
        self.price_feeds.insert(asset, feed);
        self.collateral_assets.push(asset);
        Ok(())
    }

    pub fn is_supported(&self, asset: Address) -> bool {
        self.price_feeds.contains_key(&asset)
    }

    pub fn collateral_assets(&self) -> &[Address] {
        &self.collateral_assets
    }

    pub fn price_feed(&self, asset: Address) -> Option<Address> {
        self.price_feeds.get(&asset).copied()
    }

    pub fn position(&self, user: Address) -> Option<&UserPosition> {
        self.positions.get(&user)
    }

    pub fn collateral_balance(&self, user: Address, asset: Address) -> Amount {
        self.positions
            .get(&user)
            .map(|p| p.collateral_of(asset))
            .unwrap_or_default()
    }

    pub fn debt_minted(&self, user: Address) -> Amount {
        self.positions
            .get(&user)
            .map(|p| p.debt_minted)
            .unwrap_or_default()
    }

    pub fn increase_collateral(&mut self, user: Address, asset: Address, amount: Amount) -> Result<Amount, LedgerError> {
        let position = self.positions.entry(user).or_default();
        let balance = position.collateral.entry(asset).or_default();
        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(*balance)
    }

    pub fn decrease_collateral(&mut self, user: Address, asset: Address, amount: Amount) -> Result<Amount, LedgerError> {
        let available = self.collateral_balance(user, asset);
        let remaining = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientCollateral {
                user,
                asset,
                requested: amount,
                available,
            })?;
        // checked_sub succeeding with a non-zero amount means the entry exists
        if let Some(position) = self.positions.get_mut(&user) {
            position.collateral.insert(asset, remaining);
        }
        Ok(remaining)
    }

    pub fn increase_debt(&mut self, user: Address, amount: Amount) -> Result<Amount, LedgerError> {
        let position = self.positions.entry(user).or_default();
        position.debt_minted = position
            .debt_minted
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        Ok(position.debt_minted)
    }

    pub fn decrease_debt(&mut self, user: Address, amount: Amount) -> Result<Amount, LedgerError> {
        let available = self.debt_minted(user);
        let remaining = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientDebt {
                user,
                requested: amount,
                available,
            })?;
        if let Some(position) = self.positions.get_mut(&user) {
            position.debt_minted = remaining;
        }
        Ok(remaining)
    }

    /// Sum of every registered asset's USD value for `user`. Each asset's feed is
    /// read even when the balance is zero, so one broken feed fails the valuation.
    pub fn total_collateral_value_usd<F: PriceFeed>(
        &self,
        user: Address,
        oracle: &PriceOracleAdapter<F>,
        now: Timestamp,
    ) -> Result<Usd, OracleError> {
        let mut total = Usd::zero();
        for asset in &self.collateral_assets {
            let feed = self.price_feed(*asset).unwrap_or(Address::ZERO);
            let value = oracle.usd_value(feed, self.collateral_balance(user, *asset), now)?;
            total = total.checked_add(value).ok_or(MathError::Overflow)?;
        }
        Ok(total)
    }

    /// (debt minted, collateral value) for `user`.
    pub fn account_information<F: PriceFeed>(
        &self,
        user: Address,
        oracle: &PriceOracleAdapter<F>,
        now: Timestamp,
    ) -> Result<(Amount, Usd), OracleError> {
        let collateral_value = self.total_collateral_value_usd(user, oracle, now)?;
        Ok((self.debt_minted(user), collateral_value))
    }

    pub fn checkpoint(&self, users: &[Address]) -> LedgerCheckpoint {
        LedgerCheckpoint {
            positions: users
                .iter()
                .map(|user| (*user, self.positions.get(user).cloned()))
                .collect(),
        }
    }

    pub fn restore(&mut self, checkpoint: LedgerCheckpoint) {
        // reverse so the first capture of a repeated user wins
        for (user, position) in checkpoint.positions.into_iter().rev() {
            match position {
                Some(position) => {
                    self.positions.insert(user, position);
                }
                None => {
                    self.positions.remove(&user);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("zero address")]
    ZeroAddress,

    #[error("{assets} collateral assets but {feeds} price feeds")]
    AssetFeedLengthMismatch { assets: usize, feeds: usize },

    #[error("collateral asset {0} registered twice")]
    DuplicateCollateralAsset(Address),

    #[error("insufficient collateral for {user} in {asset}: requested {requested}, available {available}")]
    InsufficientCollateral {
        user: Address,
        asset: Address,
        requested: Amount,
        available: Amount,
    },

    #[error("insufficient debt for {user}: requested {requested}, available {available}")]
    InsufficientDebt {
        user: Address,
        requested: Amount,
        available: Amount,
    },

    #[error("balance overflow")]
    Overflow,
}
