//! Read-only queries. None of these change state or record events.

use super::core::Engine;
use super::results::{EngineError, SeizureQuote};
use crate::config::ProtocolParams;
use crate::constants::{ADDITIONAL_FEED_PRECISION, PRECISION};
use crate::health::calculate_health_factor;
use crate::math::{mul_div_floor, MathError};
use crate::oracle::PriceFeed;
use crate::token::TokenBank;
use crate::types::{Address, Amount, HealthFactor, Usd};
use primitive_types::U256;

impl<B: TokenBank, F: PriceFeed> Engine<B, F> {
    /// Current health factor of `user`. A position without debt is `HealthFactor::MAX`
    /// and is answered without consulting the oracle.
    pub fn health_factor(&self, user: Address) -> Result<HealthFactor, EngineError> {
        let debt = self.ledger.debt_minted(user);
        if debt.is_zero() {
            return Ok(HealthFactor::MAX);
        }
        let collateral_value = self.account_collateral_value(user)?;
        Ok(calculate_health_factor(debt, collateral_value, &self.config.params))
    }

    pub fn calculate_health_factor(&self, debt_minted: Amount, collateral_value: Usd) -> HealthFactor {
        calculate_health_factor(debt_minted, collateral_value, &self.config.params)
    }

    /// USD value of `amount` of `asset` at the live price.
    pub fn usd_value(&self, asset: Address, amount: Amount) -> Result<Usd, EngineError> {
        let feed = self.feed_for(asset);
        Ok(self.oracle.usd_value(feed, amount, self.current_time)?)
    }

    /// Amount of `asset` worth `usd` at the live price, truncated.
    pub fn token_amount_for_usd(&self, asset: Address, usd: Usd) -> Result<Amount, EngineError> {
        let feed = self.feed_for(asset);
        Ok(self.oracle.token_amount_for_usd(feed, usd, self.current_time)?)
    }

    pub fn collateral_balance(&self, user: Address, asset: Address) -> Amount {
        self.ledger.collateral_balance(user, asset)
    }

    pub fn debt_minted(&self, user: Address) -> Amount {
        self.ledger.debt_minted(user)
    }

    /// (debt minted, total collateral value in USD)
    pub fn account_information(&self, user: Address) -> Result<(Amount, Usd), EngineError> {
        Ok(self.ledger.account_information(user, &self.oracle, self.current_time)?)
    }

    pub fn account_collateral_value(&self, user: Address) -> Result<Usd, EngineError> {
        Ok(self
            .ledger
            .total_collateral_value_usd(user, &self.oracle, self.current_time)?)
    }

    /// Collateral seized for covering `debt_to_cover` against `asset`, bonus included.
    pub fn quote_liquidation(&self, asset: Address, debt_to_cover: Amount) -> Result<SeizureQuote, EngineError> {
        self.require_supported(asset)?;
        let seized_base = self.token_amount_for_usd(asset, Usd::from(debt_to_cover))?;
        let bonus = Amount::new(mul_div_floor(
            seized_base.raw(),
            U256::from(self.config.params.liquidation_bonus),
            U256::from(self.config.params.liquidation_precision),
        )?);
        let total = seized_base
            .checked_add(bonus)
            .ok_or(MathError::Overflow)?;

        Ok(SeizureQuote {
            seized_base,
            bonus,
            total,
        })
    }

    pub fn collateral_assets(&self) -> &[Address] {
        self.ledger.collateral_assets()
    }

    pub fn price_feed(&self, asset: Address) -> Option<Address> {
        self.ledger.price_feed(asset)
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.config.params
    }

    pub fn engine_address(&self) -> Address {
        self.config.engine_address
    }

    pub fn debt_token(&self) -> Address {
        self.config.debt_token
    }

    // 8.3: protocol constants, as the engine is configured

    pub fn precision(&self) -> U256 {
        PRECISION
    }

    pub fn additional_feed_precision(&self) -> U256 {
        ADDITIONAL_FEED_PRECISION
    }

    pub fn liquidation_threshold(&self) -> u64 {
        self.config.params.liquidation_threshold
    }

    pub fn liquidation_bonus(&self) -> u64 {
        self.config.params.liquidation_bonus
    }

    pub fn liquidation_precision(&self) -> u64 {
        self.config.params.liquidation_precision
    }

    pub fn min_health_factor(&self) -> HealthFactor {
        self.config.params.min_health_factor
    }

    pub fn oracle_timeout_secs(&self) -> u64 {
        self.oracle.max_price_age_secs()
    }

    // an unbound asset maps to the zero feed, which the oracle reports as unavailable
    fn feed_for(&self, asset: Address) -> Address {
        self.ledger.price_feed(asset).unwrap_or(Address::ZERO)
    }
}
