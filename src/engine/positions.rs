//! Collateral and debt operations.
//!
//! Each public operation runs inside `atomically`: ledger effects first, then the
//! solvency check, then the token calls. The stage_* helpers only touch the ledger
//! and queue the matching settlement step.

use super::core::Engine;
use super::results::EngineError;
use crate::events::{
    CollateralDepositedEvent, CollateralRedeemedEvent, DebtBurnedEvent, DebtMintedEvent, EventPayload,
};
use crate::oracle::PriceFeed;
use crate::settlement::{SettlementBatch, SettlementInstruction};
use crate::token::TokenBank;
use crate::types::{Address, Amount};

impl<B: TokenBank, F: PriceFeed> Engine<B, F> {
    /// Lock `amount` of `asset` from `user` as collateral. Never needs a solvency check.
    pub fn deposit_collateral(&mut self, user: Address, asset: Address, amount: Amount) -> Result<(), EngineError> {
        self.atomically(&[user], |engine, events| {
            let mut batch = SettlementBatch::new();
            engine.stage_deposit(user, asset, amount, &mut batch, events)?;
            engine.settle(&batch)
        })
    }

    /// Mint `amount` of debt token to `user` against their collateral.
    pub fn mint_debt(&mut self, user: Address, amount: Amount) -> Result<(), EngineError> {
        self.atomically(&[user], |engine, events| {
            let mut batch = SettlementBatch::new();
            engine.stage_mint(user, amount, &mut batch, events)?;
            engine.ensure_solvent(user)?;
            engine.settle(&batch)
        })
    }

    pub fn deposit_collateral_and_mint_debt(
        &mut self,
        user: Address,
        asset: Address,
        collateral_amount: Amount,
        debt_amount: Amount,
    ) -> Result<(), EngineError> {
        self.atomically(&[user], |engine, events| {
            let mut batch = SettlementBatch::new();
            engine.stage_deposit(user, asset, collateral_amount, &mut batch, events)?;
            engine.stage_mint(user, debt_amount, &mut batch, events)?;
            engine.ensure_solvent(user)?;
            engine.settle(&batch)
        })
    }

    /// Withdraw `amount` of `asset`. Fails if the remaining position would be unhealthy.
    pub fn redeem_collateral(&mut self, user: Address, asset: Address, amount: Amount) -> Result<(), EngineError> {
        self.atomically(&[user], |engine, events| {
            let mut batch = SettlementBatch::new();
            engine.stage_redeem(asset, amount, user, user, &mut batch, events)?;
            engine.ensure_solvent(user)?;
            engine.settle(&batch)
        })
    }

    /// Repay `amount` of `user`'s debt with their own tokens.
    pub fn burn_debt(&mut self, user: Address, amount: Amount) -> Result<(), EngineError> {
        self.atomically(&[user], |engine, events| {
            let mut batch = SettlementBatch::new();
            engine.stage_burn(amount, user, user, &mut batch, events)?;
            // a partial burn that leaves the position underwater is refused
            engine.ensure_solvent(user)?;
            engine.settle(&batch)
        })
    }

    /// Burn debt, then redeem collateral, in one call.
    pub fn redeem_collateral_for_debt(
        &mut self,
        user: Address,
        asset: Address,
        collateral_amount: Amount,
        debt_amount: Amount,
    ) -> Result<(), EngineError> {
        self.atomically(&[user], |engine, events| {
            let mut batch = SettlementBatch::new();
            engine.stage_burn(debt_amount, user, user, &mut batch, events)?;
            engine.stage_redeem(asset, collateral_amount, user, user, &mut batch, events)?;
            engine.ensure_solvent(user)?;
            engine.settle(&batch)
        })
    }

    pub(super) fn stage_deposit(
        &mut self,
        user: Address,
        asset: Address,
        amount: Amount,
        batch: &mut SettlementBatch,
        events: &mut Vec<EventPayload>,
    ) -> Result<(), EngineError> {
        Self::require_positive(amount)?;
        self.require_supported(asset)?;

        self.ledger.increase_collateral(user, asset, amount)?;

        events.push(EventPayload::CollateralDeposited(CollateralDepositedEvent { user, asset, amount }));
        batch.add(SettlementInstruction::PullCollateral {
            asset,
            from: user,
            amount,
        });
        Ok(())
    }

    pub(super) fn stage_mint(
        &mut self,
        user: Address,
        amount: Amount,
        batch: &mut SettlementBatch,
        events: &mut Vec<EventPayload>,
    ) -> Result<(), EngineError> {
        Self::require_positive(amount)?;

        self.ledger.increase_debt(user, amount)?;

        events.push(EventPayload::DebtMinted(DebtMintedEvent { user, amount }));
        batch.add(SettlementInstruction::MintDebt { to: user, amount });
        Ok(())
    }

    // moves collateral from `from`'s position to `to`'s wallet
    pub(super) fn stage_redeem(
        &mut self,
        asset: Address,
        amount: Amount,
        from: Address,
        to: Address,
        batch: &mut SettlementBatch,
        events: &mut Vec<EventPayload>,
    ) -> Result<(), EngineError> {
        Self::require_positive(amount)?;
        self.require_supported(asset)?;

        self.ledger.decrease_collateral(from, asset, amount)?;

        events.push(EventPayload::CollateralRedeemed(CollateralRedeemedEvent {
            from,
            to,
            asset,
            amount,
        }));
        batch.add(SettlementInstruction::PushCollateral { asset, to, amount });
        Ok(())
    }

    // clears `amount` of `on_behalf_of`'s debt with tokens paid by `payer`
    pub(super) fn stage_burn(
        &mut self,
        amount: Amount,
        on_behalf_of: Address,
        payer: Address,
        batch: &mut SettlementBatch,
        events: &mut Vec<EventPayload>,
    ) -> Result<(), EngineError> {
        Self::require_positive(amount)?;

        self.ledger.decrease_debt(on_behalf_of, amount)?;

        events.push(EventPayload::DebtBurned(DebtBurnedEvent {
            on_behalf_of,
            payer,
            amount,
        }));
        batch.add(SettlementInstruction::PullDebt { from: payer, amount });
        batch.add(SettlementInstruction::BurnDebt { amount });
        Ok(())
    }
}
