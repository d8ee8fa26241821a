//! Liquidation of undercollateralized positions.

use super::core::Engine;
use super::results::{EngineError, LiquidationResult};
use crate::events::{EventPayload, LiquidationEvent};
use crate::oracle::PriceFeed;
use crate::settlement::SettlementBatch;
use crate::token::TokenBank;
use crate::types::{Address, Amount};

impl<B: TokenBank, F: PriceFeed> Engine<B, F> {
    /// Repay `debt_to_cover` of `user`'s debt with the liquidator's tokens and take the
    /// equivalent `collateral_asset` plus the bonus.
    ///
    /// Only allowed while `user` is below the minimum health factor, and only if the
    /// call raises their health factor. A partial liquidation may leave the user
    /// below the minimum. The liquidator's own position must stay healthy.
    pub fn liquidate(
        &mut self,
        liquidator: Address,
        user: Address,
        collateral_asset: Address,
        debt_to_cover: Amount,
    ) -> Result<LiquidationResult, EngineError> {
        self.atomically(&[user, liquidator], |engine, events| {
            // 1. guards
            Self::require_positive(debt_to_cover)?;
            engine.require_supported(collateral_asset)?;

            // 2. eligibility
            let starting = engine.health_factor(user)?;
            if starting >= engine.config.params.min_health_factor {
                return Err(EngineError::HealthFactorIsOkay {
                    user,
                    health_factor: starting,
                });
            }

            // 3. size the seizure at the live price
            let quote = engine.quote_liquidation(collateral_asset, debt_to_cover)?;

            // 4. ledger effects. the burn stages first so the collateral push settles last
            let mut batch = SettlementBatch::new();
            engine.stage_burn(debt_to_cover, user, liquidator, &mut batch, events)?;
            // dust covers can price out to zero collateral; the debt still goes down
            if !quote.total.is_zero() {
                engine.stage_redeem(collateral_asset, quote.total, user, liquidator, &mut batch, events)?;
            }

            // 5. verify
            let ending = engine.health_factor(user)?;
            if ending <= starting {
                return Err(EngineError::HealthFactorIsNotImproved { user, starting, ending });
            }
            engine.ensure_solvent(liquidator)?;

            // 6. interactions
            engine.settle(&batch)?;

            events.push(EventPayload::Liquidation(LiquidationEvent {
                user,
                liquidator,
                collateral_asset,
                debt_covered: debt_to_cover,
                collateral_seized: quote.total,
                bonus: quote.bonus,
                starting_health_factor: starting,
                ending_health_factor: ending,
            }));

            tracing::info!(
                %user,
                %liquidator,
                debt_covered = %debt_to_cover,
                collateral_seized = %quote.total,
                %starting,
                %ending,
                "position liquidated"
            );

            Ok(LiquidationResult {
                user,
                liquidator,
                collateral_asset,
                debt_covered: debt_to_cover,
                collateral_seized: quote.total,
                bonus: quote.bonus,
                starting_health_factor: starting,
                ending_health_factor: ending,
            })
        })
    }
}
