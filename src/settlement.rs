// 9.1 settlement.rs: external token calls, run after the ledger is final.
//
// an operation stages its token movements into a SettlementBatch instead of calling
// the bank inline. steps that can be undone (pulls into custody, burns from custody)
// run first; at most one step that cannot be undone (a push out of custody or a mint)
// runs last. when a step fails, the steps already done are compensated in reverse.

use serde::{Deserialize, Serialize};

use crate::token::TokenBank;
use crate::types::{Address, Amount};

// Token movements an operation can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettlementInstruction {
    // Collateral from a user into custody, spending the engine's allowance
    PullCollateral {
        asset: Address,
        from: Address,
        amount: Amount,
    },

    // Collateral out of custody
    PushCollateral {
        asset: Address,
        to: Address,
        amount: Amount,
    },

    // Debt token from a payer into custody
    PullDebt { from: Address, amount: Amount },

    // Debt token out of custody. only used to compensate a PullDebt
    PushDebt { to: Address, amount: Amount },

    // Destroy debt token held in custody
    BurnDebt { amount: Amount },

    // Create debt token for a user
    MintDebt { to: Address, amount: Amount },
}

impl SettlementInstruction {
    // can this step be undone after it succeeded
    pub fn is_reversible(&self) -> bool {
        matches!(
            self,
            SettlementInstruction::PullCollateral { .. }
                | SettlementInstruction::PullDebt { .. }
                | SettlementInstruction::BurnDebt { .. }
        )
    }

    // the step that undoes this one, if any
    fn compensation(&self, custody: Address) -> Option<SettlementInstruction> {
        match *self {
            SettlementInstruction::PullCollateral { asset, from, amount } => {
                Some(SettlementInstruction::PushCollateral { asset, to: from, amount })
            }
            SettlementInstruction::PullDebt { from, amount } => Some(SettlementInstruction::PushDebt { to: from, amount }),
            // re-mint into custody; a later compensation pushes it back to the payer
            SettlementInstruction::BurnDebt { amount } => Some(SettlementInstruction::MintDebt { to: custody, amount }),
            _ => None,
        }
    }
}

// Where custody lives and which token is the debt token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementContext {
    pub custody: Address,
    pub debt_token: Address,
}

impl SettlementContext {
    fn apply<B: TokenBank>(&self, bank: &mut B, instruction: &SettlementInstruction) -> Result<(), SettlementError> {
        let custody = self.custody;
        match *instruction {
            SettlementInstruction::PullCollateral { asset, from, amount } => {
                if !bank.transfer_from(asset, custody, from, custody, amount) {
                    return Err(SettlementError::TransferFailed {
                        token: asset,
                        from,
                        to: custody,
                        amount,
                    });
                }
            }
            SettlementInstruction::PushCollateral { asset, to, amount } => {
                if !bank.transfer(asset, custody, to, amount) {
                    return Err(SettlementError::TransferFailed {
                        token: asset,
                        from: custody,
                        to,
                        amount,
                    });
                }
            }
            SettlementInstruction::PullDebt { from, amount } => {
                if !bank.transfer_from(self.debt_token, custody, from, custody, amount) {
                    return Err(SettlementError::TransferFailed {
                        token: self.debt_token,
                        from,
                        to: custody,
                        amount,
                    });
                }
            }
            SettlementInstruction::PushDebt { to, amount } => {
                if !bank.transfer(self.debt_token, custody, to, amount) {
                    return Err(SettlementError::TransferFailed {
                        token: self.debt_token,
                        from: custody,
                        to,
                        amount,
                    });
                }
            }
            SettlementInstruction::BurnDebt { amount } => {
                if !bank.burn(self.debt_token, custody, amount) {
                    return Err(SettlementError::BurnFailed { amount });
                }
            }
            SettlementInstruction::MintDebt { to, amount } => {
                if !bank.mint(self.debt_token, custody, to, amount) {
                    return Err(SettlementError::MintFailed { to, amount });
                }
            }
        }
        Ok(())
    }
}

// An ordered set of token movements executed as one unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementBatch {
    pub instructions: Vec<SettlementInstruction>,
}

impl SettlementBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, instruction: SettlementInstruction) {
        debug_assert!(
            self.instructions.last().map_or(true, |last| last.is_reversible()),
            "no settlement step may follow an irreversible one"
        );
        self.instructions.push(instruction);
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    // Run every step in order. On failure, undo the completed steps and return the
    // failing step's error. A compensation that itself fails is logged and skipped.
    pub fn execute<B: TokenBank>(&self, bank: &mut B, ctx: &SettlementContext) -> Result<(), SettlementError> {
        for (idx, instruction) in self.instructions.iter().enumerate() {
            if let Err(err) = ctx.apply(bank, instruction) {
                tracing::debug!(step = idx, error = %err, "settlement step failed, compensating");
                self.compensate(bank, ctx, idx);
                return Err(err);
            }
        }
        Ok(())
    }

    fn compensate<B: TokenBank>(&self, bank: &mut B, ctx: &SettlementContext, failed_at: usize) {
        for instruction in self.instructions[..failed_at].iter().rev() {
            let Some(undo) = instruction.compensation(ctx.custody) else {
                continue;
            };
            if let Err(err) = ctx.apply(bank, &undo) {
                tracing::error!(?instruction, error = %err, "settlement compensation failed");
            }
        }
    }
}

// Errors from external token calls
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettlementError {
    #[error("transfer of {amount} {token} from {from} to {to} failed")]
    TransferFailed {
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    },

    #[error("mint of {amount} to {to} failed")]
    MintFailed { to: Address, amount: Amount },

    #[error("burn of {amount} failed")]
    BurnFailed { amount: Amount },
}
