// 10.0 guard.rs: shared handle that serializes calls and refuses re-entry.
//
// the lock is reentrant so a nested call from the same thread (a token callback
// holding a handle) reaches the RefCell instead of deadlocking, and the RefCell
// borrow is what turns that nested call into EngineError::Reentrant. other threads
// block on the lock until the running call returns.

use std::cell::RefCell;
use std::sync::{Arc, Weak};

use parking_lot::ReentrantMutex;

use crate::engine::{Engine, EngineError, LiquidationResult};
use crate::oracle::PriceFeed;
use crate::token::TokenBank;
use crate::types::{Address, Amount};

type Shared<B, F> = ReentrantMutex<RefCell<Engine<B, F>>>;

pub struct SharedEngine<B, F> {
    inner: Arc<Shared<B, F>>,
}

// manual impl: cloning the handle must not require B: Clone or F: Clone
impl<B, F> Clone for SharedEngine<B, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: TokenBank, F: PriceFeed> SharedEngine<B, F> {
    pub fn new(engine: Engine<B, F>) -> Self {
        Self {
            inner: Arc::new(ReentrantMutex::new(RefCell::new(engine))),
        }
    }

    /// Exclusive access for one call. Fails `Reentrant` if this thread is already inside one.
    pub fn with_mut<T>(&self, f: impl FnOnce(&mut Engine<B, F>) -> Result<T, EngineError>) -> Result<T, EngineError> {
        let guard = self.inner.lock();
        let mut engine = guard.try_borrow_mut().map_err(|_| EngineError::Reentrant)?;
        f(&mut engine)
    }

    /// Shared access. Fails `Reentrant` while this thread is inside a mutating call.
    pub fn read<T>(&self, f: impl FnOnce(&Engine<B, F>) -> T) -> Result<T, EngineError> {
        let guard = self.inner.lock();
        let engine = guard.try_borrow().map_err(|_| EngineError::Reentrant)?;
        Ok(f(&engine))
    }

    pub fn downgrade(&self) -> WeakEngine<B, F> {
        WeakEngine {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn deposit_collateral(&self, user: Address, asset: Address, amount: Amount) -> Result<(), EngineError> {
        self.with_mut(|engine| engine.deposit_collateral(user, asset, amount))
    }

    pub fn mint_debt(&self, user: Address, amount: Amount) -> Result<(), EngineError> {
        self.with_mut(|engine| engine.mint_debt(user, amount))
    }

    pub fn deposit_collateral_and_mint_debt(
        &self,
        user: Address,
        asset: Address,
        collateral_amount: Amount,
        debt_amount: Amount,
    ) -> Result<(), EngineError> {
        self.with_mut(|engine| engine.deposit_collateral_and_mint_debt(user, asset, collateral_amount, debt_amount))
    }

    pub fn redeem_collateral(&self, user: Address, asset: Address, amount: Amount) -> Result<(), EngineError> {
        self.with_mut(|engine| engine.redeem_collateral(user, asset, amount))
    }

    pub fn burn_debt(&self, user: Address, amount: Amount) -> Result<(), EngineError> {
        self.with_mut(|engine| engine.burn_debt(user, amount))
    }

    pub fn redeem_collateral_for_debt(
        &self,
        user: Address,
        asset: Address,
        collateral_amount: Amount,
        debt_amount: Amount,
    ) -> Result<(), EngineError> {
        self.with_mut(|engine| engine.redeem_collateral_for_debt(user, asset, collateral_amount, debt_amount))
    }

    pub fn liquidate(
        &self,
        liquidator: Address,
        user: Address,
        collateral_asset: Address,
        debt_to_cover: Amount,
    ) -> Result<LiquidationResult, EngineError> {
        self.with_mut(|engine| engine.liquidate(liquidator, user, collateral_asset, debt_to_cover))
    }
}

/// Non-owning handle, for collaborators that must call back into the engine
/// without keeping it alive.
pub struct WeakEngine<B, F> {
    inner: Weak<Shared<B, F>>,
}

impl<B, F> Clone for WeakEngine<B, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<B: TokenBank, F: PriceFeed> WeakEngine<B, F> {
    pub fn upgrade(&self) -> Option<SharedEngine<B, F>> {
        self.inner.upgrade().map(|inner| SharedEngine { inner })
    }
}
