// 8.0 engine/core.rs: main engine. holds the ledger, the oracle and the token bank.

use super::config::EngineConfig;
use super::results::EngineError;
use crate::events::{Event, EventId, EventPayload};
use crate::health::is_healthy;
use crate::ledger::CollateralLedger;
use crate::oracle::{PriceFeed, PriceOracleAdapter};
use crate::settlement::{SettlementBatch, SettlementContext};
use crate::token::TokenBank;
use crate::types::{Address, Amount, Timestamp};

/** 8.1: main engine struct. all state lives here */
#[derive(Debug)]
pub struct Engine<B, F> {
    pub(super) config: EngineConfig,
    pub(super) ledger: CollateralLedger,
    pub(super) oracle: PriceOracleAdapter<F>,
    pub(super) bank: B,
    pub(super) events: Vec<Event>,
    pub(super) next_event_id: u64,
    pub(super) current_time: Timestamp,
}

impl<B: TokenBank, F: PriceFeed> Engine<B, F> {
    /// Build an engine accepting `assets` as collateral, each priced by the feed at
    /// the same index in `feeds`.
    pub fn new(
        config: EngineConfig,
        assets: &[Address],
        feeds: &[Address],
        bank: B,
        feed_source: F,
    ) -> Result<Self, EngineError> {
        config.params.validate()?;
        if config.engine_address.is_zero() || config.debt_token.is_zero() {
            return Err(EngineError::ZeroAddress);
        }

        let ledger = CollateralLedger::new(assets, feeds)?;
        let oracle = PriceOracleAdapter::new(feed_source, config.params.max_price_age_secs);

        Ok(Self {
            config,
            ledger,
            oracle,
            bank,
            events: Vec::new(),
            next_event_id: 1,
            current_time: Timestamp::now(),
        })
    }

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, millis: i64) {
        self.current_time = Timestamp::from_millis(self.current_time.as_millis() + millis);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &CollateralLedger {
        &self.ledger
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    pub fn feed_source(&self) -> &F {
        self.oracle.feed_source()
    }

    pub fn feed_source_mut(&mut self) -> &mut F {
        self.oracle.feed_source_mut()
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;

        tracing::debug!(id = event.id.0, subject = %event.payload.subject(), payload = ?event.payload, "event");

        self.events.push(event);

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }

    pub(super) fn require_positive(amount: Amount) -> Result<(), EngineError> {
        if amount.is_zero() {
            return Err(EngineError::AmountMustBeMoreThanZero);
        }
        Ok(())
    }

    pub(super) fn require_supported(&self, asset: Address) -> Result<(), EngineError> {
        if !self.ledger.is_supported(asset) {
            return Err(EngineError::CollateralTokenNotAllowed(asset));
        }
        Ok(())
    }

    // fails HealthFactorIsBroken when a debt-bearing position sits below the minimum
    pub(super) fn ensure_solvent(&self, user: Address) -> Result<(), EngineError> {
        let health_factor = self.health_factor(user)?;
        if !is_healthy(health_factor, &self.config.params) {
            return Err(EngineError::HealthFactorIsBroken { user, health_factor });
        }
        Ok(())
    }

    /// Run `op` as one all-or-nothing call. The ledger entries of `touched` are
    /// restored if it fails, and the events it staged are recorded only on success.
    pub(super) fn atomically<T>(
        &mut self,
        touched: &[Address],
        op: impl FnOnce(&mut Self, &mut Vec<EventPayload>) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let checkpoint = self.ledger.checkpoint(touched);
        let mut events_to_emit: Vec<EventPayload> = Vec::new();

        match op(self, &mut events_to_emit) {
            Ok(value) => {
                for event in events_to_emit {
                    self.emit_event(event);
                }
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(error = %err, "call rolled back");
                self.ledger.restore(checkpoint);
                Err(err)
            }
        }
    }

    // token calls go last; the ledger must already hold its final state
    pub(super) fn settle(&mut self, batch: &SettlementBatch) -> Result<(), EngineError> {
        let ctx = SettlementContext {
            custody: self.config.engine_address,
            debt_token: self.config.debt_token,
        };
        batch.execute(&mut self.bank, &ctx)?;
        Ok(())
    }
}
