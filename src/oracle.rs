// Price Oracle Adapter
//
// The engine never trusts a raw feed answer. Every valuation goes through
// PriceOracleAdapter, which checks the reading is fresh and positive and then
// normalizes the 8 decimal answer to the engine's 18 decimal fixed point.
// There is no cache: each call re-reads the live price.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::{ADDITIONAL_FEED_PRECISION, PRECISION};
use crate::math::{checked_mul, mul_div_floor, MathError};
use crate::types::{Address, Amount, Timestamp, Usd};

/// A single round reported by a price feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceReading {
    pub round_id: u64,
    /// Signed 8 decimal USD price.
    pub answer: i128,
    pub started_at: Timestamp,
    pub updated_at: Timestamp,
    /// Round in which the answer was computed. Lagging `round_id` means the answer was carried over.
    pub answered_in_round: u64,
}

impl PriceReading {
    pub fn new(round_id: u64, answer: i128, updated_at: Timestamp) -> Self {
        Self {
            round_id,
            answer,
            started_at: updated_at,
            updated_at,
            answered_in_round: round_id,
        }
    }

    pub fn with_answered_in_round(mut self, round: u64) -> Self {
        self.answered_in_round = round;
        self
    }
}

/// Read side of an oracle network. Implement this to plug in a real feed.
pub trait PriceFeed {
    /// Latest round for `feed`, or None if the feed is unknown or unreachable.
    fn latest_price(&self, feed: Address) -> Option<PriceReading>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("no price available from feed {feed}")]
    PriceUnavailable { feed: Address },

    #[error("feed {feed} returned non-positive price {answer}")]
    InvalidPrice { feed: Address, answer: i128 },

    #[error("feed {feed} is stale: last update {age_secs}s ago, limit {max_age_secs}s")]
    StalePrice { feed: Address, age_secs: u64, max_age_secs: u64 },

    #[error("price math failed: {0}")]
    Math(#[from] MathError),
}

/// Normalizes feed answers into 18 decimal USD values and back.
#[derive(Debug, Clone)]
pub struct PriceOracleAdapter<F> {
    feed_source: F,
    max_price_age_secs: u64,
}

impl<F: PriceFeed> PriceOracleAdapter<F> {
    pub fn new(feed_source: F, max_price_age_secs: u64) -> Self {
        Self {
            feed_source,
            max_price_age_secs,
        }
    }

    pub fn feed_source(&self) -> &F {
        &self.feed_source
    }

    pub fn feed_source_mut(&mut self) -> &mut F {
        &mut self.feed_source
    }

    pub fn max_price_age_secs(&self) -> u64 {
        self.max_price_age_secs
    }

    /// Fresh, positive price scaled to 18 decimals.
    pub fn price(&self, feed: Address, now: Timestamp) -> Result<U256, OracleError> {
        if feed.is_zero() {
            return Err(OracleError::PriceUnavailable { feed });
        }
        let reading = self
            .feed_source
            .latest_price(feed)
            .ok_or(OracleError::PriceUnavailable { feed })?;

        let age_secs = now.secs_since(reading.updated_at);
        if reading.updated_at.is_zero()
            || reading.answered_in_round < reading.round_id
            || age_secs > self.max_price_age_secs
        {
            return Err(OracleError::StalePrice {
                feed,
                age_secs,
                max_age_secs: self.max_price_age_secs,
            });
        }

        if reading.answer <= 0 {
            return Err(OracleError::InvalidPrice {
                feed,
                answer: reading.answer,
            });
        }

        let raw = U256::from(reading.answer.unsigned_abs());
        Ok(checked_mul(raw, ADDITIONAL_FEED_PRECISION)?)
    }

    /// USD value of `amount` tokens priced by `feed`.
    pub fn usd_value(&self, feed: Address, amount: Amount, now: Timestamp) -> Result<Usd, OracleError> {
        let price = self.price(feed, now)?;
        Ok(Usd::new(mul_div_floor(price, amount.raw(), PRECISION)?))
    }

    /// Tokens priced by `feed` that are worth `usd`. Inverse of usd_value up to truncation.
    pub fn token_amount_for_usd(&self, feed: Address, usd: Usd, now: Timestamp) -> Result<Amount, OracleError> {
        let price = self.price(feed, now)?;
        Ok(Amount::new(mul_div_floor(usd.raw(), PRECISION, price)?))
    }
}

/// In memory feed for tests and simulation. Each update opens a new round.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceFeed {
    readings: HashMap<Address, PriceReading>,
}

impl InMemoryPriceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `answer` (8 decimals) for `feed` as of `at`.
    pub fn set_price(&mut self, feed: Address, answer: i128, at: Timestamp) {
        let round_id = self.readings.get(&feed).map(|r| r.round_id + 1).unwrap_or(1);
        self.readings.insert(feed, PriceReading::new(round_id, answer, at));
    }

    pub fn set_reading(&mut self, feed: Address, reading: PriceReading) {
        self.readings.insert(feed, reading);
    }

    pub fn remove_feed(&mut self, feed: Address) {
        self.readings.remove(&feed);
    }
}

impl PriceFeed for InMemoryPriceFeed {
    fn latest_price(&self, feed: Address) -> Option<PriceReading> {
        self.readings.get(&feed).copied()
    }
}
