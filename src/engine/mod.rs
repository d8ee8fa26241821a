// 8.0: core collateral engine. owns the ledger, values positions through the oracle,
// enforces the health factor invariant and drives token settlement.
// deterministic; the only I/O is through the TokenBank and PriceFeed traits.

mod config;
mod core;
mod liquidations;
mod positions;
mod results;
mod views;

pub use config::EngineConfig;
pub use core::Engine;
pub use results::{EngineError, LiquidationResult, SeizureQuote};
