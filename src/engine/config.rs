//! Engine configuration options.

use crate::config::ProtocolParams;
use crate::types::Address;
use serde::{Deserialize, Serialize};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The engine's own address. Collateral and burned debt sit in custody here,
    /// and it must own the debt token to mint and burn.
    pub engine_address: Address,
    /// The USD-pegged token minted against collateral.
    pub debt_token: Address,
    pub params: ProtocolParams,
    /// Maximum number of events to retain in memory.
    pub max_events: usize,
}

impl EngineConfig {
    pub fn new(engine_address: Address, debt_token: Address) -> Self {
        Self {
            engine_address,
            debt_token,
            params: ProtocolParams::default(),
            max_events: 100_000,
        }
    }

    pub fn with_params(mut self, params: ProtocolParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }
}
