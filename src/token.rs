// 9.0 token.rs: the ERC20 side of the world. MOCKED in memory for tests and the sim.
// every call reports failure as `false` instead of erroring; the engine decides what
// a failed transfer means.

use std::collections::{HashMap, HashSet};

use crate::types::{Address, Amount};

/// External token ledger the engine pulls from and pushes to.
pub trait TokenBank {
    /// Move `amount` of `token` from `from` to `to`, spending `spender`'s allowance.
    fn transfer_from(&mut self, token: Address, spender: Address, from: Address, to: Address, amount: Amount) -> bool;

    /// Move `amount` of `token` out of `from`'s own balance.
    fn transfer(&mut self, token: Address, from: Address, to: Address, amount: Amount) -> bool;

    /// Create `amount` of `token` for `to`. Only the token's owner may mint.
    fn mint(&mut self, token: Address, minter: Address, to: Address, amount: Amount) -> bool;

    /// Destroy `amount` of `token` from `holder`'s balance. Only the owner may burn.
    fn burn(&mut self, token: Address, holder: Address, amount: Amount) -> bool;

    fn balance_of(&self, token: Address, holder: Address) -> Amount;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenBank {
    balances: HashMap<(Address, Address), Amount>,
    // (token, owner, spender) -> remaining allowance. Amount::MAX never decreases.
    allowances: HashMap<(Address, Address, Address), Amount>,
    owners: HashMap<Address, Address>,
    halted: HashSet<Address>,
}

impl InMemoryTokenBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_owner(&mut self, token: Address, owner: Address) {
        self.owners.insert(token, owner);
    }

    pub fn owner(&self, token: Address) -> Option<Address> {
        self.owners.get(&token).copied()
    }

    /// Faucet. Creates balance without an owner check.
    pub fn credit(&mut self, token: Address, holder: Address, amount: Amount) {
        let balance = self.balances.entry((token, holder)).or_default();
        *balance = balance.checked_add(amount).unwrap_or(Amount::MAX);
    }

    pub fn approve(&mut self, token: Address, owner: Address, spender: Address, amount: Amount) {
        self.allowances.insert((token, owner, spender), amount);
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> Amount {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Make every call on `token` fail until resumed.
    pub fn halt(&mut self, token: Address) {
        self.halted.insert(token);
    }

    pub fn resume(&mut self, token: Address) {
        self.halted.remove(&token);
    }

    fn move_balance(&mut self, token: Address, from: Address, to: Address, amount: Amount) -> bool {
        let from_balance = self.balance_of(token, from);
        let Some(from_after) = from_balance.checked_sub(amount) else {
            return false;
        };
        if from == to {
            return true;
        }
        let to_balance = self.balance_of(token, to);
        let Some(to_after) = to_balance.checked_add(amount) else {
            return false;
        };
        self.balances.insert((token, from), from_after);
        self.balances.insert((token, to), to_after);
        true
    }
}

impl TokenBank for InMemoryTokenBank {
    fn transfer_from(&mut self, token: Address, spender: Address, from: Address, to: Address, amount: Amount) -> bool {
        if self.halted.contains(&token) {
            return false;
        }

        let allowance = self.allowance(token, from, spender);
        let remaining = if spender == from || allowance == Amount::MAX {
            allowance
        } else {
            match allowance.checked_sub(amount) {
                Some(rest) => rest,
                None => return false,
            }
        };

        if !self.move_balance(token, from, to, amount) {
            return false;
        }
        if spender != from {
            self.allowances.insert((token, from, spender), remaining);
        }
        true
    }

    fn transfer(&mut self, token: Address, from: Address, to: Address, amount: Amount) -> bool {
        if self.halted.contains(&token) {
            return false;
        }
        self.move_balance(token, from, to, amount)
    }

    fn mint(&mut self, token: Address, minter: Address, to: Address, amount: Amount) -> bool {
        if self.halted.contains(&token) || self.owner(token) != Some(minter) {
            return false;
        }
        let Some(after) = self.balance_of(token, to).checked_add(amount) else {
            return false;
        };
        self.balances.insert((token, to), after);
        true
    }

    fn burn(&mut self, token: Address, holder: Address, amount: Amount) -> bool {
        if self.halted.contains(&token) || self.owner(token) != Some(holder) {
            return false;
        }
        let Some(after) = self.balance_of(token, holder).checked_sub(amount) else {
            return false;
        };
        self.balances.insert((token, holder), after);
        true
    }

    fn balance_of(&self, token: Address, holder: Address) -> Amount {
        self.balances
            .get(&(token, holder))
            .copied()
            .unwrap_or_default()
    }
}
