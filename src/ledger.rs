use crate::stock::Stock;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Shared table of stocks, keyed by ticker symbol.
///
/// The map structure itself (insert, clear) is guarded by a table-wide
/// `RwLock`; individual balances are guarded by each [`Stock`]'s own
/// mutex. Transactions fetch the entry under the read lock and then
/// operate on the returned `Arc` with the table lock released, so
/// activity on different stocks never serializes. The table lock is
/// always taken before an entry lock, never the other way around.
#[derive(Debug, Default)]
pub struct Ledger {
    stocks: RwLock<HashMap<String, Arc<Stock>>>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Ledger {
            stocks: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new stock with the given starting balance.
    ///
    /// Returns `false` without mutating anything if the name is already
    /// present. The lookup and insert happen under the table's write
    /// lock, so two concurrent inserts of the same new name cannot both
    /// succeed.
    pub fn insert(&self, name: &str, balance: u64) -> bool {
        let mut stocks = self.stocks.write().unwrap();
        match stocks.entry(name.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Stock::new(name, balance)));
                true
            }
        }
    }

    /// Looks up a stock by name.
    pub fn get(&self, name: &str) -> Option<Arc<Stock>> {
        self.stocks.read().unwrap().get(name).cloned()
    }

    /// Removes every stock and returns how many were dropped.
    ///
    /// Each entry is retired under its own lock before the table is
    /// cleared, so sessions still holding an `Arc` to a removed stock
    /// (including buyers blocked in a wait) observe the retirement and
    /// fail with "not found" instead of mutating an unreachable entry.
    pub fn clear(&self) -> usize {
        let mut stocks = self.stocks.write().unwrap();
        for stock in stocks.values() {
            stock.retire();
        }
        let cleared = stocks.len();
        stocks.clear();
        cleared
    }

    /// Number of stocks currently listed.
    pub fn len(&self) -> usize {
        self.stocks.read().unwrap().len()
    }

    /// Whether the ledger holds no stocks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
