use std::sync::{Condvar, Mutex};

/// Mutable part of a stock entry, guarded by the entry's own mutex.
#[derive(Debug)]
struct StockState {
    /// Current number of available units. Never negative.
    balance: u64,

    /// Set once by [`Stock::retire`] when the ledger drops this entry.
    /// A retired stock rejects every further transaction.
    retired: bool,
}

/// A single tradable stock with its own lock and buy-wait condition.
///
/// The balance is only ever read or written while holding the stock's
/// mutex, so concurrent transactions on the same stock are totally
/// ordered. Buyers that find the balance insufficient wait on the
/// `restocked` condition and re-check the balance every time a seller
/// wakes them.
///
/// # Examples
///
/// ```
/// use exchange_server::stock::Stock;
///
/// let stock = Stock::new("ACME", 100);
/// assert!(stock.withdraw_blocking(60));
/// assert_eq!(stock.balance(), Some(40));
/// ```
#[derive(Debug)]
pub struct Stock {
    /// Ticker symbol identifying this stock.
    name: String,

    state: Mutex<StockState>,

    /// Signalled whenever the balance grows or the stock is retired.
    restocked: Condvar,
}

impl Stock {
    /// Creates a stock with the given starting balance.
    pub fn new(name: &str, balance: u64) -> Self {
        Stock {
            name: name.to_string(),
            state: Mutex::new(StockState {
                balance,
                retired: false,
            }),
            restocked: Condvar::new(),
        }
    }

    /// Ticker symbol of this stock.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current balance, or `None` if the stock has been retired.
    pub fn balance(&self) -> Option<u64> {
        let state = self.state.lock().unwrap();
        (!state.retired).then_some(state.balance)
    }

    /// Adds `amount` units and wakes every blocked buyer of this stock.
    ///
    /// Returns `false` without mutating anything if the stock was
    /// retired by a concurrent reset.
    pub fn deposit(&self, amount: u64) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.retired {
            return false;
        }
        state.balance = state.balance.saturating_add(amount);
        log::debug!("Stock {} restocked to balance {}", self.name, state.balance);
        self.restocked.notify_all();
        true
    }

    /// Removes `amount` units, blocking until the balance suffices.
    ///
    /// The caller's thread suspends while `balance < amount` and
    /// re-checks the balance on every wake-up: sellers wake all waiters
    /// at once and whichever buyer re-acquires the lock first may
    /// consume the balance, so each waiter must verify the condition
    /// again. There is no queueing among waiters; an individual buyer
    /// can starve while others are served. With no timeout and no
    /// cancellation, a buy that is never restocked blocks forever.
    ///
    /// Returns `false` if the stock was retired while waiting; the
    /// check-and-decrement otherwise happens without releasing the
    /// lock, so the balance cannot go negative.
    pub fn withdraw_blocking(&self, amount: u64) -> bool {
        let mut state = self.state.lock().unwrap();
        while !state.retired && state.balance < amount {
            log::debug!(
                "Buy of {} {} waiting, balance {}",
                amount,
                self.name,
                state.balance
            );
            state = self.restocked.wait(state).unwrap();
        }
        if state.retired {
            return false;
        }
        state.balance -= amount;
        log::debug!("Stock {} drawn down to balance {}", self.name, state.balance);
        true
    }

    /// Marks the stock as removed and wakes every blocked buyer so it
    /// can observe the flag and fail instead of waiting on an entry the
    /// ledger no longer holds.
    pub(crate) fn retire(&self) {
        let mut state = self.state.lock().unwrap();
        state.retired = true;
        self.restocked.notify_all();
    }
}
