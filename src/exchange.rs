use crate::errors::ExchangeError;
use crate::ledger::Ledger;
use crate::request::Command;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Response message for transactions naming a stock the ledger does not hold.
pub const STOCK_NOT_FOUND: &str = "Stock not found";

/// Response message for requests that could not be decoded into a transaction.
pub const INVALID_REQUEST: &str = "Invalid request";

/// The transaction processor: five operations against a shared [`Ledger`].
///
/// One `Exchange` is constructed at startup and handed to every session
/// through an `Arc`. Each operation returns a human-readable outcome
/// message; user-level failures (unknown stock, duplicate create) are
/// ordinary messages, never errors.
#[derive(Debug, Default)]
pub struct Exchange {
    ledger: Ledger,
}

impl Exchange {
    /// Creates an exchange with an empty ledger.
    pub fn new() -> Self {
        Exchange {
            ledger: Ledger::new(),
        }
    }

    /// Creates an exchange seeded from a file of `TICKER BALANCE` lines.
    ///
    /// Blank lines are skipped. A line with a missing or non-numeric
    /// balance, extra fields, or a repeated ticker is rejected.
    pub fn from_config<P: AsRef<Path>>(path: P) -> Result<Self, ExchangeError> {
        log::info!("Loading initial ledger from: {:?}", path.as_ref());
        let file = File::open(&path).map_err(|e| ExchangeError::InvalidConfig(e.to_string()))?;
        let reader = BufReader::new(file);

        let exchange = Exchange::new();

        for line in reader.lines() {
            let line = line.map_err(|e| ExchangeError::InvalidConfig(e.to_string()))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let name = fields.next();
            let balance = fields.next().and_then(|field| field.parse::<u64>().ok());
            match (name, balance, fields.next()) {
                (Some(name), Some(balance), None) => {
                    if !exchange.ledger.insert(name, balance) {
                        return Err(ExchangeError::InvalidConfig(format!(
                            "duplicate stock: {}",
                            name
                        )));
                    }
                }
                _ => {
                    return Err(ExchangeError::InvalidConfig(format!(
                        "malformed line: '{}'",
                        line
                    )));
                }
            }
        }

        log::info!("Seeded {} stocks from configuration", exchange.ledger.len());
        Ok(exchange)
    }

    /// Dispatches a decoded command to the matching operation.
    pub fn apply(&self, command: Command) -> String {
        match command {
            Command::Reset => self.reset(),
            Command::Create { stock, amount } => self.create(&stock, amount),
            Command::Buy { stock, amount } => self.buy(&stock, amount),
            Command::Sell { stock, amount } => self.sell(&stock, amount),
            Command::Status { stock } => self.status(&stock),
        }
    }

    /// Removes every stock from the ledger.
    ///
    /// Buyers blocked on a removed stock wake up and answer
    /// "Stock not found".
    pub fn reset(&self) -> String {
        let cleared = self.ledger.clear();
        log::info!("Ledger reset, {} stocks removed", cleared);
        "Stocks reset".to_string()
    }

    /// Lists a new stock with the given starting balance.
    pub fn create(&self, stock: &str, amount: u64) -> String {
        if self.ledger.insert(stock, amount) {
            log::debug!("Created stock {} with balance {}", stock, amount);
            format!("Stock {} created with balance = {}", stock, amount)
        } else {
            format!("Stock {} already exists", stock)
        }
    }

    /// Removes `amount` units, blocking the calling session until the
    /// stock's balance suffices.
    ///
    /// A buy on an unlisted stock answers immediately; only a listed
    /// stock with insufficient balance blocks.
    pub fn buy(&self, stock: &str, amount: u64) -> String {
        match self.ledger.get(stock) {
            Some(entry) if entry.withdraw_blocking(amount) => {
                format!("Stock {}'s balance updated", stock)
            }
            _ => STOCK_NOT_FOUND.to_string(),
        }
    }

    /// Adds `amount` units and wakes buyers waiting on this stock.
    pub fn sell(&self, stock: &str, amount: u64) -> String {
        match self.ledger.get(stock) {
            Some(entry) if entry.deposit(amount) => {
                format!("Stock {}'s balance updated", stock)
            }
            _ => STOCK_NOT_FOUND.to_string(),
        }
    }

    /// Reports the current balance of a stock.
    pub fn status(&self, stock: &str) -> String {
        match self.ledger.get(stock).and_then(|entry| entry.balance()) {
            Some(balance) => format!("Balance for stock {} = {}", stock, balance),
            None => STOCK_NOT_FOUND.to_string(),
        }
    }
}
