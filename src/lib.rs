//! # Stock Exchange Server
//!
//! This crate implements a multithreaded stock-exchange web server.
//! Tradable stocks live in a shared in-memory ledger; clients submit
//! one transaction per HTTP connection and the number of concurrently
//! processed sessions is bounded by an admission gate.
//!
//! ## Features
//!
//! - In-memory ledger with one exclusive lock per stock.
//! - Five transactions: `reset`, `create`, `buy`, `sell`, `status`.
//! - Blocking buys: a buy waits until the balance suffices.
//! - Bounded session concurrency with OS-backlog backpressure.
//! - Optional ledger seeding from a configuration file.
//! - Logging support with configurable log levels.
//!
//! ## Architecture Overview
//!
//! The crate is organized into several modules:
//!
//! - [`stock`](crate::stock) — A single stock: balance, entry lock, buy-wait condition.
//! - [`ledger`](crate::ledger) — The shared stock table and its structure lock.
//! - [`exchange`](crate::exchange) — The transaction processor and its outcome messages.
//! - [`request`](crate::request) — Decoding of URL targets into transactions.
//! - [`http`](crate::http) — Minimal HTTP request reading and response framing.
//! - [`admission`](crate::admission) — The session-concurrency gate.
//! - [`tcp_server`](crate::tcp_server) — The accept loop and per-session dispatch.
//! - [`defs`](crate::defs) — Shared constants.
//! - [`errors`](crate::errors) — Error types used across modules.
//!
//! ## Transaction Protocol
//!
//! Each connection carries one HTTP GET request whose URL target
//! encodes the transaction:
//!
//! - `/trans=create&stock=ACME&amount=100`
//!   Lists a new stock; repeating a name answers `Stock ACME already exists`.
//!
//! - `/trans=buy&stock=ACME&amount=10`
//!   Withdraws units. If the balance is too small the session **blocks**
//!   until sellers provide enough; a buy for an unlisted stock answers
//!   `Stock not found` immediately.
//!
//! - `/trans=sell&stock=ACME&amount=10`
//!   Deposits units and wakes blocked buyers of that stock.
//!
//! - `/trans=status&stock=ACME`
//!   Answers `Balance for stock ACME = <n>`.
//!
//! - `/trans=reset`
//!   Clears the ledger; blocked buyers of removed stocks fail over to
//!   `Stock not found`.
//!
//! Query keys may appear in any order and values are percent-decoded.
//! Anything malformed answers `Invalid request` without touching the
//! ledger. Responses are plain-text bodies in a minimal `200 OK`
//! framing; the connection closes after one transaction.
//!
//! ## Concurrency Model
//!
//! Every admitted connection runs on its own detached thread. Stocks
//! are independent: transactions on different stocks never serialize.
//! Transactions on one stock are ordered by that stock's mutex, with
//! no fairness guarantee among blocked buyers. The acceptor loop is
//! the only spawner and suspends at the admission gate while the
//! server is at capacity, so overload backs up into the OS connection
//! backlog instead of growing an unbounded thread count.
//!
//! ## Example: Running the Server
//!
//! ```no_run
//! use std::sync::Arc;
//! use exchange_server::admission::AdmissionGate;
//! use exchange_server::exchange::Exchange;
//! use exchange_server::tcp_server::TcpServer;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let exchange = Arc::new(Exchange::new());
//!     let gate = Arc::new(AdmissionGate::new(Some(16)));
//!
//!     let server = TcpServer::new("127.0.0.1:8080", exchange, gate)?;
//!     server.start()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unreachable_pub)]

pub mod admission;
pub mod defs;
pub mod errors;
pub mod exchange;
pub mod http;
pub mod ledger;
pub mod request;
pub mod stock;
pub mod tcp_server;
