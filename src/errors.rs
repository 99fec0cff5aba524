use thiserror::Error;

/// Errors returned from the [`Exchange`](crate::exchange::Exchange).
///
/// Transaction outcomes (unknown stock, duplicate create, malformed
/// request) are not errors: they are ordinary response messages. This
/// enum only covers failures to construct the exchange itself.
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// Seed file is missing, unreadable, or contains a malformed line.
    #[error("Invalid exchange config: {0}")]
    InvalidConfig(String),
}

/// Errors produced by the TCP server subsystem.
///
/// These include I/O errors on the listener or on a specific client
/// connection. A `ClientIoError` is confined to its own session and
/// never tears down the server.
#[derive(Error, Debug)]
pub enum TcpServerError {
    /// The TCP listener failed to bind to the specified address/port.
    #[error("Failed to bind TCP listener: {0}")]
    BindError(String),

    /// Error while accepting an incoming TCP client connection.
    #[error("Failed to accept TCP connection: {0}")]
    AcceptError(String),

    /// I/O error during communication with a specific client.
    #[error("Client IO error: {0}")]
    ClientIoError(String),
}

/// High-level errors returned by the server and client binaries.
///
/// These errors are used at the application entry point for formatting
/// user-facing error messages and wrapping lower-level failures.
#[derive(Error, Debug)]
pub enum CliError {
    /// General wrapper around any textual failure.
    #[error("Cli failed with error: {0}")]
    GeneralError(String),
}

impl From<ExchangeError> for CliError {
    fn from(err: ExchangeError) -> Self {
        CliError::GeneralError(err.to_string())
    }
}

impl From<TcpServerError> for CliError {
    fn from(err: TcpServerError) -> Self {
        CliError::GeneralError(err.to_string())
    }
}
