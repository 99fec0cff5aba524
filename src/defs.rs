/// Server name advertised in the `Server` response header.
pub const SERVER_NAME: &str = "StockServer";

/// Content type of every response body.
///
/// The exchange protocol only ever answers with a single plain-text
/// message, so this is fixed for all responses.
pub const CONTENT_TYPE: &str = "text/plain";
