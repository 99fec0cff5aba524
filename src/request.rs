use std::borrow::Cow;

/// A decoded exchange transaction.
///
/// Produced by [`Command::parse`] from the URL target of an HTTP GET
/// request of the form `/trans=<op>&stock=<name>&amount=<n>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Remove every stock from the ledger.
    Reset,
    /// List a new stock with a starting balance.
    Create {
        /// Ticker symbol to list.
        stock: String,
        /// Starting balance.
        amount: u64,
    },
    /// Remove units from a stock, blocking until the balance suffices.
    Buy {
        /// Ticker symbol to buy.
        stock: String,
        /// Number of units to remove.
        amount: u64,
    },
    /// Add units to a stock.
    Sell {
        /// Ticker symbol to sell.
        stock: String,
        /// Number of units to add.
        amount: u64,
    },
    /// Report a stock's current balance.
    Status {
        /// Ticker symbol to look up.
        stock: String,
    },
}

impl Command {
    /// Parses the URL target of a request into a transaction.
    ///
    /// The whole target is percent-decoded first, then split into
    /// `key=value` pairs. Query keys may appear in any order; `stock`
    /// is required for everything but `reset`, and `amount` must parse
    /// as an unsigned integer for `create`, `buy` and `sell`. Returns
    /// `None` for anything malformed — unknown operations, repeated or
    /// unrecognized keys, missing fields, non-numeric or negative
    /// amounts — and the caller answers "Invalid request" without
    /// touching the ledger.
    ///
    /// # Examples
    ///
    /// ```
    /// use exchange_server::request::Command;
    ///
    /// let command = Command::parse("/trans=buy&stock=ACME&amount=10");
    /// assert_eq!(
    ///     command,
    ///     Some(Command::Buy { stock: "ACME".to_string(), amount: 10 })
    /// );
    /// assert_eq!(Command::parse("/trans=buy&stock=ACME&amount=-1"), None);
    /// ```
    pub fn parse(target: &str) -> Option<Command> {
        let query = target.strip_prefix('/')?;
        let query = decode(query)?;

        let mut trans = None;
        let mut stock = None;
        let mut amount = None;

        for pair in query.split('&') {
            let (key, value) = pair.split_once('=')?;
            let field = match key {
                "trans" => &mut trans,
                "stock" => &mut stock,
                "amount" => &mut amount,
                _ => return None,
            };
            // Repeated keys make the request ambiguous.
            if field.replace(value.to_string()).is_some() {
                return None;
            }
        }

        match trans?.as_str() {
            "reset" => Some(Command::Reset),
            "create" => Some(Command::Create {
                stock: required(stock)?,
                amount: parse_amount(amount)?,
            }),
            "buy" => Some(Command::Buy {
                stock: required(stock)?,
                amount: parse_amount(amount)?,
            }),
            "sell" => Some(Command::Sell {
                stock: required(stock)?,
                amount: parse_amount(amount)?,
            }),
            "status" => Some(Command::Status {
                stock: required(stock)?,
            }),
            _ => None,
        }
    }
}

/// Percent-decodes a request target.
///
/// A raw `+` stands for a space and is mapped before the `%XX` pass,
/// so an encoded `%2B` comes through as a literal `+`.
fn decode(target: &str) -> Option<String> {
    let mapped = target.replace('+', " ");
    urlencoding::decode(&mapped).ok().map(Cow::into_owned)
}

fn required(stock: Option<String>) -> Option<String> {
    stock.filter(|name| !name.is_empty())
}

fn parse_amount(amount: Option<String>) -> Option<u64> {
    amount?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_operation() {
        assert_eq!(Command::parse("/trans=reset"), Some(Command::Reset));
        assert_eq!(
            Command::parse("/trans=create&stock=ACME&amount=100"),
            Some(Command::Create {
                stock: "ACME".to_string(),
                amount: 100
            })
        );
        assert_eq!(
            Command::parse("/trans=sell&stock=ACME&amount=5"),
            Some(Command::Sell {
                stock: "ACME".to_string(),
                amount: 5
            })
        );
        assert_eq!(
            Command::parse("/trans=status&stock=ACME"),
            Some(Command::Status {
                stock: "ACME".to_string()
            })
        );
    }

    #[test]
    fn test_parse_key_order_is_free() {
        assert_eq!(
            Command::parse("/amount=10&trans=buy&stock=ACME"),
            Some(Command::Buy {
                stock: "ACME".to_string(),
                amount: 10
            })
        );
    }

    #[test]
    fn test_parse_percent_decodes_stock() {
        assert_eq!(
            Command::parse("/trans=status&stock=ACME%20CORP"),
            Some(Command::Status {
                stock: "ACME CORP".to_string()
            })
        );
        // Raw '+' is a space; an encoded '+' stays a plus sign.
        assert_eq!(
            Command::parse("/trans=status&stock=ACME+CORP"),
            Some(Command::Status {
                stock: "ACME CORP".to_string()
            })
        );
        assert_eq!(
            Command::parse("/trans=status&stock=A%2BB"),
            Some(Command::Status {
                stock: "A+B".to_string()
            })
        );
    }

    #[test]
    fn test_parse_rejects_malformed_amounts() {
        assert_eq!(Command::parse("/trans=buy&stock=ACME"), None);
        assert_eq!(Command::parse("/trans=buy&stock=ACME&amount=-1"), None);
        assert_eq!(Command::parse("/trans=buy&stock=ACME&amount=ten"), None);
        assert_eq!(Command::parse("/trans=buy&stock=ACME&amount="), None);
    }

    #[test]
    fn test_parse_rejects_missing_or_empty_stock() {
        assert_eq!(Command::parse("/trans=status"), None);
        assert_eq!(Command::parse("/trans=status&stock="), None);
        assert_eq!(Command::parse("/trans=create&amount=10"), None);
    }

    #[test]
    fn test_parse_rejects_unknown_operation_and_keys() {
        assert_eq!(Command::parse("/trans=steal&stock=ACME&amount=10"), None);
        assert_eq!(Command::parse("/trans=reset&verbose=1"), None);
        assert_eq!(Command::parse("/favicon.ico"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("/"), None);
    }

    #[test]
    fn test_parse_rejects_repeated_keys() {
        assert_eq!(
            Command::parse("/trans=buy&stock=ACME&amount=1&amount=2"),
            None
        );
    }
}
