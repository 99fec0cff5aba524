//! # Exchange Client
//!
//! One-shot command-line client for the exchange server. Encodes a
//! single transaction as an HTTP GET request, prints the response
//! body, and exits.
//!
//! ## Usage
//! ```text
//! exchange_client create ACME 100
//! exchange_client buy ACME 10
//! exchange_client status ACME
//! exchange_client reset
//! ```

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::process::exit;
use std::time::Duration;
use structopt::StructOpt;

/// Command-line options for the exchange client
#[derive(Debug, StructOpt)]
#[structopt(name = "exchange_client", about = "TCP client for stock transactions")]
struct Opt {
    /// Server address, e.g., 127.0.0.1:8080
    #[structopt(short, long, default_value = "127.0.0.1:8080")]
    server_addr: String,

    /// Transaction: reset, create, buy, sell or status
    trans: String,

    /// Stock ticker (required for everything but reset)
    stock: Option<String>,

    /// Amount (required for create, buy and sell)
    amount: Option<u64>,
}

/// Connects to the exchange server
fn connect(
    addr: &str,
    read_timeout: Option<Duration>,
) -> io::Result<(TcpStream, BufReader<TcpStream>)> {
    let stream = TcpStream::connect(addr)?;
    stream.set_read_timeout(read_timeout)?;
    let cloned = stream.try_clone()?;
    // Some platforms treat timeouts per-handle, so set it on the
    // cloned handle used by the reader as well.
    cloned.set_read_timeout(read_timeout)?;
    let reader = BufReader::new(cloned);
    Ok((stream, reader))
}

/// Builds the URL target for the requested transaction
fn build_target(opt: &Opt) -> String {
    let mut target = format!("/trans={}", urlencoding::encode(&opt.trans));
    if let Some(stock) = &opt.stock {
        target.push_str(&format!("&stock={}", urlencoding::encode(stock)));
    }
    if let Some(amount) = opt.amount {
        target.push_str(&format!("&amount={}", amount));
    }
    target
}

/// Sends the request and returns the response body
fn send_request(
    stream: &mut TcpStream,
    reader: &mut BufReader<TcpStream>,
    target: &str,
) -> io::Result<String> {
    write!(stream, "GET {} HTTP/1.1\r\nHost: exchange\r\n\r\n", target)?;
    stream.flush()?;

    // Skip the status line and headers
    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Server closed connection before sending a body",
            ));
        }
        if line == "\r\n" || line == "\n" {
            break;
        }
    }

    // The server closes the connection after the body
    let mut body = String::new();
    reader.read_to_string(&mut body)?;
    Ok(body)
}

fn main() {
    let opt = Opt::from_args();

    // A buy blocks server-side until the balance suffices, so it gets
    // no read timeout; every other transaction answers promptly.
    let read_timeout = if opt.trans == "buy" {
        eprintln!("note: buy requests block until the balance suffices");
        None
    } else {
        Some(Duration::from_secs(5))
    };

    let (mut stream, mut reader) = match connect(&opt.server_addr, read_timeout) {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("Failed to connect to {}: {}", opt.server_addr, e);
            exit(1);
        }
    };

    let target = build_target(&opt);
    match send_request(&mut stream, &mut reader, &target) {
        Ok(body) => println!("{}", body),
        Err(e) => {
            eprintln!("Request failed: {}", e);
            exit(1);
        }
    }
}
