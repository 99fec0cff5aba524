use crate::defs::{CONTENT_TYPE, SERVER_NAME};

use std::io::{self, BufRead, ErrorKind, Write};

/// Reads one HTTP request and returns its URL target.
///
/// Consumes the request line (`GET /... HTTP/1.1`) and every header up
/// to the blank line. Headers have to be drained even though none of
/// them matter here, otherwise browsers keep the request open. A
/// request line without a target yields an empty string, which fails
/// command parsing downstream.
pub fn read_request<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            ErrorKind::UnexpectedEof,
            "connection closed before request line",
        ));
    }

    let target = line.split_whitespace().nth(1).unwrap_or("").to_string();

    loop {
        let mut header = String::new();
        let read = reader.read_line(&mut header)?;
        if read == 0 || header == "\r\n" || header == "\n" {
            break;
        }
    }

    Ok(target)
}

/// Writes a plain-text message as a minimal HTTP/1.1 response.
///
/// Every decoded-or-not transaction answers `200 OK` with the outcome
/// message as the body; only transport failures end a session without
/// a response.
pub fn write_response<W: Write>(writer: &mut W, message: &str) -> io::Result<()> {
    write!(
        writer,
        "HTTP/1.1 200 OK\r\n\
         Server: {}\r\n\
         Content-Length: {}\r\n\
         Connection: Close\r\n\
         Content-Type: {}\r\n\
         \r\n\
         {}",
        SERVER_NAME,
        message.len(),
        CONTENT_TYPE,
        message
    )?;
    writer.flush()
}
