//! Transport layer for the plugin protocol.
//!
//! Newline-delimited JSON over stdin/stdout.

use std::io::{self, BufRead, Write};

use crate::error::BridgeError;
use crate::protocol::{Request, Response};

/// Transport for reading requests and writing responses.
pub struct StdioTransport {
    reader: Box<dyn BufRead + Send>,
    writer: Box<dyn Write + Send>,
}

impl StdioTransport {
    /// Create a transport using stdin/stdout.
    pub fn stdio() -> Self {
        Self {
            reader: Box::new(io::BufReader::new(io::stdin())),
            writer: Box::new(io::stdout()),
        }
    }

    /// Create a transport with custom reader/writer.
    pub fn new(reader: Box<dyn BufRead + Send>, writer: Box<dyn Write + Send>) -> Self {
        Self { reader, writer }
    }

    /// Read the next request, skipping blank lines.
    ///
    /// Returns `Ok(None)` at end of stream.
    pub fn read_request(&mut self) -> Result<Option<Request>, BridgeError> {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if self.reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(None);
            }

            let line = String::from_utf8(std::mem::take(&mut buf)).map_err(BridgeError::Utf8)?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            tracing::debug!(line = trimmed, "Received");

            return serde_json::from_str(trimmed)
                .map(Some)
                .map_err(BridgeError::Decode);
        }
    }

    /// Write a response as a single line and flush.
    pub fn write_response(&mut self, response: &Response) -> Result<(), BridgeError> {
        let json = serde_json::to_string(response).map_err(BridgeError::Encode)?;

        tracing::debug!(line = json.as_str(), "Sending");

        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;
        Ok(())
    }
}
