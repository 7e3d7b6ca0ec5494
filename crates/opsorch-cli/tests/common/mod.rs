//! Helpers for driving a bridge over in-memory I/O.

use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use opsorch_bridge::{Bridge, BridgeError, StdioTransport};
use serde_json::Value;

/// Writer appending into a shared buffer.
pub struct SharedWriter(pub Arc<Mutex<Vec<u8>>>);

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Outcome of a bridge session.
pub struct Session {
    pub result: Result<(), BridgeError>,
    pub responses: Vec<Value>,
}

/// Feed `lines` to the bridge and collect every response line.
pub async fn run_session(bridge: &mut Bridge, lines: &[String]) -> Session {
    let mut input = lines.join("\n");
    input.push('\n');

    let buffer = Arc::new(Mutex::new(Vec::new()));
    let mut transport = StdioTransport::new(
        Box::new(Cursor::new(input)),
        Box::new(SharedWriter(buffer.clone())),
    );

    let result = bridge.run(&mut transport).await;

    let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    let responses = output
        .lines()
        .map(|line| serde_json::from_str(line).expect("response is JSON"))
        .collect();

    Session { result, responses }
}

/// Serialize a request value to one protocol line.
pub fn line(value: Value) -> String {
    value.to_string()
}
