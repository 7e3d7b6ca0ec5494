//! Stdio bridge for OpsOrch plugins.
//!
//! A plugin process reads one JSON request per line from stdin, dispatches
//! it to the adapter of its resource domain, and writes one JSON response
//! per line to stdout.

pub mod error;
pub mod handlers;
pub mod protocol;
pub mod server;
pub mod transport;

pub use error::BridgeError;
pub use handlers::Backend;
pub use protocol::{Domain, ErrorBody, ErrorFormat, Request, Response};
pub use server::{Bridge, DecodeErrorPolicy, Factory};
pub use transport::StdioTransport;
