//! Bridge server implementation.
//!
//! The bridge is a two-state machine:
//! 1. Uninitialized - holds a factory; the first request whose embedded
//!    `config` validates binds the adapter
//! 2. Ready - the adapter stays bound for the lifetime of the process
//!
//! Requests are served strictly one at a time.

use std::fmt;

use opsorch_core::{Error, RawConfig, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::BridgeError;
use crate::handlers::Backend;
use crate::protocol::{Domain, ErrorFormat, Request, Response};
use crate::transport::StdioTransport;

/// Builds the backend from a request's embedded configuration.
pub type Factory = Box<dyn Fn(&RawConfig) -> Result<Backend> + Send + Sync>;

/// What to do after answering an undecodable request line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeErrorPolicy {
    /// Keep serving
    #[default]
    Continue,
    /// Stop the loop with an error
    Terminate,
}

enum State {
    Uninitialized(Factory),
    Ready(Backend),
}

/// Stdio bridge for one resource domain.
pub struct Bridge {
    domain: Domain,
    state: State,
    error_format: ErrorFormat,
    decode_error_policy: DecodeErrorPolicy,
}

impl Bridge {
    /// Create a bridge that binds its adapter from the first valid request config.
    pub fn lazy<F>(domain: Domain, factory: F) -> Self
    where
        F: Fn(&RawConfig) -> Result<Backend> + Send + Sync + 'static,
    {
        Self {
            domain,
            state: State::Uninitialized(Box::new(factory)),
            error_format: ErrorFormat::default(),
            decode_error_policy: DecodeErrorPolicy::default(),
        }
    }

    /// Create a bridge with an already-bound adapter.
    pub fn ready(backend: Backend) -> Self {
        Self {
            domain: backend.domain(),
            state: State::Ready(backend),
            error_format: ErrorFormat::default(),
            decode_error_policy: DecodeErrorPolicy::default(),
        }
    }

    pub fn with_error_format(mut self, format: ErrorFormat) -> Self {
        self.error_format = format;
        self
    }

    pub fn with_decode_error_policy(mut self, policy: DecodeErrorPolicy) -> Self {
        self.decode_error_policy = policy;
        self
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Whether an adapter is bound.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Answer a single request.
    pub async fn handle(&mut self, request: Request) -> Response {
        debug!(method = request.method.as_str(), "Handling request");

        match self.dispatch(request).await {
            Ok(result) => Response::success(result),
            Err(e) => {
                warn!(code = e.code(), error = %e, "Request failed");
                Response::error(&e, self.error_format)
            }
        }
    }

    async fn dispatch(&mut self, mut request: Request) -> Result<Value> {
        if !self.domain.supports(&request.method) {
            return Err(Error::MethodNotFound(request.method));
        }

        if let State::Uninitialized(factory) = &self.state {
            let raw = RawConfig::from(request.config.take().unwrap_or_default());
            let backend = factory(&raw)?;
            info!(
                domain = self.domain.name(),
                provider = backend.provider_name(),
                "Adapter initialized"
            );
            self.state = State::Ready(backend);
        }

        match &self.state {
            State::Ready(backend) => backend.call(&request.method, request.params).await,
            State::Uninitialized(_) => Err(Error::Provider("adapter not initialized".into())),
        }
    }

    /// Run the request loop until end of stream.
    pub async fn run(
        &mut self,
        transport: &mut StdioTransport,
    ) -> std::result::Result<(), BridgeError> {
        info!(domain = self.domain.name(), "Starting bridge");

        loop {
            match transport.read_request() {
                Ok(Some(request)) => {
                    let response = self.handle(request).await;
                    transport.write_response(&response)?;
                }
                Ok(None) => {
                    info!("EOF received, shutting down");
                    break;
                }
                Err(e) if e.is_decode() => {
                    warn!(error = %e, "Failed to decode request");
                    let error = Error::BadRequest(format!("failed to decode request: {}", e));
                    transport.write_response(&Response::error(&error, self.error_format))?;

                    if self.decode_error_policy == DecodeErrorPolicy::Terminate {
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }

        info!("Bridge stopped");
        Ok(())
    }

    /// Run the request loop over stdin/stdout.
    pub async fn serve_stdio(&mut self) -> std::result::Result<(), BridgeError> {
        let mut transport = StdioTransport::stdio();
        self.run(&mut transport).await
    }
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("domain", &self.domain)
            .field("ready", &self.is_ready())
            .field("error_format", &self.error_format)
            .field("decode_error_policy", &self.decode_error_policy)
            .finish()
    }
}
