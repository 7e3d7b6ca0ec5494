//! Wire types for the plugin stdio protocol.
//!
//! One JSON object per line in each direction. A request names a method,
//! optionally embeds the adapter configuration, and carries the method
//! parameters under `params` (or `payload`). A response carries either a
//! `result` or an `error`.

use opsorch_core::Error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ticket domain methods.
pub const TICKET_METHODS: &[&str] = &[
    "ticket.query",
    "ticket.get",
    "ticket.create",
    "ticket.update",
];

/// Deployment domain methods.
pub const DEPLOYMENT_METHODS: &[&str] = &["deployment.query", "deployment.get"];

/// Team domain methods.
pub const TEAM_METHODS: &[&str] = &["team.query", "team.get", "team.members"];

/// Resource domain served by a bridge process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Ticket,
    Deployment,
    Team,
}

impl Domain {
    pub fn name(self) -> &'static str {
        match self {
            Domain::Ticket => "ticket",
            Domain::Deployment => "deployment",
            Domain::Team => "team",
        }
    }

    /// The fixed dispatch table for this domain.
    pub fn methods(self) -> &'static [&'static str] {
        match self {
            Domain::Ticket => TICKET_METHODS,
            Domain::Deployment => DEPLOYMENT_METHODS,
            Domain::Team => TEAM_METHODS,
        }
    }

    pub fn supports(self, method: &str) -> bool {
        self.methods().contains(&method)
    }
}

/// Incoming request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    /// Adapter configuration; only read before the adapter is bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
    #[serde(default, alias = "payload")]
    pub params: Value,
}

impl Request {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            config: None,
            params,
        }
    }

    pub fn with_config(mut self, config: Map<String, Value>) -> Self {
        self.config = Some(config);
        self
    }
}

/// How errors are rendered on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorFormat {
    /// A single human-readable string
    #[default]
    Text,
    /// `{code, message}` with the canonical error code
    Structured,
}

/// Error payload of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorBody {
    Text(String),
    Detailed { code: String, message: String },
}

impl ErrorBody {
    pub fn from_error(error: &Error, format: ErrorFormat) -> Self {
        match format {
            ErrorFormat::Text => ErrorBody::Text(error.to_string()),
            ErrorFormat::Structured => ErrorBody::Detailed {
                code: error.code().to_string(),
                message: error.message(),
            },
        }
    }

    /// Canonical error code, when the payload carries one.
    pub fn code(&self) -> Option<&str> {
        match self {
            ErrorBody::Text(_) => None,
            ErrorBody::Detailed { code, .. } => Some(code),
        }
    }
}

/// Outgoing response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    /// Create a successful response.
    pub fn success(result: Value) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(error: &Error, format: ErrorFormat) -> Self {
        Self {
            result: None,
            error: Some(ErrorBody::from_error(error, format)),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_params() {
        let req: Request =
            serde_json::from_str(r#"{"method":"ticket.get","params":{"id":"7"}}"#).unwrap();
        assert_eq!(req.method, "ticket.get");
        assert_eq!(req.params, json!({"id": "7"}));
        assert!(req.config.is_none());
    }

    #[test]
    fn test_request_payload_alias_and_config() {
        let req: Request = serde_json::from_str(
            r#"{"method":"ticket.get","config":{"token":"t"},"payload":{"id":"7"}}"#,
        )
        .unwrap();
        assert_eq!(req.params, json!({"id": "7"}));
        assert_eq!(req.config.unwrap()["token"], "t");
    }

    #[test]
    fn test_request_without_params() {
        let req: Request = serde_json::from_str(r#"{"method":"team.query"}"#).unwrap();
        assert_eq!(req.params, Value::Null);
    }

    #[test]
    fn test_request_requires_method() {
        assert!(serde_json::from_str::<Request>(r#"{"params":{}}"#).is_err());
    }

    #[test]
    fn test_domain_tables() {
        assert!(Domain::Ticket.supports("ticket.update"));
        assert!(!Domain::Ticket.supports("deployment.get"));
        assert!(Domain::Deployment.supports("deployment.query"));
        assert!(!Domain::Deployment.supports("deployment.create"));
        assert!(Domain::Team.supports("team.members"));
        assert_eq!(Domain::Team.methods().len(), 3);
        assert_eq!(Domain::Ticket.name(), "ticket");
    }

    #[test]
    fn test_response_success() {
        let resp = Response::success(json!([{"id": "1"}]));
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"result":[{"id":"1"}]}"#);
        assert!(!resp.is_error());
    }

    #[test]
    fn test_response_text_error() {
        let resp = Response::error(&Error::MissingField("token".into()), ErrorFormat::Text);
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"error":"token is required"}"#);
    }

    #[test]
    fn test_response_structured_error() {
        let resp = Response::error(
            &Error::MethodNotFound("team.delete".into()),
            ErrorFormat::Structured,
        );
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            value,
            json!({"error": {"code": "method_not_found", "message": "unknown method: team.delete"}})
        );
        assert_eq!(resp.error.unwrap().code(), Some("method_not_found"));
    }

    #[test]
    fn test_error_body_deserializes_both_shapes() {
        let text: ErrorBody = serde_json::from_value(json!("boom")).unwrap();
        assert_eq!(text, ErrorBody::Text("boom".into()));
        assert_eq!(text.code(), None);

        let detailed: ErrorBody =
            serde_json::from_value(json!({"code": "not_found", "message": "gone"})).unwrap();
        assert_eq!(detailed.code(), Some("not_found"));
    }
}
