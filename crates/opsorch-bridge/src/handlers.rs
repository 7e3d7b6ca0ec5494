//! Method handlers.
//!
//! A [`Backend`] wraps the adapter bound to a bridge and maps each method
//! of its domain onto the corresponding provider call.

use std::sync::Arc;

use opsorch_core::{
    DeploymentProvider, Error, Result, TeamProvider, TicketProvider, UpdateTicketInput,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::protocol::Domain;

/// The adapter a bridge dispatches to.
#[derive(Clone)]
pub enum Backend {
    Ticket(Arc<dyn TicketProvider>),
    Deployment(Arc<dyn DeploymentProvider>),
    Team(Arc<dyn TeamProvider>),
}

impl Backend {
    pub fn domain(&self) -> Domain {
        match self {
            Backend::Ticket(_) => Domain::Ticket,
            Backend::Deployment(_) => Domain::Deployment,
            Backend::Team(_) => Domain::Team,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            Backend::Ticket(p) => p.provider_name(),
            Backend::Deployment(p) => p.provider_name(),
            Backend::Team(p) => p.provider_name(),
        }
    }

    /// Execute a method with its raw params.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        match (self, method) {
            (Backend::Ticket(p), "ticket.query") => to_value(p.query(decode(params)?).await?),
            (Backend::Ticket(p), "ticket.get") => {
                let IdParams { id } = decode(params)?;
                to_value(p.get(&id).await?)
            }
            (Backend::Ticket(p), "ticket.create") => to_value(p.create(decode(params)?).await?),
            (Backend::Ticket(p), "ticket.update") => {
                let UpdateParams { id, input } = decode(params)?;
                to_value(p.update(&id, input).await?)
            }

            (Backend::Deployment(p), "deployment.query") => {
                to_value(p.query(decode(params)?).await?)
            }
            (Backend::Deployment(p), "deployment.get") => {
                let IdParams { id } = decode(params)?;
                to_value(p.get(&id).await?)
            }

            (Backend::Team(p), "team.query") => to_value(p.query(decode(params)?).await?),
            (Backend::Team(p), "team.get") => {
                let IdParams { id } = decode(params)?;
                to_value(p.get(&id).await?)
            }
            (Backend::Team(p), "team.members") => {
                let MembersParams { team_id } = decode(params)?;
                to_value(p.members(&team_id).await?)
            }

            (_, method) => Err(Error::MethodNotFound(method.to_string())),
        }
    }
}

/// Decode method params. Absent params read as an empty object.
fn decode<T: DeserializeOwned>(params: Value) -> Result<T> {
    let params = match params {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(params).map_err(|e| Error::BadRequest(format!("invalid params: {}", e)))
}

fn to_value<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

// =============================================================================
// Params
// =============================================================================

#[derive(Debug, Deserialize)]
struct IdParams {
    id: String,
}

#[derive(Debug, Deserialize)]
struct UpdateParams {
    id: String,
    #[serde(default)]
    input: UpdateTicketInput,
}

#[derive(Debug, Deserialize)]
struct MembersParams {
    #[serde(rename = "teamID", alias = "teamId", alias = "id")]
    team_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use opsorch_core::{
        CreateTicketInput, Team, TeamMember, TeamQuery, Ticket, TicketQuery,
    };
    use serde_json::json;

    struct TestTickets;

    #[async_trait]
    impl TicketProvider for TestTickets {
        fn provider_name(&self) -> &'static str {
            "test"
        }
        async fn query(&self, query: TicketQuery) -> Result<Vec<Ticket>> {
            let count = query.limit.unwrap_or(2) as usize;
            Ok((1..=count)
                .map(|n| Ticket {
                    id: n.to_string(),
                    title: format!("Ticket {}", n),
                    status: "open".into(),
                    ..Default::default()
                })
                .collect())
        }
        async fn get(&self, id: &str) -> Result<Ticket> {
            Ok(Ticket {
                id: id.to_string(),
                title: "Found".into(),
                status: "open".into(),
                ..Default::default()
            })
        }
        async fn create(&self, input: CreateTicketInput) -> Result<Ticket> {
            Ok(Ticket {
                id: "100".into(),
                title: input.title,
                status: "open".into(),
                ..Default::default()
            })
        }
        async fn update(&self, id: &str, input: UpdateTicketInput) -> Result<Ticket> {
            Ok(Ticket {
                id: id.to_string(),
                title: input.title.unwrap_or_default(),
                status: input.status.unwrap_or_else(|| "open".into()),
                ..Default::default()
            })
        }
    }

    struct TestTeams;

    #[async_trait]
    impl TeamProvider for TestTeams {
        fn provider_name(&self) -> &'static str {
            "test"
        }
        async fn query(&self, _query: TeamQuery) -> Result<Vec<Team>> {
            Ok(vec![])
        }
        async fn get(&self, id: &str) -> Result<Team> {
            Err(Error::NotFound(format!("team {}", id)))
        }
        async fn members(&self, team_id: &str) -> Result<Vec<TeamMember>> {
            Ok(vec![TeamMember {
                id: format!("{}-lead", team_id),
                handle: format!("{}-lead", team_id),
                role: "owner".into(),
                ..Default::default()
            }])
        }
    }

    fn tickets() -> Backend {
        Backend::Ticket(Arc::new(TestTickets))
    }

    fn teams() -> Backend {
        Backend::Team(Arc::new(TestTeams))
    }

    #[tokio::test]
    async fn test_ticket_query() {
        let result = tickets()
            .call("ticket.query", json!({"limit": 3}))
            .await
            .unwrap();
        assert_eq!(result.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_ticket_query_without_params() {
        let result = tickets().call("ticket.query", Value::Null).await.unwrap();
        assert_eq!(result.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ticket_get_requires_id() {
        let err = tickets().call("ticket.get", json!({})).await.unwrap_err();
        assert_eq!(err.code(), "bad_request");
        assert!(err.to_string().contains("invalid params"));
    }

    #[tokio::test]
    async fn test_ticket_update_params() {
        let result = tickets()
            .call(
                "ticket.update",
                json!({"id": "5", "input": {"title": "Renamed", "status": "closed"}}),
            )
            .await
            .unwrap();
        assert_eq!(result["id"], "5");
        assert_eq!(result["title"], "Renamed");
        assert_eq!(result["status"], "closed");
    }

    #[tokio::test]
    async fn test_ticket_create() {
        let result = tickets()
            .call("ticket.create", json!({"title": "New"}))
            .await
            .unwrap();
        assert_eq!(result["id"], "100");
        assert_eq!(result["title"], "New");
    }

    #[tokio::test]
    async fn test_team_members_param_aliases() {
        for params in [
            json!({"teamID": "platform"}),
            json!({"teamId": "platform"}),
            json!({"id": "platform"}),
        ] {
            let result = teams().call("team.members", params).await.unwrap();
            assert_eq!(result[0]["handle"], "platform-lead");
        }
    }

    #[tokio::test]
    async fn test_provider_error_passes_through() {
        let err = teams()
            .call("team.get", json!({"id": "ghost"}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[tokio::test]
    async fn test_method_of_other_domain() {
        let err = teams()
            .call("ticket.get", json!({"id": "1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MethodNotFound(m) if m == "ticket.get"));
    }

    #[test]
    fn test_backend_domain() {
        assert_eq!(tickets().domain(), Domain::Ticket);
        assert_eq!(teams().domain(), Domain::Team);
        assert_eq!(teams().provider_name(), "test");
    }
}
