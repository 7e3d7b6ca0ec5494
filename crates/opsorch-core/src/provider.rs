//! Provider traits for the three canonical resource domains.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    CreateTicketInput, Deployment, DeploymentQuery, Team, TeamMember, TeamQuery, Ticket,
    TicketQuery, UpdateTicketInput,
};

/// Trait for ticket providers (issue trackers).
#[async_trait]
pub trait TicketProvider: Send + Sync {
    /// Get the provider name (e.g., "github")
    fn provider_name(&self) -> &'static str;

    /// Query tickets matching the filters (first page only)
    async fn query(&self, query: TicketQuery) -> Result<Vec<Ticket>>;

    /// Get a single ticket by ID
    async fn get(&self, id: &str) -> Result<Ticket>;

    /// Create a ticket
    async fn create(&self, input: CreateTicketInput) -> Result<Ticket>;

    /// Apply a partial update to a ticket
    async fn update(&self, id: &str, input: UpdateTicketInput) -> Result<Ticket>;
}

/// Trait for deployment providers (CI/CD systems). Read-only.
#[async_trait]
pub trait DeploymentProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Query deployments matching the filters (first page only)
    async fn query(&self, query: DeploymentQuery) -> Result<Vec<Deployment>>;

    /// Get a single deployment by ID
    async fn get(&self, id: &str) -> Result<Deployment>;
}

/// Trait for team providers (org membership).
#[async_trait]
pub trait TeamProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Query teams matching the filters
    async fn query(&self, query: TeamQuery) -> Result<Vec<Team>>;

    /// Get a team by numeric ID or slug
    async fn get(&self, id: &str) -> Result<Team>;

    /// List the members of a team identified by numeric ID or slug
    async fn members(&self, team_id: &str) -> Result<Vec<TeamMember>>;
}
