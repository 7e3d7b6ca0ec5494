//! Core traits, types, and error handling for the OpsOrch GitHub adapter.
//!
//! This crate provides the canonical resource model (tickets, deployments,
//! teams) that every provider normalizes into, plus configuration validation.

pub mod config;
pub mod error;
pub mod provider;
pub mod types;

pub use config::{OrgConfig, RawConfig, RepoConfig};
pub use error::{Error, Result};
pub use provider::{DeploymentProvider, TeamProvider, TicketProvider};
pub use types::{
    CreateTicketInput, Deployment, DeploymentQuery, Fields, QueryScope, Team, TeamMember,
    TeamQuery, Ticket, TicketQuery, UpdateTicketInput,
};
