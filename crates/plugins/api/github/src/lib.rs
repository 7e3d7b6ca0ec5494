//! GitHub adapters for OpsOrch.
//!
//! Exposes GitHub issues as tickets, GitHub Actions workflow runs as
//! deployments, and organization teams as teams, each through the
//! provider traits in `opsorch-core`.

mod adapter;
mod client;
mod deployment;
pub mod normalize;
mod team;
mod ticket;
mod types;

pub use adapter::{
    page_size, Adapter, DeploymentAdapter, Deployments, Resource, TeamAdapter, Teams,
    TicketAdapter, Tickets,
};
pub use client::GitHubClient;
pub use types::*;

/// Provider name reported by every adapter.
pub const PROVIDER_NAME: &str = "github";
