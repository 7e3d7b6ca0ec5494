//! Generic adapter shared by the three resource domains.
//!
//! An [`Adapter`] owns a validated configuration and one authenticated
//! [`GitHubClient`]. The domain is selected by the [`Resource`] parameter,
//! so the ticket, deployment, and team adapters share construction and
//! differ only in the provider trait they implement.

use std::marker::PhantomData;

use opsorch_core::{OrgConfig, RawConfig, RepoConfig, Result};
use tracing::info;

use crate::client::GitHubClient;

/// Upstream page size when the caller sets no smaller limit.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A resource domain served by an [`Adapter`].
pub trait Resource: Send + Sync + 'static {
    /// Typed configuration for this domain.
    type Config: Send + Sync;

    /// Domain name used in logs.
    const KIND: &'static str;

    /// Validate an untyped configuration.
    fn validate(raw: &RawConfig) -> Result<Self::Config>;

    /// API base URL and token from a validated configuration.
    fn credentials(config: &Self::Config) -> (&str, &str);
}

/// GitHub issues.
pub struct Tickets;

/// GitHub Actions workflow runs.
pub struct Deployments;

/// GitHub organization teams.
pub struct Teams;

impl Resource for Tickets {
    type Config = RepoConfig;
    const KIND: &'static str = "ticket";

    fn validate(raw: &RawConfig) -> Result<RepoConfig> {
        RepoConfig::from_raw(raw)
    }

    fn credentials(config: &RepoConfig) -> (&str, &str) {
        (&config.base_url, &config.token)
    }
}

impl Resource for Deployments {
    type Config = RepoConfig;
    const KIND: &'static str = "deployment";

    fn validate(raw: &RawConfig) -> Result<RepoConfig> {
        RepoConfig::from_raw(raw)
    }

    fn credentials(config: &RepoConfig) -> (&str, &str) {
        (&config.base_url, &config.token)
    }
}

impl Resource for Teams {
    type Config = OrgConfig;
    const KIND: &'static str = "team";

    fn validate(raw: &RawConfig) -> Result<OrgConfig> {
        OrgConfig::from_raw(raw)
    }

    fn credentials(config: &OrgConfig) -> (&str, &str) {
        (&config.base_url, &config.token)
    }
}

/// A GitHub adapter for one resource domain.
pub struct Adapter<R: Resource> {
    config: R::Config,
    client: GitHubClient,
    _resource: PhantomData<R>,
}

pub type TicketAdapter = Adapter<Tickets>;
pub type DeploymentAdapter = Adapter<Deployments>;
pub type TeamAdapter = Adapter<Teams>;

impl<R: Resource> Adapter<R> {
    /// Validate `raw` and build the client. Makes no network call.
    pub fn new(raw: &RawConfig) -> Result<Self> {
        let config = R::validate(raw)?;
        let (base_url, token) = R::credentials(&config);
        let client = GitHubClient::with_base_url(base_url, token)?;

        info!(kind = R::KIND, base_url = base_url, "GitHub adapter initialized");

        Ok(Self {
            config,
            client,
            _resource: PhantomData,
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &R::Config {
        &self.config
    }

    pub(crate) fn client(&self) -> &GitHubClient {
        &self.client
    }
}

/// Upstream page size for a caller limit.
pub fn page_size(limit: Option<u32>) -> u32 {
    match limit {
        Some(limit) if limit > 0 && limit < MAX_PAGE_SIZE => limit,
        _ => MAX_PAGE_SIZE,
    }
}

/// Truncate filtered results to the caller limit; zero means unlimited.
pub(crate) fn truncate<T>(items: &mut Vec<T>, limit: Option<u32>) {
    if let Some(limit) = limit.filter(|l| *l > 0) {
        items.truncate(limit as usize);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsorch_core::Error;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawConfig {
        match value {
            serde_json::Value::Object(map) => RawConfig::new(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_page_size() {
        assert_eq!(page_size(None), 100);
        assert_eq!(page_size(Some(0)), 100);
        assert_eq!(page_size(Some(5)), 5);
        assert_eq!(page_size(Some(99)), 99);
        assert_eq!(page_size(Some(100)), 100);
        assert_eq!(page_size(Some(500)), 100);
    }

    #[test]
    fn test_truncate() {
        let mut items = vec![1, 2, 3, 4, 5, 6];
        truncate(&mut items, Some(4));
        assert_eq!(items, vec![1, 2, 3, 4]);

        let mut items = vec![1, 2, 3];
        truncate(&mut items, Some(0));
        assert_eq!(items.len(), 3);

        truncate(&mut items, None);
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_ticket_adapter_rejects_missing_owner() {
        let result = TicketAdapter::new(&raw(json!({"token": "t", "repo": "r"})));
        assert!(matches!(result, Err(Error::MissingField(key)) if key == "owner"));
    }

    #[test]
    fn test_team_adapter_requires_organization() {
        let result = TeamAdapter::new(&raw(json!({"token": "t", "owner": "o", "repo": "r"})));
        assert!(matches!(result, Err(Error::MissingField(key)) if key == "organization"));
    }

    #[test]
    fn test_deployment_adapter_keeps_config() {
        let adapter = DeploymentAdapter::new(&raw(json!({
            "token": "t",
            "owner": "acme",
            "repo": "widgets",
            "baseUrl": "http://127.0.0.1:1"
        })))
        .unwrap();

        assert_eq!(adapter.config().repo, "widgets");
        assert_eq!(adapter.config().base_url, "http://127.0.0.1:1");
    }
}
