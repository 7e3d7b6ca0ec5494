//! GitHub API client implementation.
//!
//! The client is a thin authenticated transport: it returns GitHub-native
//! records and maps non-success statuses to canonical errors. All
//! normalization happens in the adapters.

use opsorch_core::{Error, Result};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::types::{
    CreateIssueRequest, GitHubIssue, GitHubMembership, GitHubOrganization, GitHubTeam, GitHubUser,
    GitHubWorkflowRun, IssueListOptions, UpdateIssueRequest, WorkflowRunList,
    WorkflowRunListOptions,
};

/// Empty query string.
const NO_QUERY: &[(&str, &str)] = &[];

/// Query parameter carrying only a page size.
#[derive(Serialize)]
struct PerPage {
    per_page: u32,
}

/// Authenticated GitHub API client.
pub struct GitHubClient {
    base_url: Url,
    token: String,
    client: reqwest::Client,
}

impl GitHubClient {
    /// Create a new GitHub client with a custom base URL.
    pub fn with_base_url(base_url: impl AsRef<str>, token: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| Error::BadRequest(format!("invalid baseUrl: {}", base_url.as_ref())))?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("opsorch-github/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            token: token.into(),
            client,
        })
    }

    /// Get the API URL for a path, percent-encoding each segment.
    fn api_url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }

    /// Build request with common headers.
    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Make an authenticated GET request with typed deserialization.
    async fn get<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        url: &str,
        query: &Q,
    ) -> Result<T> {
        debug!(url = url, "GitHub GET request");

        let response = self
            .request(reqwest::Method::GET, url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Make an authenticated POST request.
    async fn post<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> Result<T> {
        debug!(url = url, "GitHub POST request");

        let response = self
            .request(reqwest::Method::POST, url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Make an authenticated PATCH request.
    async fn patch<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> Result<T> {
        debug!(url = url, "GitHub PATCH request");

        let response = self
            .request(reqwest::Method::PATCH, url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Handle response and map errors.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            warn!(
                status = status_code,
                message = message.as_str(),
                "GitHub API error response"
            );
            return Err(Error::from_status(status_code, message));
        }

        response
            .json()
            .await
            .map_err(|e| Error::InvalidData(format!("Failed to parse response: {}", e)))
    }

    // =========================================================================
    // Issues
    // =========================================================================

    /// List the first page of repository issues.
    pub async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        options: &IssueListOptions,
    ) -> Result<Vec<GitHubIssue>> {
        let url = self.api_url(&["repos", owner, repo, "issues"]);
        self.get(&url, options).await
    }

    pub async fn get_issue(&self, owner: &str, repo: &str, number: u64) -> Result<GitHubIssue> {
        let url = self.api_url(&["repos", owner, repo, "issues", &number.to_string()]);
        self.get(&url, NO_QUERY).await
    }

    pub async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        request: &CreateIssueRequest,
    ) -> Result<GitHubIssue> {
        let url = self.api_url(&["repos", owner, repo, "issues"]);
        self.post(&url, request).await
    }

    pub async fn edit_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        request: &UpdateIssueRequest,
    ) -> Result<GitHubIssue> {
        let url = self.api_url(&["repos", owner, repo, "issues", &number.to_string()]);
        self.patch(&url, request).await
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// List the first page of repository workflow runs.
    pub async fn list_workflow_runs(
        &self,
        owner: &str,
        repo: &str,
        options: &WorkflowRunListOptions,
    ) -> Result<Vec<GitHubWorkflowRun>> {
        let url = self.api_url(&["repos", owner, repo, "actions", "runs"]);
        let list: WorkflowRunList = self.get(&url, options).await?;
        Ok(list.workflow_runs)
    }

    pub async fn get_workflow_run(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> Result<GitHubWorkflowRun> {
        let url = self.api_url(&[
            "repos",
            owner,
            repo,
            "actions",
            "runs",
            &run_id.to_string(),
        ]);
        self.get(&url, NO_QUERY).await
    }

    // =========================================================================
    // Organizations and teams
    // =========================================================================

    pub async fn get_organization(&self, org: &str) -> Result<GitHubOrganization> {
        let url = self.api_url(&["orgs", org]);
        self.get(&url, NO_QUERY).await
    }

    /// List the first page of organization teams.
    pub async fn list_teams(&self, org: &str, per_page: u32) -> Result<Vec<GitHubTeam>> {
        let url = self.api_url(&["orgs", org, "teams"]);
        self.get(&url, &PerPage { per_page }).await
    }

    pub async fn get_team_by_slug(&self, org: &str, slug: &str) -> Result<GitHubTeam> {
        let url = self.api_url(&["orgs", org, "teams", slug]);
        self.get(&url, NO_QUERY).await
    }

    pub async fn get_team_by_id(&self, org_id: u64, team_id: u64) -> Result<GitHubTeam> {
        let url = self.api_url(&[
            "organizations",
            &org_id.to_string(),
            "team",
            &team_id.to_string(),
        ]);
        self.get(&url, NO_QUERY).await
    }

    /// List the first page of team members (short user records).
    pub async fn list_team_members(
        &self,
        org_id: u64,
        team_id: u64,
        per_page: u32,
    ) -> Result<Vec<GitHubUser>> {
        let url = self.api_url(&[
            "organizations",
            &org_id.to_string(),
            "team",
            &team_id.to_string(),
            "members",
        ]);
        self.get(&url, &PerPage { per_page }).await
    }

    pub async fn get_team_membership(
        &self,
        org_id: u64,
        team_id: u64,
        login: &str,
    ) -> Result<GitHubMembership> {
        let url = self.api_url(&[
            "organizations",
            &org_id.to_string(),
            "team",
            &team_id.to_string(),
            "memberships",
            login,
        ]);
        self.get(&url, NO_QUERY).await
    }

    /// Get the full profile of a user.
    pub async fn get_user(&self, login: &str) -> Result<GitHubUser> {
        let url = self.api_url(&["users", login]);
        self.get(&url, NO_QUERY).await
    }
}

/// Extract the `message` field of a GitHub error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
