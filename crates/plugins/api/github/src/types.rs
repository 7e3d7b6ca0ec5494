//! GitHub API response types.
//!
//! These types represent the raw JSON responses from GitHub API.
//! They are deserialized and then mapped to canonical types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// User
// =============================================================================

/// GitHub user representation.
///
/// List endpoints return the short form; `/users/{login}` fills in the
/// profile fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubUser {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub site_admin: bool,
    #[serde(default, rename = "type")]
    pub user_type: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub twitter_username: Option<String>,
    #[serde(default)]
    pub public_repos: Option<u64>,
    #[serde(default)]
    pub followers: Option<u64>,
    #[serde(default)]
    pub following: Option<u64>,
}

// =============================================================================
// Issue
// =============================================================================

/// GitHub issue representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubIssue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: String,
    pub html_url: String,
    #[serde(default)]
    pub user: Option<GitHubUser>,
    #[serde(default)]
    pub assignees: Vec<GitHubUser>,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    #[serde(default)]
    pub milestone: Option<GitHubMilestone>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    /// PRs are also returned by /issues endpoint, this field distinguishes them
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

/// GitHub label representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubLabel {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// GitHub milestone representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubMilestone {
    #[serde(default)]
    pub number: u64,
    pub title: String,
}

// =============================================================================
// Actions
// =============================================================================

/// Envelope returned by `/actions/runs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRunList {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub workflow_runs: Vec<GitHubWorkflowRun>,
}

/// GitHub Actions workflow run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubWorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub head_branch: Option<String>,
    #[serde(default)]
    pub head_sha: String,
    /// queued, in_progress, completed, ...
    #[serde(default)]
    pub status: Option<String>,
    /// success, failure, cancelled, skipped, timed_out, action_required, ...
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub run_number: Option<u64>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actor: Option<GitHubUser>,
    #[serde(default)]
    pub head_commit: Option<GitHubHeadCommit>,
}

/// Commit a workflow run was triggered for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubHeadCommit {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: String,
}

// =============================================================================
// Organizations and teams
// =============================================================================

/// GitHub organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubOrganization {
    pub id: u64,
    pub login: String,
}

/// GitHub team.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubTeam {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    /// secret or closed
    #[serde(default)]
    pub privacy: Option<String>,
    #[serde(default)]
    pub permission: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub members_url: Option<String>,
    #[serde(default)]
    pub repositories_url: Option<String>,
    #[serde(default)]
    pub members_count: Option<u64>,
    #[serde(default)]
    pub repos_count: Option<u64>,
    #[serde(default)]
    pub parent: Option<GitHubTeamParent>,
}

/// Parent reference embedded in a team.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubTeamParent {
    pub id: u64,
    #[serde(default)]
    pub slug: String,
}

/// A user's membership in a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubMembership {
    /// member or maintainer
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub state: Option<String>,
}

// =============================================================================
// Query parameters
// =============================================================================

/// Query parameters for listing repository issues.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssueListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Comma-separated label names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    pub per_page: u32,
}

/// Query parameters for listing workflow runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkflowRunListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    pub per_page: u32,
}

// =============================================================================
// Create/Update types
// =============================================================================

/// Request body for creating an issue.
#[derive(Debug, Clone, Serialize)]
pub struct CreateIssueRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
}

/// Request body for updating an issue.
#[derive(Debug, Clone, Serialize, Default)]
pub struct UpdateIssueRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
}
