//! Tickets backed by GitHub issues.

use async_trait::async_trait;
use opsorch_core::types::{string_list, Fields};
use opsorch_core::{
    CreateTicketInput, Error, Result, Ticket, TicketProvider, TicketQuery, UpdateTicketInput,
};
use serde_json::Value;
use tracing::debug;

use crate::adapter::{page_size, truncate, TicketAdapter};
use crate::normalize::{
    issue_state_alias, normalize_issue_state, update_state, STATUS_CLOSED, STATUS_OPEN,
};
use crate::types::{CreateIssueRequest, GitHubIssue, IssueListOptions, UpdateIssueRequest};
use crate::PROVIDER_NAME;

// =============================================================================
// Mapping functions
// =============================================================================

fn map_issue(issue: &GitHubIssue) -> Ticket {
    let mut fields = Fields::new();
    fields.insert("url".into(), Value::String(issue.html_url.clone()));
    if !issue.labels.is_empty() {
        fields.insert(
            "labels".into(),
            issue
                .labels
                .iter()
                .map(|l| Value::String(l.name.clone()))
                .collect(),
        );
    }
    if let Some(milestone) = &issue.milestone {
        fields.insert("milestone".into(), Value::String(milestone.title.clone()));
    }

    Ticket {
        id: issue.number.to_string(),
        title: issue.title.clone(),
        description: issue.body.clone().unwrap_or_default(),
        status: normalize_issue_state(&issue.state),
        assignees: issue.assignees.iter().map(|u| u.login.clone()).collect(),
        reporter: issue
            .user
            .as_ref()
            .map(|u| u.login.clone())
            .unwrap_or_default(),
        url: issue.html_url.clone(),
        created_at: issue.created_at,
        updated_at: issue.updated_at,
        fields,
        metadata: Fields::new(),
    }
}

fn parse_issue_number(id: &str) -> Result<u64> {
    id.trim()
        .parse()
        .map_err(|_| Error::BadRequest(format!("invalid issue number: {}", id)))
}

/// Upstream `state` for a set of requested statuses.
fn state_filter(statuses: &[String], default_state: &str) -> String {
    if statuses.is_empty() {
        return default_state.to_string();
    }

    let open = statuses
        .iter()
        .any(|s| issue_state_alias(s) == Some(STATUS_OPEN));
    let closed = statuses
        .iter()
        .any(|s| issue_state_alias(s) == Some(STATUS_CLOSED));

    match (open, closed) {
        (true, false) => STATUS_OPEN.to_string(),
        (false, true) => STATUS_CLOSED.to_string(),
        _ => "all".to_string(),
    }
}

fn build_list_options(query: &TicketQuery, default_state: &str) -> IssueListOptions {
    let labels = string_list(&query.metadata, "labels")
        .filter(|labels| !labels.is_empty())
        .map(|labels| labels.join(","));

    IssueListOptions {
        state: Some(state_filter(&query.statuses, default_state)),
        labels,
        assignee: query.scope.team.clone().filter(|t| !t.is_empty()),
        per_page: page_size(query.limit),
    }
}

/// Client-side refinement applied to a converted ticket.
fn matches_query(ticket: &Ticket, query: &TicketQuery) -> bool {
    if !query.statuses.is_empty() {
        let status = ticket.status.to_lowercase();
        if !query.statuses.iter().any(|s| update_state(s) == status) {
            return false;
        }
    }

    if let Some(text) = query.query.as_deref().filter(|q| !q.is_empty()) {
        let text = text.to_lowercase();
        if !ticket.title.to_lowercase().contains(&text)
            && !ticket.description.to_lowercase().contains(&text)
        {
            return false;
        }
    }

    true
}

fn build_update_request(input: &UpdateTicketInput) -> UpdateIssueRequest {
    let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

    UpdateIssueRequest {
        title: non_empty(&input.title),
        body: non_empty(&input.description),
        state: non_empty(&input.status).map(|s| update_state(&s)),
        assignees: input.assignees.clone().filter(|a| !a.is_empty()),
    }
}

// =============================================================================
// TicketProvider implementation
// =============================================================================

#[async_trait]
impl TicketProvider for TicketAdapter {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn query(&self, query: TicketQuery) -> Result<Vec<Ticket>> {
        let config = self.config();
        let options = build_list_options(&query, &config.default_state);
        debug!(state = ?options.state, per_page = options.per_page, "Querying tickets");

        let issues = self
            .client()
            .list_issues(&config.owner, &config.repo, &options)
            .await?;

        let mut tickets: Vec<Ticket> = issues
            .iter()
            .filter(|issue| issue.pull_request.is_none())
            .map(map_issue)
            .filter(|ticket| matches_query(ticket, &query))
            .collect();
        truncate(&mut tickets, query.limit);

        Ok(tickets)
    }

    async fn get(&self, id: &str) -> Result<Ticket> {
        let number = parse_issue_number(id)?;
        let config = self.config();
        let issue = self
            .client()
            .get_issue(&config.owner, &config.repo, number)
            .await?;
        Ok(map_issue(&issue))
    }

    async fn create(&self, input: CreateTicketInput) -> Result<Ticket> {
        let config = self.config();
        let request = CreateIssueRequest {
            title: input.title,
            body: Some(input.description).filter(|d| !d.is_empty()),
            labels: string_list(&input.metadata, "labels").unwrap_or_default(),
            assignees: string_list(&input.fields, "assignees").unwrap_or_default(),
        };

        let issue = self
            .client()
            .create_issue(&config.owner, &config.repo, &request)
            .await?;
        Ok(map_issue(&issue))
    }

    async fn update(&self, id: &str, input: UpdateTicketInput) -> Result<Ticket> {
        let number = parse_issue_number(id)?;
        let config = self.config();
        let request = build_update_request(&input);

        let issue = self
            .client()
            .edit_issue(&config.owner, &config.repo, number, &request)
            .await?;
        Ok(map_issue(&issue))
    }
}
