//! Deployments backed by GitHub Actions workflow runs.

use async_trait::async_trait;
use opsorch_core::types::{string_field, Fields};
use opsorch_core::{Deployment, DeploymentProvider, DeploymentQuery, Error, Result};
use serde_json::{json, Value};
use tracing::debug;

use crate::adapter::{page_size, truncate, DeploymentAdapter};
use crate::normalize::{infer_environment, normalize_run_status, run_status_filter, short_sha};
use crate::types::{GitHubWorkflowRun, WorkflowRunListOptions};
use crate::PROVIDER_NAME;

// =============================================================================
// Mapping functions
// =============================================================================

fn map_workflow_run(run: &GitHubWorkflowRun, repo: &str) -> Deployment {
    let name = run.name.as_deref().unwrap_or_default();
    let branch = run.head_branch.as_deref().unwrap_or_default();

    let mut fields = Fields::new();
    fields.insert("workflow_name".into(), Value::String(name.to_string()));
    fields.insert("branch".into(), Value::String(branch.to_string()));
    fields.insert("commit".into(), Value::String(run.head_sha.clone()));
    if let Some(commit) = &run.head_commit {
        fields.insert(
            "commit_message".into(),
            Value::String(commit.message.clone()),
        );
    }

    if let Some(event) = &run.event {
        fields.insert("event".into(), Value::String(event.clone()));
    }
    if let Some(run_number) = run.run_number {
        fields.insert("run_number".into(), json!(run_number));
    }

    let mut actor = Fields::new();
    if let Some(user) = &run.actor {
        actor.insert("login".into(), Value::String(user.login.clone()));
    }

    Deployment {
        id: run.id.to_string(),
        status: normalize_run_status(
            run.status.as_deref().unwrap_or_default(),
            run.conclusion.as_deref().unwrap_or_default(),
        ),
        url: run.html_url.clone(),
        service: repo.to_string(),
        environment: infer_environment(name, branch),
        version: short_sha(&run.head_sha),
        started_at: run.created_at,
        finished_at: run.updated_at,
        actor,
        fields,
        metadata: Fields::new(),
    }
}

fn parse_run_id(id: &str) -> Result<u64> {
    id.trim()
        .parse()
        .map_err(|_| Error::BadRequest(format!("invalid workflow run ID: {}", id)))
}

/// Upstream `status` when every requested status agrees on one.
fn status_filter(statuses: &[String]) -> Option<String> {
    let mut mapped = statuses.iter().map(|s| run_status_filter(s));
    let first = mapped.next()??;
    mapped
        .all(|s| s == Some(first))
        .then(|| first.to_string())
}

fn build_list_options(query: &DeploymentQuery) -> WorkflowRunListOptions {
    let meta = |key: &str| string_field(&query.metadata, key).map(str::to_string);

    WorkflowRunListOptions {
        status: status_filter(&query.statuses),
        branch: meta("branch"),
        actor: meta("actor"),
        event: meta("event"),
        per_page: page_size(query.limit),
    }
}

/// Client-side refinement applied to a converted deployment.
fn matches_query(deployment: &Deployment, query: &DeploymentQuery) -> bool {
    if !query.statuses.is_empty()
        && !query
            .statuses
            .iter()
            .any(|s| s.eq_ignore_ascii_case(&deployment.status))
    {
        return false;
    }

    let scope = &query.scope;
    if let Some(service) = scope.service.as_deref().filter(|s| !s.is_empty()) {
        if deployment.service != service {
            return false;
        }
    }
    if let Some(environment) = scope.environment.as_deref().filter(|e| !e.is_empty()) {
        if deployment.environment != environment {
            return false;
        }
    }

    true
}

// =============================================================================
// DeploymentProvider implementation
// =============================================================================

#[async_trait]
impl DeploymentProvider for DeploymentAdapter {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn query(&self, query: DeploymentQuery) -> Result<Vec<Deployment>> {
        let config = self.config();
        let options = build_list_options(&query);
        debug!(status = ?options.status, per_page = options.per_page, "Querying workflow runs");

        let runs = self
            .client()
            .list_workflow_runs(&config.owner, &config.repo, &options)
            .await?;

        let mut deployments: Vec<Deployment> = runs
            .iter()
            .map(|run| map_workflow_run(run, &config.repo))
            .filter(|deployment| matches_query(deployment, &query))
            .collect();
        truncate(&mut deployments, query.limit);

        Ok(deployments)
    }

    async fn get(&self, id: &str) -> Result<Deployment> {
        let run_id = parse_run_id(id)?;
        let config = self.config();
        let run = self
            .client()
            .get_workflow_run(&config.owner, &config.repo, run_id)
            .await?;
        Ok(map_workflow_run(&run, &config.repo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GitHubHeadCommit, GitHubUser};

    fn sample_run() -> GitHubWorkflowRun {
        GitHubWorkflowRun {
            id: 9001,
            name: Some("Deploy to Production".into()),
            head_branch: Some("main".into()),
            head_sha: "abcdef0123456789".into(),
            status: Some("completed".into()),
            conclusion: Some("success".into()),
            event: Some("push".into()),
            run_number: Some(12),
            html_url: "https://github.com/acme/widgets/actions/runs/9001".into(),
            created_at: Some("2024-03-01T10:00:00Z".parse().unwrap()),
            updated_at: Some("2024-03-01T10:05:00Z".parse().unwrap()),
            actor: Some(GitHubUser {
                login: "octocat".into(),
                ..Default::default()
            }),
            head_commit: Some(GitHubHeadCommit {
                id: None,
                message: "Ship it".into(),
            }),
        }
    }

    fn statuses(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_map_workflow_run() {
        let deployment = map_workflow_run(&sample_run(), "widgets");

        assert_eq!(deployment.id, "9001");
        assert_eq!(deployment.status, "success");
        assert_eq!(deployment.service, "widgets");
        assert_eq!(deployment.environment, "prod");
        assert_eq!(deployment.version, "abcdef0");
        assert_eq!(deployment.actor["login"], "octocat");
        assert_eq!(deployment.fields["workflow_name"], "Deploy to Production");
        assert_eq!(deployment.fields["branch"], "main");
        assert_eq!(deployment.fields["commit"], "abcdef0123456789");
        assert_eq!(deployment.fields["commit_message"], "Ship it");
        assert_eq!(deployment.fields["event"], "push");
        assert_eq!(deployment.fields["run_number"], 12);
        assert!(deployment.metadata.is_empty());
        assert_eq!(deployment.started_at, sample_run().created_at);
        assert_eq!(deployment.finished_at, sample_run().updated_at);
    }

    #[test]
    fn test_map_workflow_run_short_sha_and_no_actor() {
        let run = GitHubWorkflowRun {
            id: 1,
            head_sha: "abc".into(),
            status: Some("queued".into()),
            ..Default::default()
        };

        let deployment = map_workflow_run(&run, "widgets");
        assert_eq!(deployment.status, "queued");
        assert!(deployment.version.is_empty());
        assert!(deployment.actor.is_empty());
        assert_eq!(deployment.environment, "development");
        assert!(!deployment.fields.contains_key("commit_message"));
        assert!(!deployment.fields.contains_key("event"));
    }

    #[test]
    fn test_parse_run_id() {
        assert_eq!(parse_run_id("9001").unwrap(), 9001);
        let err = parse_run_id("run-1").unwrap_err();
        assert_eq!(err.code(), "bad_request");
    }

    #[test]
    fn test_status_filter() {
        assert_eq!(status_filter(&[]), None);
        assert_eq!(status_filter(&statuses(&["queued"])), Some("queued".into()));
        assert_eq!(
            status_filter(&statuses(&["running", "in_progress"])),
            Some("in_progress".into())
        );
        assert_eq!(
            status_filter(&statuses(&["success", "failed", "cancelled"])),
            Some("completed".into())
        );
        assert_eq!(status_filter(&statuses(&["queued", "success"])), None);
        assert_eq!(status_filter(&statuses(&["bogus"])), None);
    }

    #[test]
    fn test_build_list_options_from_metadata() {
        let query: DeploymentQuery = serde_json::from_value(serde_json::json!({
            "statuses": ["failed"],
            "limit": 20,
            "metadata": {"branch": "main", "actor": "octocat", "event": "push"}
        }))
        .unwrap();

        let options = build_list_options(&query);
        assert_eq!(
            options,
            WorkflowRunListOptions {
                status: Some("completed".into()),
                branch: Some("main".into()),
                actor: Some("octocat".into()),
                event: Some("push".into()),
                per_page: 20,
            }
        );
    }

    #[test]
    fn test_matches_query() {
        let deployment = map_workflow_run(&sample_run(), "widgets");

        let mut query = DeploymentQuery {
            statuses: statuses(&["SUCCESS"]),
            ..Default::default()
        };
        assert!(matches_query(&deployment, &query));

        query.scope.environment = Some("staging".into());
        assert!(!matches_query(&deployment, &query));

        query.scope.environment = Some("prod".into());
        query.scope.service = Some("widgets".into());
        assert!(matches_query(&deployment, &query));

        query.statuses = statuses(&["failed"]);
        assert!(!matches_query(&deployment, &query));
    }

    // =========================================================================
    // Integration tests with httpmock
    // =========================================================================

    mod integration {
        use super::*;
        use httpmock::prelude::*;
        use opsorch_core::RawConfig;
        use serde_json::json;

        fn create_test_adapter(server: &MockServer) -> DeploymentAdapter {
            let raw = RawConfig::from_json_str(
                &json!({
                    "token": "test-token",
                    "owner": "acme",
                    "repo": "widgets",
                    "baseUrl": server.base_url()
                })
                .to_string(),
            )
            .unwrap();
            DeploymentAdapter::new(&raw).unwrap()
        }

        fn run_json(id: u64, name: &str, branch: &str, conclusion: &str) -> serde_json::Value {
            json!({
                "id": id,
                "name": name,
                "head_branch": branch,
                "head_sha": "0123456789abcdef",
                "status": "completed",
                "conclusion": conclusion,
                "html_url": format!("https://github.com/acme/widgets/actions/runs/{}", id),
                "actor": {"id": 1, "login": "octocat"}
            })
        }

        #[tokio::test]
        async fn test_query_filters_status_and_environment() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET)
                    .path("/repos/acme/widgets/actions/runs")
                    .query_param("status", "completed")
                    .query_param("branch", "main")
                    .query_param("per_page", "100");
                then.status(200).json_body(json!({
                    "total_count": 3,
                    "workflow_runs": [
                        run_json(1, "Deploy to Production", "main", "success"),
                        run_json(2, "Deploy to Production", "main", "failure"),
                        run_json(3, "Deploy to Staging", "main", "success")
                    ]
                }));
            });

            let adapter = create_test_adapter(&server);
            let query: DeploymentQuery = serde_json::from_value(json!({
                "statuses": ["success"],
                "scope": {"environment": "prod"},
                "metadata": {"branch": "main"}
            }))
            .unwrap();

            let deployments = adapter.query(query).await.unwrap();
            assert_eq!(deployments.len(), 1);
            assert_eq!(deployments[0].id, "1");
            assert_eq!(deployments[0].status, "success");
        }

        #[tokio::test]
        async fn test_query_respects_limit() {
            let server = MockServer::start();

            let runs: Vec<_> = (1..=9)
                .map(|id| run_json(id, "Build", "main", "success"))
                .collect();
            server.mock(|when, then| {
                when.method(GET)
                    .path("/repos/acme/widgets/actions/runs")
                    .query_param("per_page", "5");
                then.status(200)
                    .json_body(json!({"total_count": 9, "workflow_runs": runs}));
            });

            let adapter = create_test_adapter(&server);
            let deployments = adapter
                .query(DeploymentQuery {
                    limit: Some(5),
                    ..Default::default()
                })
                .await
                .unwrap();

            assert!(deployments.len() <= 5);
            assert_eq!(deployments[0].environment, "production");
        }

        #[tokio::test]
        async fn test_get() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/repos/acme/widgets/actions/runs/42");
                then.status(200)
                    .json_body(run_json(42, "Deploy to Staging", "develop", "cancelled"));
            });

            let adapter = create_test_adapter(&server);
            let deployment = adapter.get("42").await.unwrap();

            assert_eq!(deployment.id, "42");
            assert_eq!(deployment.status, "cancelled");
            assert_eq!(deployment.environment, "staging");
            assert_eq!(deployment.version, "0123456");
        }

        #[tokio::test]
        async fn test_get_unauthorized() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/repos/acme/widgets/actions/runs/42");
                then.status(401)
                    .json_body(json!({"message": "Bad credentials"}));
            });

            let adapter = create_test_adapter(&server);
            let err = adapter.get("42").await.unwrap_err();
            assert_eq!(err.code(), "unauthorized");
        }
    }
}
