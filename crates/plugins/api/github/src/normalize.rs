//! Mapping tables from GitHub vocabularies to canonical ones.
//!
//! Everything here is a pure function of its inputs.

/// Canonical open ticket status.
pub const STATUS_OPEN: &str = "open";
/// Canonical closed ticket status.
pub const STATUS_CLOSED: &str = "closed";

/// Canonical team role for maintainers.
pub const ROLE_OWNER: &str = "owner";
/// Canonical team role for everybody else.
pub const ROLE_MEMBER: &str = "member";

/// Environment patterns, scanned in order. "dev" precedes "development",
/// so the first substring hit wins rather than the longest.
pub const ENVIRONMENT_PATTERNS: [&str; 8] = [
    "prod",
    "production",
    "staging",
    "stage",
    "dev",
    "development",
    "test",
    "testing",
];

// =============================================================================
// Tickets
// =============================================================================

/// Normalize an upstream issue state for reads.
///
/// `open`/`closed` are lower-cased; anything else keeps its original case.
pub fn normalize_issue_state(state: &str) -> String {
    if state.eq_ignore_ascii_case(STATUS_OPEN) {
        STATUS_OPEN.to_string()
    } else if state.eq_ignore_ascii_case(STATUS_CLOSED) {
        STATUS_CLOSED.to_string()
    } else {
        state.to_string()
    }
}

/// Resolve a canonical status alias to an upstream issue state.
///
/// Returns `None` for values outside both alias groups.
pub fn issue_state_alias(status: &str) -> Option<&'static str> {
    match status.to_lowercase().as_str() {
        "open" | "new" | "in_progress" => Some(STATUS_OPEN),
        "closed" | "resolved" | "done" => Some(STATUS_CLOSED),
        _ => None,
    }
}

/// Map a requested status to the upstream state sent on update.
///
/// Unrecognized values pass through lower-cased.
pub fn update_state(status: &str) -> String {
    issue_state_alias(status)
        .map(str::to_string)
        .unwrap_or_else(|| status.to_lowercase())
}

// =============================================================================
// Teams
// =============================================================================

/// Map a GitHub team membership role to a canonical role.
///
/// Canonical roles map to themselves.
pub fn normalize_role(role: &str) -> &'static str {
    if role.eq_ignore_ascii_case("maintainer") || role.eq_ignore_ascii_case(ROLE_OWNER) {
        ROLE_OWNER
    } else {
        ROLE_MEMBER
    }
}

// =============================================================================
// Deployments
// =============================================================================

/// Map a workflow run (status, conclusion) pair to a canonical deployment status.
///
/// Unknown statuses pass through unchanged; any unrecognized conclusion of a
/// completed run counts as a failure.
pub fn normalize_run_status(status: &str, conclusion: &str) -> String {
    match status.to_lowercase().as_str() {
        "queued" => "queued".to_string(),
        "in_progress" => "running".to_string(),
        "completed" => match conclusion.to_lowercase().as_str() {
            "success" => "success",
            "cancelled" | "skipped" => "cancelled",
            _ => "failed",
        }
        .to_string(),
        _ => status.to_string(),
    }
}

/// Map a requested canonical status to the coarse upstream run status.
pub fn run_status_filter(status: &str) -> Option<&'static str> {
    match status.to_lowercase().as_str() {
        "queued" => Some("queued"),
        "running" | "in_progress" => Some("in_progress"),
        "success" | "completed" | "failed" | "cancelled" => Some("completed"),
        _ => None,
    }
}

/// Infer the deployment environment from a workflow name and branch.
pub fn infer_environment(workflow_name: &str, branch: &str) -> String {
    let name = workflow_name.to_lowercase();
    let branch = branch.to_lowercase();

    if let Some(env) = first_pattern(&name).or_else(|| first_pattern(&branch)) {
        return env.to_string();
    }

    match branch.as_str() {
        "main" | "master" => "production",
        _ => "development",
    }
    .to_string()
}

fn first_pattern(haystack: &str) -> Option<&'static str> {
    ENVIRONMENT_PATTERNS
        .iter()
        .copied()
        .find(|pattern| haystack.contains(pattern))
}

/// Short (7-character) form of a commit SHA; empty when the SHA is shorter.
pub fn short_sha(sha: &str) -> String {
    sha.get(..7).unwrap_or_default().to_string()
}
