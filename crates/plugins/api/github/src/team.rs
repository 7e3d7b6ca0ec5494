//! Teams backed by GitHub organization teams.

use async_trait::async_trait;
use opsorch_core::{Fields, Result, Team, TeamMember, TeamProvider, TeamQuery};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::adapter::{page_size, truncate, TeamAdapter, MAX_PAGE_SIZE};
use crate::normalize::{normalize_role, ROLE_MEMBER};
use crate::types::{GitHubTeam, GitHubUser};
use crate::PROVIDER_NAME;

// =============================================================================
// Mapping functions
// =============================================================================

fn insert_opt<T: Into<Value>>(map: &mut Fields, key: &str, value: Option<T>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.into());
    }
}

fn map_team(team: &GitHubTeam, organization: &str) -> Team {
    let id = if team.slug.is_empty() {
        team.id.to_string()
    } else {
        team.slug.clone()
    };

    let mut tags = std::collections::BTreeMap::new();
    tags.insert("provider".to_string(), PROVIDER_NAME.to_string());
    tags.insert(
        "privacy".to_string(),
        team.privacy.clone().unwrap_or_default(),
    );
    tags.insert(
        "permission".to_string(),
        team.permission.clone().unwrap_or_default(),
    );
    tags.insert("organization".to_string(), organization.to_string());

    let mut metadata = Fields::new();
    metadata.insert("github_id".into(), json!(team.id));
    metadata.insert("slug".into(), Value::String(team.slug.clone()));
    insert_opt(&mut metadata, "description", team.description.clone());
    insert_opt(&mut metadata, "privacy", team.privacy.clone());
    insert_opt(&mut metadata, "permission", team.permission.clone());
    insert_opt(&mut metadata, "html_url", team.html_url.clone());
    insert_opt(&mut metadata, "members_url", team.members_url.clone());
    insert_opt(&mut metadata, "repositories_url", team.repositories_url.clone());
    insert_opt(&mut metadata, "members_count", team.members_count);
    insert_opt(&mut metadata, "repos_count", team.repos_count);

    let parent = team
        .parent
        .as_ref()
        .map(|p| {
            if p.slug.is_empty() {
                p.id.to_string()
            } else {
                p.slug.clone()
            }
        })
        .unwrap_or_default();

    Team {
        id,
        name: team.name.clone(),
        url: team.html_url.clone().unwrap_or_default(),
        parent,
        tags,
        metadata,
    }
}

/// Metadata available from the short user record in a member listing.
fn basic_member_metadata(member: &GitHubUser) -> Fields {
    let mut metadata = Fields::new();
    metadata.insert("github_id".into(), json!(member.id));
    insert_opt(&mut metadata, "avatar_url", member.avatar_url.clone());
    insert_opt(&mut metadata, "html_url", member.html_url.clone());
    metadata.insert("site_admin".into(), Value::Bool(member.site_admin));
    insert_opt(&mut metadata, "type", member.user_type.clone());
    metadata
}

/// Member built from the listing alone, used when the profile lookup fails.
fn map_basic_member(member: &GitHubUser) -> TeamMember {
    TeamMember {
        id: member.login.clone(),
        name: member.login.clone(),
        email: String::new(),
        handle: member.login.clone(),
        role: ROLE_MEMBER.to_string(),
        metadata: basic_member_metadata(member),
    }
}

fn map_member(member: &GitHubUser, user: &GitHubUser, role: &str) -> TeamMember {
    let mut metadata = basic_member_metadata(member);
    insert_opt(&mut metadata, "company", user.company.clone());
    insert_opt(&mut metadata, "location", user.location.clone());
    insert_opt(&mut metadata, "bio", user.bio.clone());
    insert_opt(&mut metadata, "blog", user.blog.clone());
    insert_opt(&mut metadata, "twitter", user.twitter_username.clone());
    insert_opt(&mut metadata, "public_repos", user.public_repos);
    insert_opt(&mut metadata, "followers", user.followers);
    insert_opt(&mut metadata, "following", user.following);

    TeamMember {
        id: member.login.clone(),
        name: user.name.clone().unwrap_or_default(),
        email: user.email.clone().unwrap_or_default(),
        handle: member.login.clone(),
        role: normalize_role(role).to_string(),
        metadata,
    }
}

/// Case-insensitive name substring plus tag equality, all entries required.
fn matches_query(team: &Team, query: &TeamQuery) -> bool {
    if let Some(name) = query.name.as_deref().filter(|n| !n.is_empty()) {
        if !team.name.to_lowercase().contains(&name.to_lowercase()) {
            return false;
        }
    }

    query
        .tags
        .iter()
        .all(|(key, value)| team.tags.get(key) == Some(value))
}

// =============================================================================
// TeamAdapter helpers
// =============================================================================

impl TeamAdapter {
    /// Fetch a team by numeric ID (through the organization ID) or by slug.
    async fn fetch_team(&self, id: &str) -> Result<GitHubTeam> {
        let org = &self.config().organization;

        match id.trim().parse::<u64>() {
            Ok(team_id) => {
                let organization = self.client().get_organization(org).await?;
                self.client()
                    .get_team_by_id(organization.id, team_id)
                    .await
            }
            Err(_) => {
                debug!(slug = id, "Team ID is not numeric, looking up by slug");
                self.client().get_team_by_slug(org, id).await
            }
        }
    }

    /// Resolve a numeric team ID, looking the slug up when needed.
    async fn resolve_team_id(&self, id: &str) -> Result<u64> {
        match id.trim().parse::<u64>() {
            Ok(team_id) => Ok(team_id),
            Err(_) => {
                let team = self
                    .client()
                    .get_team_by_slug(&self.config().organization, id)
                    .await?;
                Ok(team.id)
            }
        }
    }

    async fn enrich_member(&self, org_id: u64, team_id: u64, member: &GitHubUser) -> TeamMember {
        let user = match self.client().get_user(&member.login).await {
            Ok(user) => user,
            Err(e) => {
                warn!(login = member.login.as_str(), error = %e, "User lookup failed, using basic member info");
                return map_basic_member(member);
            }
        };

        let role = match self
            .client()
            .get_team_membership(org_id, team_id, &member.login)
            .await
        {
            Ok(membership) => membership.role,
            Err(e) => {
                warn!(login = member.login.as_str(), error = %e, "Membership lookup failed, defaulting role");
                ROLE_MEMBER.to_string()
            }
        };

        map_member(member, &user, &role)
    }
}

// =============================================================================
// TeamProvider implementation
// =============================================================================

#[async_trait]
impl TeamProvider for TeamAdapter {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn query(&self, query: TeamQuery) -> Result<Vec<Team>> {
        let org = &self.config().organization;
        let per_page = page_size(query.limit);
        debug!(organization = org.as_str(), per_page = per_page, "Querying teams");

        let teams = self.client().list_teams(org, per_page).await?;

        let mut result: Vec<Team> = teams
            .iter()
            .map(|team| map_team(team, org))
            .filter(|team| matches_query(team, &query))
            .collect();
        truncate(&mut result, query.limit);

        Ok(result)
    }

    async fn get(&self, id: &str) -> Result<Team> {
        let team = self.fetch_team(id).await?;
        Ok(map_team(&team, &self.config().organization))
    }

    async fn members(&self, team_id: &str) -> Result<Vec<TeamMember>> {
        let team_id = self.resolve_team_id(team_id).await?;
        let organization = self
            .client()
            .get_organization(&self.config().organization)
            .await?;

        let listed = self
            .client()
            .list_team_members(organization.id, team_id, MAX_PAGE_SIZE)
            .await?;
        debug!(team_id = team_id, count = listed.len(), "Enriching team members");

        let mut members = Vec::with_capacity(listed.len());
        for member in &listed {
            members.push(self.enrich_member(organization.id, team_id, member).await);
        }

        Ok(members)
    }
}
