use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewTeam, Team, TeamMember, TeamSummary};
use crate::database::query_builder::{Column, UpdateBuilder};

pub const TEAM_ROLE_OWNER: &str = "owner";
pub const TEAM_ROLE_ADMIN: &str = "admin";

/// Columns a team owner or admin may change.
pub const TEAM_COLUMNS: [Column; 5] = [
    Column::text("name"),
    Column::text("description"),
    Column::text("logo_url"),
    Column::text("website_url"),
    Column::text("discord_url"),
];

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9а-яё]+").expect("static slug pattern"));

/// Lowercase, collapse runs outside `[a-z0-9а-яё]` into `-`, trim dashes.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    NON_SLUG_CHARS.replace_all(&lower, "-").trim_matches('-').to_string()
}

const TEAM_SUMMARY_SQL: &str = "
    SELECT t.id, t.name, t.slug, t.description, t.logo_url, t.website_url, t.discord_url,
           t.created_by, t.created_at,
           COUNT(DISTINCT tm.user_id) AS member_count,
           COUNT(DISTINCT uu.id) AS manhwa_count
    FROM teams t
    LEFT JOIN team_members tm ON tm.team_id = t.id
    LEFT JOIN user_uploads uu ON uu.team_id = t.id";

pub async fn list_teams(pool: &PgPool) -> Result<Vec<TeamSummary>, DatabaseError> {
    let teams = sqlx::query_as::<_, TeamSummary>(&format!(
        "{TEAM_SUMMARY_SQL} GROUP BY t.id ORDER BY t.created_at DESC, t.id DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(teams)
}

pub async fn find_team(pool: &PgPool, team_id: i32) -> Result<Option<TeamSummary>, DatabaseError> {
    let team = sqlx::query_as::<_, TeamSummary>(&format!("{TEAM_SUMMARY_SQL} WHERE t.id = $1 GROUP BY t.id"))
        .bind(team_id)
        .fetch_optional(pool)
        .await?;
    Ok(team)
}

pub async fn team_members(pool: &PgPool, team_id: i32) -> Result<Vec<TeamMember>, DatabaseError> {
    let members = sqlx::query_as::<_, TeamMember>(
        "SELECT user_id, role, joined_at FROM team_members WHERE team_id = $1 ORDER BY joined_at, user_id",
    )
    .bind(team_id)
    .fetch_all(pool)
    .await?;
    Ok(members)
}

/// Create a team and enrol its creator as owner, atomically.
pub async fn create_team(pool: &PgPool, new: &NewTeam, created_by: &str) -> Result<Team, DatabaseError> {
    let mut tx = pool.begin().await?;

    let team = sqlx::query_as::<_, Team>(
        "INSERT INTO teams (name, slug, description, logo_url, website_url, discord_url, created_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING id, name, slug, description, logo_url, website_url, discord_url, created_by, created_at",
    )
    .bind(&new.name)
    .bind(&new.slug)
    .bind(&new.description)
    .bind(&new.logo_url)
    .bind(&new.website_url)
    .bind(&new.discord_url)
    .bind(created_by)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO team_members (team_id, user_id, role) VALUES ($1, $2, $3)")
        .bind(team.id)
        .bind(created_by)
        .bind(TEAM_ROLE_OWNER)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(team)
}

pub async fn member_role(pool: &PgPool, team_id: i32, user_id: &str) -> Result<Option<String>, DatabaseError> {
    let role = sqlx::query_scalar::<_, String>("SELECT role FROM team_members WHERE team_id = $1 AND user_id = $2")
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(role)
}

/// Apply whitelisted fields from `body`. `Ok(None)` when nothing to update.
pub async fn update_team(pool: &PgPool, team_id: i32, body: &Map<String, Value>) -> Result<Option<Team>, DatabaseError> {
    let update = UpdateBuilder::new("teams").set_present(&TEAM_COLUMNS, body)?;
    if update.is_empty() {
        return Ok(None);
    }

    let mut qb = update.build(team_id);
    qb.push(" RETURNING id, name, slug, description, logo_url, website_url, discord_url, created_by, created_at");
    let team = qb
        .build_query_as::<Team>()
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Team not found".to_string()))?;
    Ok(Some(team))
}
