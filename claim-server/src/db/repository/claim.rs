//! Claim Repository
//!
//! All lifecycle transitions are single conditional UPDATE statements
//! (`WHERE state = $expected RETURN AFTER`), so the state check and
//! the write happen atomically inside the database. An empty result
//! for an existing record means a concurrent writer advanced the
//! claim first; that surfaces as [`RepoError::StaleState`].

use chrono::Utc;
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{RepoError, RepoResult};
use crate::db::models::{Claim, ClaimCreate, ClaimFilter, ClaimId, ProfileId, VerdictStatus};
use shared::{ClaimState, PAGE_SIZE, ResolutionType, Verdict, claim::normalize_code};

#[derive(Clone)]
pub struct ClaimRepository {
    db: Surreal<Db>,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u64,
}

impl ClaimRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Find claim by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Claim>> {
        let thing: ClaimId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let claim: Option<Claim> = self.db.select(thing).await?;
        Ok(claim)
    }

    /// Find claim by code (case-insensitive, codes are stored uppercased)
    pub async fn find_by_code(&self, code: &str) -> RepoResult<Option<Claim>> {
        let code = normalize_code(code);
        let mut result = self
            .db
            .query("SELECT * FROM claim WHERE code = $code LIMIT 1")
            .bind(("code", code))
            .await?;
        let claims: Vec<Claim> = result.take(0)?;
        Ok(claims.into_iter().next())
    }

    /// Create a new claim in PENDING state
    pub async fn create(&self, data: ClaimCreate, created_by: ProfileId) -> RepoResult<Claim> {
        let code = normalize_code(&data.code);
        if code.is_empty() {
            return Err(RepoError::Validation("Claim code must not be empty".into()));
        }

        // Check duplicate code; the unique index backstops races
        if self.find_by_code(&code).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Claim code '{}' already exists",
                code
            )));
        }

        let mut result = self
            .db
            .query(
                r#"CREATE claim SET
                    code = $code,
                    state = 'PENDING',
                    customer_name = $customer_name,
                    customer_tax_id = $customer_tax_id,
                    customer_phone = $customer_phone,
                    reason = $reason,
                    created_at = $created_at,
                    created_by = $created_by
                RETURN AFTER"#,
            )
            .bind(("code", code))
            .bind(("customer_name", data.customer_name))
            .bind(("customer_tax_id", data.customer_tax_id))
            .bind(("customer_phone", data.customer_phone))
            .bind(("reason", data.reason))
            .bind(("created_at", Utc::now()))
            .bind(("created_by", created_by))
            .await?;

        let created: Option<Claim> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create claim".to_string()))
    }

    /// Transition `PENDING -> IN_REVIEW`, recording the verdict
    ///
    /// Exactly one of two concurrent callers can win this update.
    pub async fn issue_verdict(&self, id: &ClaimId, verdict: Verdict) -> RepoResult<Claim> {
        let mut result = self
            .db
            .query(
                r#"UPDATE $id SET
                    verdict = $verdict,
                    state = 'IN_REVIEW'
                WHERE state = 'PENDING'
                RETURN AFTER"#,
            )
            .bind(("id", id.clone()))
            .bind(("verdict", verdict))
            .await?;

        let updated: Option<Claim> = result.take(0)?;
        match updated {
            Some(claim) => Ok(claim),
            None => Err(self.stale_or_missing(id, ClaimState::Pending).await),
        }
    }

    /// Transition `IN_REVIEW -> CLOSED`, recording the resolution
    pub async fn close(
        &self,
        id: &ClaimId,
        resolution_type: ResolutionType,
        resolution_note: String,
    ) -> RepoResult<Claim> {
        let mut result = self
            .db
            .query(
                r#"UPDATE $id SET
                    resolution_type = $resolution_type,
                    resolution_note = $resolution_note,
                    state = 'CLOSED'
                WHERE state = 'IN_REVIEW'
                RETURN AFTER"#,
            )
            .bind(("id", id.clone()))
            .bind(("resolution_type", resolution_type))
            .bind(("resolution_note", resolution_note))
            .await?;

        let updated: Option<Claim> = result.take(0)?;
        match updated {
            Some(claim) => Ok(claim),
            None => Err(self.stale_or_missing(id, ClaimState::InReview).await),
        }
    }

    /// Set the customer's Telegram chat link (idempotent)
    pub async fn set_customer_chat(&self, code: &str, chat_id: &str) -> RepoResult<Option<Claim>> {
        let code = normalize_code(code);
        let mut result = self
            .db
            .query("UPDATE claim SET customer_chat_id = $chat_id WHERE code = $code RETURN AFTER")
            .bind(("chat_id", chat_id.to_string()))
            .bind(("code", code))
            .await?;
        let claims: Vec<Claim> = result.take(0)?;
        Ok(claims.into_iter().next())
    }

    /// Filtered, paginated dashboard list (newest first)
    pub async fn list(&self, filter: &ClaimFilter) -> RepoResult<(Vec<Claim>, u64)> {
        let mut conditions: Vec<&'static str> = Vec::new();

        if filter.search.is_some() {
            conditions.push(
                "(string::contains(code, $search) OR string::contains(string::uppercase(customer_name), $search))",
            );
        }
        if filter.agent.is_some() {
            conditions.push("created_by = $agent");
        }
        match filter.status {
            Some(VerdictStatus::NoVerdict) => conditions.push("verdict = NONE"),
            Some(VerdictStatus::HasVerdict) => conditions.push("verdict != NONE"),
            None => {}
        }
        if filter.from.is_some() {
            conditions.push("created_at >= $from");
        }
        if filter.to.is_some() {
            conditions.push("created_at <= $to");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let page = filter.page.unwrap_or(1).max(1);
        let start = (page - 1) * PAGE_SIZE;

        let list_sql = format!(
            "SELECT * FROM claim{} ORDER BY created_at DESC LIMIT {} START {}",
            where_clause, PAGE_SIZE, start
        );
        let count_sql = format!("SELECT count() FROM claim{} GROUP ALL", where_clause);

        let mut query = self.db.query(list_sql).query(count_sql);
        if let Some(search) = &filter.search {
            query = query.bind(("search", search.trim().to_uppercase()));
        }
        if let Some(agent) = &filter.agent {
            let agent: ProfileId = agent
                .parse()
                .map_err(|_| RepoError::Validation(format!("Invalid agent ID: {}", agent)))?;
            query = query.bind(("agent", agent));
        }
        if let Some(from) = filter.from {
            query = query.bind(("from", from));
        }
        if let Some(to) = filter.to {
            query = query.bind(("to", to));
        }

        let mut result = query.await?;
        let claims: Vec<Claim> = result.take(0)?;
        let counts: Vec<CountRow> = result.take(1)?;
        let total = counts.first().map(|c| c.count).unwrap_or(0);

        Ok((claims, total))
    }

    /// Claims in IN_REVIEW filed by the given agent (their action queue)
    pub async fn in_review_for_agent(&self, agent: &ProfileId) -> RepoResult<Vec<Claim>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM claim WHERE state = 'IN_REVIEW' AND created_by = $agent ORDER BY created_at DESC",
            )
            .bind(("agent", agent.clone()))
            .await?;
        let claims: Vec<Claim> = result.take(0)?;
        Ok(claims)
    }

    /// Distinguish "record gone" from "record moved on" after a
    /// conditional update matched nothing
    async fn stale_or_missing(&self, id: &ClaimId, expected: ClaimState) -> RepoError {
        match self.db.select::<Option<Claim>>(id.clone()).await {
            Ok(Some(claim)) => RepoError::StaleState(format!(
                "expected {}, claim {} is {}",
                expected.as_str(),
                claim.code,
                claim.state.as_str()
            )),
            Ok(None) => RepoError::NotFound(format!("Claim {} not found", id)),
            Err(e) => RepoError::Database(e.to_string()),
        }
    }
}
