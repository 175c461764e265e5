//! Profile Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{RepoError, RepoResult};
use crate::db::models::{Profile, ProfileCreate, ProfileId};
use shared::Role;

#[derive(Clone)]
pub struct ProfileRepository {
    db: Surreal<Db>,
}

impl ProfileRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Find all active profiles, ordered by display name
    pub async fn find_all(&self) -> RepoResult<Vec<Profile>> {
        let profiles: Vec<Profile> = self
            .db
            .query("SELECT * FROM profile WHERE is_active = true ORDER BY display_name")
            .await?
            .take(0)?;
        Ok(profiles)
    }

    /// Find profile by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Profile>> {
        let thing: ProfileId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let profile: Option<Profile> = self.db.select(thing).await?;
        Ok(profile)
    }

    /// Find profile by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<Profile>> {
        let email = email.trim().to_lowercase();
        let mut result = self
            .db
            .query("SELECT * FROM profile WHERE email = $email LIMIT 1")
            .bind(("email", email))
            .await?;
        let profiles: Vec<Profile> = result.take(0)?;
        Ok(profiles.into_iter().next())
    }

    /// Create a new profile
    pub async fn create(&self, data: ProfileCreate) -> RepoResult<Profile> {
        let email = data.email.trim().to_lowercase();

        // Check duplicate email; the unique index backstops races
        if self.find_by_email(&email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Profile '{}' already exists",
                email
            )));
        }

        let mut result = self
            .db
            .query(
                r#"CREATE profile SET
                    email = $email,
                    display_name = $display_name,
                    role = $role,
                    is_active = true
                RETURN AFTER"#,
            )
            .bind(("email", email))
            .bind(("display_name", data.display_name))
            .bind(("role", data.role))
            .await?;

        let created: Option<Profile> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create profile".to_string()))
    }

    /// Set the profile's Telegram chat link (idempotent)
    pub async fn set_chat_id(&self, id: &str, chat_id: &str) -> RepoResult<Option<Profile>> {
        let thing: ProfileId = match id.parse() {
            Ok(t) => t,
            // A malformed id from a forged deep link is a lookup miss,
            // not a validation error the bot should explain
            Err(_) => return Ok(None),
        };
        let mut result = self
            .db
            .query("UPDATE $id SET chat_id = $chat_id RETURN AFTER")
            .bind(("id", thing))
            .bind(("chat_id", chat_id.to_string()))
            .await?;
        let profiles: Vec<Profile> = result.take(0)?;
        Ok(profiles.into_iter().next())
    }

    /// Active profiles of a role that have a linked chat
    ///
    /// The recipient set for lifecycle fan-out notifications.
    pub async fn notifiable_by_role(&self, role: Role) -> RepoResult<Vec<Profile>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM profile WHERE role = $role AND is_active = true AND chat_id != NONE",
            )
            .bind(("role", role))
            .await?;
        let profiles: Vec<Profile> = result.take(0)?;
        Ok(profiles)
    }

    /// Batch id -> display name resolution for dashboard joins
    pub async fn display_names(&self, ids: &[String]) -> RepoResult<Vec<Profile>> {
        let things: Vec<ProfileId> = ids.iter().filter_map(|id| id.parse().ok()).collect();
        if things.is_empty() {
            return Ok(Vec::new());
        }
        let mut result = self
            .db
            .query("SELECT * FROM profile WHERE id IN $ids")
            .bind(("ids", things))
            .await?;
        let profiles: Vec<Profile> = result.take(0)?;
        Ok(profiles)
    }
}
