use crate::error::RepositoryError;
use crate::models::{User, UserRole};
use serde_json::Value;
use sqlx::PgPool;

const USER_COLUMNS: &str =
    "id, email, name, description, avatar, provider, links, role, meet_link, created_at, updated_at";

/// Optional account fields changed by a profile update
#[derive(Debug, Clone, Default)]
pub struct UserProfileChanges {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub description: Option<String>,
    pub links: Option<Value>,
    pub meet_link: Option<String>,
}

/// Repository for user data access
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by identity provider id
    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find the account for a verified token, creating it on first sight
    pub async fn find_or_provision(
        &self,
        id: &str,
        email: &str,
        name: &str,
        avatar: &str,
    ) -> Result<User, RepositoryError> {
        if let Some(user) = self.find_by_id(id).await? {
            return Ok(user);
        }

        // Concurrent first requests race on the primary key
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, name, avatar, provider, role)
            VALUES ($1, $2, $3, $4, 'email', 'user')
            ON CONFLICT (id) DO UPDATE SET updated_at = users.updated_at
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(email)
        .bind(name)
        .bind(avatar)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn update_profile(
        &self,
        id: &str,
        changes: &UserProfileChanges,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                avatar = COALESCE($3, avatar),
                description = COALESCE($4, description),
                links = COALESCE($5, links),
                meet_link = COALESCE($6, meet_link),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.avatar)
        .bind(&changes.description)
        .bind(&changes.links)
        .bind(&changes.meet_link)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or_else(|| RepositoryError::NotFound(format!("User {} not found", id)))
    }

    pub async fn set_role(&self, id: &str, role: UserRole) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    /// All accounts with the teacher role, by name
    pub async fn list_teachers(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE role = 'teacher' ORDER BY name",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
