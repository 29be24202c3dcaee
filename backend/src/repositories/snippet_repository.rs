use crate::error::RepositoryError;
use crate::models::Snippet;
use serde::Deserialize;
use sqlx::PgPool;

pub const DEFAULT_SNIPPET_LIMIT: i64 = 20;
pub const MAX_SNIPPET_LIMIT: i64 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetQuery {
    pub search: Option<String>,
    pub language: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SnippetQuery {
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_SNIPPET_LIMIT)
            .clamp(1, MAX_SNIPPET_LIMIT)
    }

    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// ILIKE pattern for the search term, with wildcards escaped
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                let escaped = s
                    .replace('\\', "\\\\")
                    .replace('%', "\\%")
                    .replace('_', "\\_");
                format!("%{}%", escaped)
            })
    }
}

pub struct SnippetRepository {
    pool: PgPool,
}

impl SnippetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: &SnippetQuery) -> Result<Vec<Snippet>, RepositoryError> {
        let language = query
            .language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty());

        let snippets = sqlx::query_as::<_, Snippet>(
            r#"
            SELECT id, user_id, user_name, code, title, description, language, created_at
            FROM snippets
            WHERE ($1::TEXT IS NULL
                   OR language ILIKE $1 OR title ILIKE $1 OR user_name ILIKE $1)
              AND ($2::TEXT IS NULL OR language = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(query.search_pattern())
        .bind(language)
        .bind(query.effective_limit())
        .bind(query.effective_offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(snippets)
    }

    /// Share a snippet unless the user already has `max_per_user`.
    ///
    /// The user's progress row is locked so concurrent shares are counted
    /// one after another. Returns `None` at the cap.
    pub async fn create_capped(
        &self,
        user_id: &str,
        max_per_user: i64,
        title: &str,
        description: &str,
        code: &str,
        language: &str,
    ) -> Result<Option<Snippet>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user_name = sqlx::query_scalar::<_, String>(
            "SELECT user_name FROM user_progress WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("User progress not found".to_string()))?;

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM snippets WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        if count >= max_per_user {
            return Ok(None);
        }

        let snippet = sqlx::query_as::<_, Snippet>(
            r#"
            INSERT INTO snippets (user_id, user_name, title, description, code, language)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, user_name, code, title, description, language, created_at
            "#,
        )
        .bind(user_id)
        .bind(&user_name)
        .bind(title)
        .bind(description)
        .bind(code)
        .bind(language)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(snippet))
    }

    /// Delete a snippet owned by `user_id`
    pub async fn delete_owned(&self, id: i32, user_id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM snippets WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("Snippet not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_defaults_and_clamps() {
        assert_eq!(SnippetQuery::default().effective_limit(), 20);
        let q = SnippetQuery {
            limit: Some(500),
            offset: Some(-3),
            ..Default::default()
        };
        assert_eq!(q.effective_limit(), 100);
        assert_eq!(q.effective_offset(), 0);
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        let q = SnippetQuery {
            search: Some(" 100%_rust ".into()),
            ..Default::default()
        };
        assert_eq!(q.search_pattern().as_deref(), Some("%100\\%\\_rust%"));

        let blank = SnippetQuery {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(blank.search_pattern(), None);
    }
}
