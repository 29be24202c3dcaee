use crate::domain::StreakRequirement;
use crate::error::{AppError, AppResult};
use crate::models::Snippet;
use crate::repositories::{ProgressRepository, SnippetQuery, SnippetRepository};
use crate::services::StreakService;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

pub const MAX_SNIPPETS_PER_USER: i64 = 3;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSnippet {
    pub title: String,
    pub description: String,
    pub code: String,
    pub language: String,
}

impl NewSnippet {
    pub fn validate(&self) -> AppResult<()> {
        let blank = [&self.title, &self.description, &self.code, &self.language]
            .iter()
            .any(|v| v.trim().is_empty());
        if blank {
            return Err(AppError::Validation(
                "Title, description, code and language are required".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct SnippetService {
    snippet_repo: Arc<SnippetRepository>,
    progress_repo: Arc<ProgressRepository>,
    streak: Arc<StreakService>,
}

impl SnippetService {
    pub fn new(
        snippet_repo: Arc<SnippetRepository>,
        progress_repo: Arc<ProgressRepository>,
        streak: Arc<StreakService>,
    ) -> Self {
        Self {
            snippet_repo,
            progress_repo,
            streak,
        }
    }

    pub async fn list(&self, query: &SnippetQuery) -> AppResult<Vec<Snippet>> {
        Ok(self.snippet_repo.list(query).await?)
    }

    pub async fn create(&self, user_id: &str, snippet: NewSnippet) -> AppResult<Snippet> {
        snippet.validate()?;

        let progress = self.progress_repo.get(user_id).await?;
        self.streak
            .require(&progress, StreakRequirement::CodeSnippetSharing)?;

        let created = self
            .snippet_repo
            .create_capped(
                user_id,
                MAX_SNIPPETS_PER_USER,
                snippet.title.trim(),
                snippet.description.trim(),
                &snippet.code,
                snippet.language.trim(),
            )
            .await?
            .ok_or_else(|| {
                AppError::Forbidden(format!(
                    "En fazla {} kod paylaşabilirsin.",
                    MAX_SNIPPETS_PER_USER
                ))
            })?;

        info!("Snippet shared: id={}, user={}", created.id, user_id);
        Ok(created)
    }

    pub async fn delete(&self, user_id: &str, id: i32) -> AppResult<()> {
        self.snippet_repo.delete_owned(id, user_id).await?;
        info!("Snippet deleted: id={}, user={}", id, user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_rejected() {
        let snippet = NewSnippet {
            title: "Fibonacci".into(),
            description: "Recursive".into(),
            code: "fn fib() {}".into(),
            language: " ".into(),
        };
        assert!(snippet.validate().is_err());

        let ok = NewSnippet {
            language: "rust".into(),
            ..snippet
        };
        assert!(ok.validate().is_ok());
    }
}
