use crate::error::RepositoryError;
use crate::models::{School, SchoolStanding, SchoolType};
use serde::Deserialize;
use sqlx::PgPool;

const SCHOOL_COLUMNS: &str = "id, name, city, district, category, kind, total_points, type";

/// Optional filters for the school picker
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolFilter {
    pub city: Option<String>,
    pub district: Option<String>,
    pub category: Option<String>,
    pub school_type: Option<SchoolType>,
}

pub struct SchoolRepository {
    pool: PgPool,
}

impl SchoolRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<School>, RepositoryError> {
        let schools = sqlx::query_as::<_, School>(&format!(
            "SELECT {} FROM schools ORDER BY name",
            SCHOOL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(schools)
    }

    pub async fn find(&self, id: i32) -> Result<Option<School>, RepositoryError> {
        let school = sqlx::query_as::<_, School>(&format!(
            "SELECT {} FROM schools WHERE id = $1",
            SCHOOL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(school)
    }

    pub async fn cities(&self) -> Result<Vec<String>, RepositoryError> {
        let cities = sqlx::query_scalar::<_, String>("SELECT DISTINCT city FROM schools ORDER BY city")
            .fetch_all(&self.pool)
            .await?;
        Ok(cities)
    }

    pub async fn districts(&self, city: &str) -> Result<Vec<String>, RepositoryError> {
        let districts = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT district FROM schools WHERE city = $1 ORDER BY district",
        )
        .bind(city)
        .fetch_all(&self.pool)
        .await?;
        Ok(districts)
    }

    pub async fn filtered(&self, filter: &SchoolFilter) -> Result<Vec<School>, RepositoryError> {
        let schools = sqlx::query_as::<_, School>(&format!(
            r#"
            SELECT {}
            FROM schools
            WHERE ($1::TEXT IS NULL OR city = $1)
              AND ($2::TEXT IS NULL OR district = $2)
              AND ($3::TEXT IS NULL OR category = $3)
              AND ($4::TEXT IS NULL OR type = $4)
            ORDER BY name
            "#,
            SCHOOL_COLUMNS
        ))
        .bind(&filter.city)
        .bind(&filter.district)
        .bind(&filter.category)
        .bind(filter.school_type.map(|t| t.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(schools)
    }

    // =========================================================================
    // Totals and standings
    // =========================================================================

    /// total_points = sum of the points of the school's learners
    pub async fn recompute_total(&self, school_id: i32) -> Result<i32, RepositoryError> {
        let total = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE schools
            SET total_points = COALESCE(
                (SELECT SUM(points)::INTEGER FROM user_progress WHERE school_id = $1), 0)
            WHERE id = $1
            RETURNING total_points
            "#,
        )
        .bind(school_id)
        .fetch_optional(&self.pool)
        .await?;

        total.ok_or_else(|| RepositoryError::NotFound(format!("School {} not found", school_id)))
    }

    /// Recompute every school; returns the number of rows touched
    pub async fn recompute_all_totals(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE schools s
            SET total_points = COALESCE(
                (SELECT SUM(up.points)::INTEGER FROM user_progress up WHERE up.school_id = s.id), 0)
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn top_schools(
        &self,
        school_type: SchoolType,
        limit: i64,
    ) -> Result<Vec<SchoolStanding>, RepositoryError> {
        let rows = sqlx::query_as::<_, SchoolStanding>(
            r#"
            SELECT id AS school_id, name AS school_name, total_points
            FROM schools
            WHERE type = $1
            ORDER BY total_points DESC, id
            LIMIT $2
            "#,
        )
        .bind(school_type.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// 1-based position among schools of the same type
    pub async fn school_rank(&self, school_id: i32) -> Result<Option<i64>, RepositoryError> {
        let rank = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT position FROM (
                SELECT id, ROW_NUMBER() OVER (ORDER BY total_points DESC, id) AS position
                FROM schools
                WHERE type = (SELECT type FROM schools WHERE id = $1)
            ) ranked
            WHERE id = $1
            "#,
        )
        .bind(school_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rank)
    }
}
