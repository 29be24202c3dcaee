//! Repository for teacher and private lesson applications

use crate::error::RepositoryError;
use crate::models::{ApplicationStatus, StudentApplication, TeacherApplication, UserRole};
use serde::Deserialize;
use sqlx::PgPool;

const TEACHER_APPLICATION_COLUMNS: &str = r#"
    id, user_id, field, quiz_result, passed, teacher_name, teacher_surname,
    teacher_phone_number, teacher_email, classification, status, created_at, updated_at
"#;

const STUDENT_APPLICATION_COLUMNS: &str = r#"
    id, student_name, student_surname, student_phone_number, student_email, field,
    student_needs, user_id, status, approved, created_at
"#;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeacherApplication {
    pub field: String,
    pub teacher_name: String,
    pub teacher_surname: String,
    pub teacher_phone_number: String,
    pub teacher_email: String,
    pub classification: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudentApplication {
    pub student_name: String,
    pub student_surname: String,
    pub student_phone_number: String,
    pub student_email: String,
    pub field: String,
    pub student_needs: Option<String>,
}

/// Subject and grade granted on approval
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldGrant {
    pub subject: String,
    pub grade: String,
    pub display_name: String,
}

pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Teacher applications
    // =========================================================================

    /// Whether the user already has a pending or approved application
    pub async fn has_open_teacher_application(&self, user_id: &str) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM teacher_applications
                WHERE user_id = $1 AND status IN ('pending', 'approved')
            )
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn create_teacher_application(
        &self,
        user_id: &str,
        application: &NewTeacherApplication,
    ) -> Result<TeacherApplication, RepositoryError> {
        let row = sqlx::query_as::<_, TeacherApplication>(&format!(
            r#"
            INSERT INTO teacher_applications (
                user_id, field, quiz_result, passed, teacher_name, teacher_surname,
                teacher_phone_number, teacher_email, classification, status
            )
            VALUES ($1, $2, 0, TRUE, $3, $4, $5, $6, $7, 'pending')
            RETURNING {}
            "#,
            TEACHER_APPLICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(&application.field)
        .bind(&application.teacher_name)
        .bind(&application.teacher_surname)
        .bind(&application.teacher_phone_number)
        .bind(&application.teacher_email)
        .bind(&application.classification)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_teacher_applications(&self) -> Result<Vec<TeacherApplication>, RepositoryError> {
        let rows = sqlx::query_as::<_, TeacherApplication>(&format!(
            "SELECT {} FROM teacher_applications ORDER BY created_at DESC",
            TEACHER_APPLICATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Approve: promote the user to teacher and store the granted fields
    pub async fn approve_teacher_application(
        &self,
        id: i32,
        fields: &[FieldGrant],
    ) -> Result<TeacherApplication, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let application = sqlx::query_as::<_, TeacherApplication>(&format!(
            r#"
            UPDATE teacher_applications
            SET status = 'approved', updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TEACHER_APPLICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("Application not found".to_string()))?;

        sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(&application.user_id)
            .bind(UserRole::Teacher.as_str())
            .execute(&mut *tx)
            .await?;

        for field in fields {
            sqlx::query(
                r#"
                INSERT INTO teacher_fields (teacher_id, subject, grade, display_name, is_active)
                VALUES ($1, $2, $3, $4, TRUE)
                ON CONFLICT (teacher_id, subject, grade) DO UPDATE
                SET display_name = EXCLUDED.display_name, is_active = TRUE, updated_at = NOW()
                "#,
            )
            .bind(&application.user_id)
            .bind(&field.subject)
            .bind(&field.grade)
            .bind(&field.display_name)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(application)
    }

    pub async fn reject_teacher_application(&self, id: i32) -> Result<TeacherApplication, RepositoryError> {
        let row = sqlx::query_as::<_, TeacherApplication>(&format!(
            r#"
            UPDATE teacher_applications
            SET status = 'rejected', updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TEACHER_APPLICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| RepositoryError::NotFound("Application not found".to_string()))
    }

    // =========================================================================
    // Student applications
    // =========================================================================

    pub async fn create_student_application(
        &self,
        user_id: Option<&str>,
        application: &NewStudentApplication,
    ) -> Result<StudentApplication, RepositoryError> {
        let row = sqlx::query_as::<_, StudentApplication>(&format!(
            r#"
            INSERT INTO private_lesson_applications (
                student_name, student_surname, student_phone_number, student_email,
                field, student_needs, user_id, status, approved
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', FALSE)
            RETURNING {}
            "#,
            STUDENT_APPLICATION_COLUMNS
        ))
        .bind(&application.student_name)
        .bind(&application.student_surname)
        .bind(&application.student_phone_number)
        .bind(&application.student_email)
        .bind(&application.field)
        .bind(&application.student_needs)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_student_applications(&self) -> Result<Vec<StudentApplication>, RepositoryError> {
        let rows = sqlx::query_as::<_, StudentApplication>(&format!(
            "SELECT {} FROM private_lesson_applications ORDER BY created_at DESC",
            STUDENT_APPLICATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn set_student_application_status(
        &self,
        id: i32,
        status: ApplicationStatus,
    ) -> Result<StudentApplication, RepositoryError> {
        let row = sqlx::query_as::<_, StudentApplication>(&format!(
            r#"
            UPDATE private_lesson_applications
            SET status = $2, approved = $3
            WHERE id = $1
            RETURNING {}
            "#,
            STUDENT_APPLICATION_COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(status == ApplicationStatus::Approved)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| RepositoryError::NotFound("Application not found".to_string()))
    }
}
