use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Review state shared by teacher and student applications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(format!("Invalid application status: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeacherApplication {
    pub id: i32,
    pub user_id: String,
    pub field: String,
    // Kept for compatibility; every applicant passes with 0
    pub quiz_result: i32,
    pub passed: bool,
    pub teacher_name: Option<String>,
    pub teacher_surname: Option<String>,
    pub teacher_phone_number: Option<String>,
    pub teacher_email: Option<String>,
    pub classification: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TeacherApplication {
    pub fn status_enum(&self) -> ApplicationStatus {
        ApplicationStatus::from_str(&self.status).unwrap_or(ApplicationStatus::Pending)
    }
}

/// Private lesson request from a student
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudentApplication {
    pub id: i32,
    pub student_name: String,
    pub student_surname: String,
    pub student_phone_number: String,
    pub student_email: String,
    pub field: String,
    pub student_needs: Option<String>,
    pub user_id: Option<String>,
    pub status: String,
    pub approved: bool,
    pub created_at: NaiveDateTime,
}
