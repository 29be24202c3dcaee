use crate::error::{AppError, AppResult};
use crate::models::{ApplicationStatus, StudentApplication, TeacherApplication};
use crate::repositories::{
    ApplicationRepository, FieldGrant, NewStudentApplication, NewTeacherApplication,
};
use std::sync::Arc;
use tracing::info;

fn require_filled(value: &str, name: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", name)));
    }
    Ok(())
}

pub fn validate_teacher_application(application: &NewTeacherApplication) -> AppResult<()> {
    require_filled(&application.field, "field")?;
    require_filled(&application.teacher_name, "teacherName")?;
    require_filled(&application.teacher_surname, "teacherSurname")?;
    require_filled(&application.teacher_phone_number, "teacherPhoneNumber")?;
    require_filled(&application.teacher_email, "teacherEmail")?;
    if !application.teacher_email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    Ok(())
}

pub fn validate_student_application(application: &NewStudentApplication) -> AppResult<()> {
    require_filled(&application.student_name, "studentName")?;
    require_filled(&application.student_surname, "studentSurname")?;
    require_filled(&application.student_phone_number, "studentPhoneNumber")?;
    require_filled(&application.student_email, "studentEmail")?;
    require_filled(&application.field, "field")?;
    if !application.student_email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    Ok(())
}

pub struct ApplicationService {
    application_repo: Arc<ApplicationRepository>,
}

impl ApplicationService {
    pub fn new(application_repo: Arc<ApplicationRepository>) -> Self {
        Self { application_repo }
    }

    pub async fn submit_teacher_application(
        &self,
        user_id: &str,
        application: NewTeacherApplication,
    ) -> AppResult<TeacherApplication> {
        validate_teacher_application(&application)?;

        if self
            .application_repo
            .has_open_teacher_application(user_id)
            .await?
        {
            return Err(AppError::Conflict(
                "You already have a pending or approved application".to_string(),
            ));
        }

        let row = self
            .application_repo
            .create_teacher_application(user_id, &application)
            .await?;
        info!("Teacher application submitted: id={}, user={}", row.id, user_id);
        Ok(row)
    }

    pub async fn list_teacher_applications(&self) -> AppResult<Vec<TeacherApplication>> {
        Ok(self.application_repo.list_teacher_applications().await?)
    }

    pub async fn review_teacher_application(
        &self,
        id: i32,
        status: ApplicationStatus,
        fields: Vec<FieldGrant>,
    ) -> AppResult<TeacherApplication> {
        let row = match status {
            ApplicationStatus::Approved => {
                self.application_repo
                    .approve_teacher_application(id, &fields)
                    .await?
            }
            ApplicationStatus::Rejected => self.application_repo.reject_teacher_application(id).await?,
            ApplicationStatus::Pending => {
                return Err(AppError::Validation(
                    "Status must be approved or rejected".to_string(),
                ))
            }
        };

        info!(
            "Teacher application reviewed: id={}, status={}, fields={}",
            id,
            status.as_str(),
            fields.len()
        );
        Ok(row)
    }

    pub async fn submit_student_application(
        &self,
        user_id: &str,
        application: NewStudentApplication,
    ) -> AppResult<StudentApplication> {
        validate_student_application(&application)?;
        let row = self
            .application_repo
            .create_student_application(Some(user_id), &application)
            .await?;
        info!("Student application submitted: id={}, user={}", row.id, user_id);
        Ok(row)
    }

    pub async fn list_student_applications(&self) -> AppResult<Vec<StudentApplication>> {
        Ok(self.application_repo.list_student_applications().await?)
    }

    pub async fn review_student_application(
        &self,
        id: i32,
        status: ApplicationStatus,
    ) -> AppResult<StudentApplication> {
        if status == ApplicationStatus::Pending {
            return Err(AppError::Validation(
                "Status must be approved or rejected".to_string(),
            ));
        }
        let row = self
            .application_repo
            .set_student_application_status(id, status)
            .await?;
        info!("Student application reviewed: id={}, status={}", id, status.as_str());
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teacher_application() -> NewTeacherApplication {
        NewTeacherApplication {
            field: "Matematik".into(),
            teacher_name: "Ali".into(),
            teacher_surname: "Yılmaz".into(),
            teacher_phone_number: "5551234567".into(),
            teacher_email: "ali@example.com".into(),
            classification: None,
        }
    }

    #[test]
    fn test_complete_teacher_application_passes() {
        assert!(validate_teacher_application(&teacher_application()).is_ok());
    }

    #[test]
    fn test_missing_fields_rejected() {
        let mut app = teacher_application();
        app.teacher_surname = "  ".into();
        assert!(validate_teacher_application(&app).is_err());

        let mut app = teacher_application();
        app.teacher_email = "not-an-email".into();
        assert!(validate_teacher_application(&app).is_err());
    }
}
