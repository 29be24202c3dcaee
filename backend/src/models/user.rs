use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Platform role of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Student,
    Teacher,
    Admin,
}

impl UserRole {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "student" => Ok(UserRole::Student),
            "teacher" => Ok(UserRole::Teacher),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Student => "student",
            UserRole::Teacher => "teacher",
            UserRole::Admin => "admin",
        }
    }
}

impl From<String> for UserRole {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(UserRole::User)
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

/// Profile link shown on a user's page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLink {
    pub id: String,
    pub label: String,
    pub url: String,
}

/// Account row keyed by the identity provider's user id
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub description: String,
    pub avatar: String,
    pub provider: String,
    pub links: Value, // JSONB array of UserLink
    pub role: String, // Stored as TEXT, use UserRole enum for type safety
    pub meet_link: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub fn role_enum(&self) -> UserRole {
        UserRole::from_str(&self.role).unwrap_or(UserRole::User)
    }

    pub fn is_admin(&self) -> bool {
        self.role_enum() == UserRole::Admin
    }

    /// Admins may act as teachers everywhere a teacher may
    pub fn is_teacher(&self) -> bool {
        matches!(self.role_enum(), UserRole::Teacher | UserRole::Admin)
    }

    pub fn links_vec(&self) -> Vec<UserLink> {
        serde_json::from_value(self.links.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_role(role: &str) -> User {
        let now = chrono::Utc::now().naive_utc();
        User {
            id: "u1".into(),
            email: "ogrenci@example.com".into(),
            name: "Öğrenci".into(),
            description: String::new(),
            avatar: String::new(),
            provider: "email".into(),
            links: serde_json::json!([{ "id": "1", "label": "GitHub", "url": "https://github.com" }]),
            role: role.into(),
            meet_link: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_role_round_trip_and_fallback() {
        assert_eq!(UserRole::from_str("TEACHER"), Ok(UserRole::Teacher));
        assert!(UserRole::from_str("owner").is_err());
        assert_eq!(UserRole::from("garbage".to_string()), UserRole::User);
    }

    #[test]
    fn test_admin_counts_as_teacher() {
        assert!(user_with_role("admin").is_teacher());
        assert!(user_with_role("teacher").is_teacher());
        assert!(!user_with_role("student").is_teacher());
    }

    #[test]
    fn test_links_decode() {
        let links = user_with_role("user").links_vec();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].label, "GitHub");
    }
}
