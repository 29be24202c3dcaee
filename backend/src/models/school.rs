use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// School level used to group the school leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolType {
    University,
    HighSchool,
    SecondarySchool,
    ElementarySchool,
}

impl SchoolType {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "university" => Ok(SchoolType::University),
            "high_school" => Ok(SchoolType::HighSchool),
            "secondary_school" => Ok(SchoolType::SecondarySchool),
            "elementary_school" => Ok(SchoolType::ElementarySchool),
            _ => Err(format!("Invalid school type: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchoolType::University => "university",
            SchoolType::HighSchool => "high_school",
            SchoolType::SecondarySchool => "secondary_school",
            SchoolType::ElementarySchool => "elementary_school",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub district: String,
    pub category: String,
    pub kind: Option<String>,
    pub total_points: i32,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub school_type: String,
}

/// Leaderboard row for schools
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SchoolStanding {
    pub school_id: i32,
    pub school_name: String,
    pub total_points: i32,
}

/// Leaderboard row for learners
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserStanding {
    pub user_id: String,
    pub user_name: String,
    pub user_image_src: String,
    pub points: i32,
}
