use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementCategory {
    General,
    Urgent,
    System,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Announcement {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Office closed on Friday")]
    pub title: String,
    pub content: String,
    #[schema(example = "general")]
    pub category: String,
    #[schema(example = "admin")]
    pub author: String,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}
