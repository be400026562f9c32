use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "username": "jlin",
        "display_name": "Jessica Lin",
        "department": "Engineering",
        "role_id": 2,
        "quota_annual": 80.0,
        "quota_birthday": 8.0,
        "quota_comp": 0.0,
        "onboard_date": "2024-03-01",
        "deleted": false
    })
)]
pub struct User {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "jlin")]
    pub username: String,

    #[schema(example = "Jessica Lin")]
    pub display_name: String,

    #[schema(example = "Engineering")]
    pub department: String,

    #[schema(example = 2)]
    pub role_id: u8,

    /// Annual leave quota in hours.
    #[schema(example = 80.0)]
    pub quota_annual: f64,

    /// Birthday leave quota in hours.
    #[schema(example = 8.0)]
    pub quota_birthday: f64,

    /// Compensatory leave quota in hours.
    #[schema(example = 0.0)]
    pub quota_comp: f64,

    #[schema(example = "2024-03-01", value_type = String, format = "date", nullable = true)]
    pub onboard_date: Option<NaiveDate>,

    /// Soft-delete flag; archived users cannot log in.
    pub deleted: bool,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub last_login_at: Option<DateTime<Utc>>,
}
