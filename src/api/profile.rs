use crate::api::leave_request::committed_hours;
use crate::auth::auth::AuthUser;
use crate::model::leave_request::LeaveType;
use crate::model::user::User;
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct QuotaStat {
    #[schema(example = 80.0)]
    pub total: f64,
    #[schema(example = 16.0)]
    pub used: f64,
    #[schema(example = 64.0)]
    pub remaining: f64,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: User,
    pub quota_annual: QuotaStat,
    pub quota_birthday: QuotaStat,
    pub quota_comp: QuotaStat,
}

fn stat(total: f64, used: f64) -> QuotaStat {
    QuotaStat {
        total,
        used,
        remaining: total - used,
    }
}

/// Own profile with quota usage
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Profile with quota summary", body = ProfileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account no longer exists")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Profile"
)]
pub async fn me(auth: AuthUser, pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, display_name, department, role_id,
               quota_annual, quota_birthday, quota_comp,
               onboard_date, deleted, last_login_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(auth.user_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to fetch profile");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(user) = user else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Account no longer exists"
        })));
    };

    let mut used = [0.0; 3];
    for (slot, leave_type) in used
        .iter_mut()
        .zip([LeaveType::Annual, LeaveType::Birthday, LeaveType::Comp])
    {
        *slot = committed_hours(pool.get_ref(), auth.user_id, leave_type)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = auth.user_id, "Failed to sum quota usage");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;
    }

    let response = ProfileResponse {
        quota_annual: stat(user.quota_annual, used[0]),
        quota_birthday: stat(user.quota_birthday, used[1]),
        quota_comp: stat(user.quota_comp, used[2]),
        user,
    };

    Ok(HttpResponse::Ok().json(response))
}
