use crate::auth::auth::AuthUser;
use crate::model::holiday::Holiday;
use crate::utils::cache;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateHoliday {
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "New Year's Day")]
    pub note: String,
}

/// List designated holidays
#[utoipa::path(
    get,
    path = "/api/v1/holidays",
    responses(
        (status = 200, description = "Holiday list", body = [Holiday]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn list_holidays(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let rows = sqlx::query_as::<_, Holiday>("SELECT id, date, note FROM holidays ORDER BY date")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch holidays");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Designate a holiday (Admin)
#[utoipa::path(
    post,
    path = "/api/v1/holidays",
    request_body = CreateHoliday,
    responses(
        (status = 201, description = "Holiday added"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Holiday already exists for that date")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn create_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateHoliday>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let result = sqlx::query("INSERT INTO holidays (date, note) VALUES (?, ?)")
        .bind(payload.date)
        .bind(&payload.note)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(_) => {
            cache::invalidate_holidays().await;
            Ok(HttpResponse::Created().json(serde_json::json!({
                "message": "Holiday added"
            })))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(serde_json::json!({
                        "message": "Holiday already exists for that date"
                    })));
                }
            }

            tracing::error!(error = %e, "Failed to add holiday");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Remove a holiday (Admin)
#[utoipa::path(
    delete,
    path = "/api/v1/holidays/{holiday_id}",
    params(
        ("holiday_id" = u64, Path, description = "Holiday ID")
    ),
    responses(
        (status = 200, description = "Holiday removed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Holiday not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn delete_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let holiday_id = path.into_inner();

    let result = sqlx::query("DELETE FROM holidays WHERE id = ?")
        .bind(holiday_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, holiday_id, "Failed to delete holiday");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Holiday not found"
        })));
    }

    cache::invalidate_holidays().await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Holiday removed"
    })))
}
