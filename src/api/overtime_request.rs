use crate::api::leave_request::RejectBody;
use crate::auth::auth::AuthUser;
use crate::clock::work_hours;
use crate::model::leave_request::RequestStatus;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{MySqlPool, prelude::FromRow};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateOvertime {
    #[schema(example = "2026-01-05T18:00:00", value_type = String, format = "date-time")]
    pub start_at: NaiveDateTime,
    #[schema(example = "2026-01-05T21:30:00", value_type = String, format = "date-time")]
    pub end_at: NaiveDateTime,
    #[schema(example = "Release night")]
    pub reason: String,
}

/// Admin-side modification of a submitted request. The note is mandatory so
/// the requester can see why their entry was changed.
#[derive(Deserialize, ToSchema)]
pub struct UpdateOvertime {
    #[schema(example = "2026-01-05T18:00:00", value_type = String, format = "date-time")]
    pub start_at: NaiveDateTime,
    #[schema(example = "2026-01-05T20:00:00", value_type = String, format = "date-time")]
    pub end_at: NaiveDateTime,
    #[schema(example = "Adjusted to badge-reader exit time")]
    pub admin_note: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct OvertimeFilter {
    /// Filter by user ID (admins only; employees always see their own)
    #[schema(example = 42)]
    pub user_id: Option<u64>,
    #[schema(example = "pending")]
    pub status: Option<String>,
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 10)]
    pub per_page: Option<u64>,
}

enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

#[derive(Serialize, Deserialize, FromRow, ToSchema)]
pub struct OvertimeResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "jlin")]
    pub username: String,
    #[schema(example = "Jessica Lin")]
    pub display_name: String,
    #[schema(example = "2026-01-05T18:00:00", value_type = String, format = "date-time")]
    pub start_at: NaiveDateTime,
    #[schema(example = "2026-01-05T21:30:00", value_type = String, format = "date-time")]
    pub end_at: NaiveDateTime,
    #[schema(example = 3.5)]
    pub hours: f64,
    pub reason: String,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(nullable = true)]
    pub reject_reason: Option<String>,
    #[schema(nullable = true)]
    pub admin_note: Option<String>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
pub struct OvertimeListResponse {
    pub data: Vec<OvertimeResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

/// Submit an overtime request
#[utoipa::path(
    post,
    path = "/api/v1/overtime",
    request_body = CreateOvertime,
    responses(
        (status = 200, description = "Overtime request submitted", body = Object, example = json!({
            "message": "Overtime request submitted",
            "hours": 3.5,
            "status": "pending"
        })),
        (status = 400, description = "Invalid interval"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Overtime"
)]
pub async fn create_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateOvertime>,
) -> actix_web::Result<impl Responder> {
    if payload.end_at <= payload.start_at {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "end_at must be after start_at"
        })));
    }

    let hours = work_hours::overtime_hours(payload.start_at, payload.end_at);

    if hours <= 0.0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Interval is too short"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO overtime_requests
            (user_id, start_at, end_at, hours, reason)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(auth.user_id)
    .bind(payload.start_at)
    .bind(payload.end_at)
    .bind(hours)
    .bind(&payload.reason)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to create overtime request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Overtime request submitted",
        "hours": hours,
        "status": RequestStatus::Pending,
    })))
}

/// Approve an overtime request (Admin)
#[utoipa::path(
    put,
    path = "/api/v1/overtime/{overtime_id}/approve",
    params(
        ("overtime_id" = u64, Path, description = "ID of the overtime request to approve")
    ),
    responses(
        (status = 200, description = "Overtime approved"),
        (status = 400, description = "Overtime request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Overtime"
)]
pub async fn approve_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let overtime_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE overtime_requests
        SET status = 'approved'
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(overtime_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, overtime_id, "Approve overtime failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Overtime request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Overtime approved"
    })))
}

/// Reject an overtime request (Admin)
#[utoipa::path(
    put,
    path = "/api/v1/overtime/{overtime_id}/reject",
    params(
        ("overtime_id" = u64, Path, description = "ID of the overtime request to reject")
    ),
    request_body = RejectBody,
    responses(
        (status = 200, description = "Overtime rejected"),
        (status = 400, description = "Overtime request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Overtime"
)]
pub async fn reject_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<RejectBody>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let overtime_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE overtime_requests
        SET status = 'rejected', reject_reason = ?
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(&body.reason)
    .bind(overtime_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, overtime_id, "Reject overtime failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Overtime request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Overtime rejected"
    })))
}

/// Cancel own pending overtime request
#[utoipa::path(
    put,
    path = "/api/v1/overtime/{overtime_id}/cancel",
    params(
        ("overtime_id" = u64, Path, description = "ID of the overtime request to cancel")
    ),
    responses(
        (status = 200, description = "Overtime cancelled"),
        (status = 400, description = "Overtime request not found, not yours, or already processed"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Overtime"
)]
pub async fn cancel_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let overtime_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE overtime_requests
        SET status = 'cancelled'
        WHERE id = ?
        AND user_id = ?
        AND status = 'pending'
        "#,
    )
    .bind(overtime_id)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, overtime_id, "Cancel overtime failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Overtime request not found, not yours, or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Overtime cancelled"
    })))
}

/// Edit an overtime request (Admin)
#[utoipa::path(
    put,
    path = "/api/v1/overtime/{overtime_id}",
    params(
        ("overtime_id" = u64, Path, description = "ID of the overtime request to edit")
    ),
    request_body = UpdateOvertime,
    responses(
        (status = 200, description = "Overtime updated", body = Object, example = json!({
            "message": "Overtime updated",
            "hours": 2.0
        })),
        (status = 400, description = "Invalid interval"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Overtime request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Overtime"
)]
pub async fn update_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateOvertime>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let overtime_id = path.into_inner();

    if payload.end_at <= payload.start_at {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "end_at must be after start_at"
        })));
    }

    if payload.admin_note.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "admin_note is required when editing a request"
        })));
    }

    let hours = work_hours::overtime_hours(payload.start_at, payload.end_at);

    let result = sqlx::query(
        r#"
        UPDATE overtime_requests
        SET start_at = ?, end_at = ?, hours = ?, admin_note = ?
        WHERE id = ?
        "#,
    )
    .bind(payload.start_at)
    .bind(payload.end_at)
    .bind(hours)
    .bind(payload.admin_note.trim())
    .bind(overtime_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, overtime_id, "Update overtime failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Overtime request not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Overtime updated",
        "hours": hours
    })))
}

/// Delete an overtime request (Admin)
#[utoipa::path(
    delete,
    path = "/api/v1/overtime/{overtime_id}",
    params(
        ("overtime_id" = u64, Path, description = "ID of the overtime request to delete")
    ),
    responses(
        (status = 200, description = "Overtime request deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Overtime request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Overtime"
)]
pub async fn delete_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let overtime_id = path.into_inner();

    let result = sqlx::query("DELETE FROM overtime_requests WHERE id = ?")
        .bind(overtime_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, overtime_id, "Delete overtime failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Overtime request not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Overtime request deleted"
    })))
}

/// Get one overtime request
#[utoipa::path(
    get,
    path = "/api/v1/overtime/{overtime_id}",
    params(
        ("overtime_id" = u64, Path, description = "ID of the overtime request to fetch")
    ),
    responses(
        (status = 200, description = "Overtime request found", body = OvertimeResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Overtime request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Overtime"
)]
pub async fn get_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let overtime_id = path.into_inner();

    let overtime = sqlx::query_as::<_, OvertimeResponse>(
        r#"
        SELECT o.id, o.user_id, u.username, u.display_name,
               o.start_at, o.end_at, o.hours, o.reason,
               o.status, o.reject_reason, o.admin_note, o.created_at
        FROM overtime_requests o
        JOIN users u ON u.id = o.user_id
        WHERE o.id = ?
        "#,
    )
    .bind(overtime_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, overtime_id, "Failed to fetch overtime request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match overtime {
        Some(data) => {
            if data.user_id != auth.user_id && !auth.is_admin() {
                return Err(actix_web::error::ErrorForbidden("Not your request"));
            }
            Ok(HttpResponse::Ok().json(data))
        }
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Overtime request not found"
        }))),
    }
}

/// List overtime requests
#[utoipa::path(
    get,
    path = "/api/v1/overtime",
    params(OvertimeFilter),
    responses(
        (status = 200, description = "Paginated overtime list", body = OvertimeListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Overtime"
)]
pub async fn overtime_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<OvertimeFilter>,
) -> actix_web::Result<impl Responder> {
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let user_filter = if auth.is_admin() {
        query.user_id
    } else {
        Some(auth.user_id)
    };

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(user_id) = user_filter {
        where_sql.push_str(" AND o.user_id = ?");
        args.push(FilterValue::U64(user_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND o.status = ?");
        args.push(FilterValue::Str(status));
    }

    let count_sql = format!("SELECT COUNT(*) FROM overtime_requests o{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count overtime requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT o.id, o.user_id, u.username, u.display_name,
               o.start_at, o.end_at, o.hours, o.reason,
               o.status, o.reject_reason, o.admin_note, o.created_at
        FROM overtime_requests o
        JOIN users u ON u.id = o.user_id
        {}
        ORDER BY o.created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, OvertimeResponse>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let overtimes = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch overtime list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(OvertimeListResponse {
        data: overtimes,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}
