use crate::auth::auth::AuthUser;
use crate::clock::work_hours;
use crate::model::leave_request::{LeaveType, RequestStatus};
use crate::utils::cache;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{MySqlPool, prelude::FromRow};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "annual")]
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-05T08:30:00", value_type = String, format = "date-time")]
    pub start_at: NaiveDateTime,
    #[schema(example = "2026-01-05T17:30:00", value_type = String, format = "date-time")]
    pub end_at: NaiveDateTime,
    #[schema(example = "Family trip")]
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RejectBody {
    #[schema(example = "Staffing shortage that week")]
    pub reason: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by user ID (admins only; employees always see their own)
    #[schema(example = 42)]
    pub user_id: Option<u64>,
    /// Filter by request status
    #[schema(example = "pending")]
    pub status: Option<String>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 10)]
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

#[derive(Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaveResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "jlin")]
    pub username: String,
    #[schema(example = "Jessica Lin")]
    pub display_name: String,
    #[schema(example = "annual")]
    pub leave_type: String,
    #[schema(example = "2026-01-05T08:30:00", value_type = String, format = "date-time")]
    pub start_at: NaiveDateTime,
    #[schema(example = "2026-01-05T17:30:00", value_type = String, format = "date-time")]
    pub end_at: NaiveDateTime,
    #[schema(example = 8.0)]
    pub hours: f64,
    pub reason: String,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(nullable = true)]
    pub reject_reason: Option<String>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

/// Hours of a leave type already committed (approved or still pending) by a
/// user. Pending hours count so a user cannot oversubscribe a quota with
/// parallel requests.
pub(crate) async fn committed_hours(
    pool: &MySqlPool,
    user_id: u64,
    leave_type: LeaveType,
) -> Result<f64, sqlx::Error> {
    sqlx::query_scalar::<_, f64>(
        r#"
        SELECT COALESCE(SUM(hours), 0)
        FROM leave_requests
        WHERE user_id = ?
        AND leave_type = ?
        AND status IN ('pending', 'approved')
        "#,
    )
    .bind(user_id)
    .bind(leave_type.to_string())
    .fetch_one(pool)
    .await
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted",
         body = Object,
         example = json!({
            "message": "Leave request submitted",
            "hours": 8.0,
            "status": "pending"
         })
        ),
        (status = 400, description = "Invalid interval or insufficient quota"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    if payload.end_at <= payload.start_at {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "end_at must be after start_at"
        })));
    }

    let holidays = cache::holiday_dates(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to load holidays");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let hours = work_hours::leave_hours(payload.start_at, payload.end_at, &holidays);

    if hours <= 0.0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Interval contains no working hours"
        })));
    }

    // Quota check for capped leave types
    if payload.leave_type.is_quota_limited() {
        let quota_column = match payload.leave_type {
            LeaveType::Annual => "quota_annual",
            LeaveType::Birthday => "quota_birthday",
            _ => "quota_comp",
        };

        let quota = sqlx::query_scalar::<_, f64>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            quota_column
        ))
        .bind(auth.user_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = auth.user_id, "Failed to fetch quota");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

        let used = committed_hours(pool.get_ref(), auth.user_id, payload.leave_type)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = auth.user_id, "Failed to sum used hours");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

        let remaining = quota - used;
        if hours > remaining {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": format!(
                    "Insufficient {} quota: requested {}h, remaining {}h",
                    payload.leave_type, hours, remaining
                )
            })));
        }
    }

    sqlx::query(
        r#"
        INSERT INTO leave_requests
            (user_id, leave_type, start_at, end_at, hours, reason)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(auth.user_id)
    .bind(payload.leave_type.to_string())
    .bind(payload.start_at)
    .bind(payload.end_at)
    .bind(hours)
    .bind(&payload.reason)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to create leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request submitted",
        "hours": hours,
        "status": RequestStatus::Pending,
    })))
}

/* =========================
Approve leave (Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved", body = Object, example = json!({
            "message": "Leave approved"
        })),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let leave_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = 'approved'
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Approve leave failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave approved"
    })))
}

/* =========================
Reject leave (Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    request_body = RejectBody,
    responses(
        (status = 200, description = "Leave rejected", body = Object, example = json!({
            "message": "Leave rejected"
        })),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<RejectBody>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let leave_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = 'rejected', reject_reason = ?
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(&body.reason)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Reject leave failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave rejected"
    })))
}

/* =========================
Cancel own pending leave
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/cancel",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to cancel")
    ),
    responses(
        (status = 200, description = "Leave cancelled", body = Object, example = json!({
            "message": "Leave cancelled"
        })),
        (status = 400, description = "Leave request not found, not yours, or already processed"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = 'cancelled'
        WHERE id = ?
        AND user_id = ?
        AND status = 'pending'
        "#,
    )
    .bind(leave_id)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Cancel leave failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found, not yours, or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave cancelled"
    })))
}

/// Delete a leave request (Admin)
#[utoipa::path(
    delete,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to delete")
    ),
    responses(
        (status = 200, description = "Leave request deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn delete_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let leave_id = path.into_inner();

    let result = sqlx::query("DELETE FROM leave_requests WHERE id = ?")
        .bind(leave_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id, "Delete leave failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave request not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request deleted"
    })))
}

/// Get one leave request
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let leave = sqlx::query_as::<_, LeaveResponse>(
        r#"
        SELECT l.id, l.user_id, u.username, u.display_name,
               l.leave_type, l.start_at, l.end_at, l.hours, l.reason,
               l.status, l.reject_reason, l.created_at
        FROM leave_requests l
        JOIN users u ON u.id = l.user_id
        WHERE l.id = ?
        "#,
    )
    .bind(leave_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match leave {
        Some(data) => {
            if data.user_id != auth.user_id && !auth.is_admin() {
                return Err(actix_web::error::ErrorForbidden("Not your request"));
            }
            Ok(HttpResponse::Ok().json(data))
        }
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave request not found"
        }))),
    }
}

/// List leave requests
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let user_filter = if auth.is_admin() {
        query.user_id
    } else {
        Some(auth.user_id)
    };

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(user_id) = user_filter {
        where_sql.push_str(" AND l.user_id = ?");
        args.push(FilterValue::U64(user_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND l.status = ?");
        args.push(FilterValue::Str(status));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM leave_requests l{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count leave requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT l.id, l.user_id, u.username, u.display_name,
               l.leave_type, l.start_at, l.end_at, l.hours, l.reason,
               l.status, l.reject_reason, l.created_at
        FROM leave_requests l
        JOIN users u ON u.id = l.user_id
        {}
        ORDER BY l.created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveResponse>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch leave list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: leaves,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}
