use crate::auth::auth::AuthUser;
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use sqlx::MySqlPool;
use sqlx::prelude::FromRow;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct RangeQuery {
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub start: NaiveDate,
    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub end: NaiveDate,
}

#[derive(FromRow)]
struct AttendanceCsvRow {
    date: NaiveDate,
    username: String,
    display_name: String,
    department: String,
    time: NaiveTime,
    punch_type: String,
    distance_m: f64,
    status: String,
}

#[derive(FromRow)]
struct RequestCsvRow {
    username: String,
    display_name: String,
    leave_type: Option<String>,
    start_at: NaiveDateTime,
    end_at: NaiveDateTime,
    hours: f64,
    status: String,
    reason: String,
    reject_reason: Option<String>,
}

// Excel needs the BOM to pick UTF-8 for non-ASCII names.
fn csv_response(filename: &str, data: Vec<u8>) -> HttpResponse {
    let mut body = Vec::with_capacity(data.len() + 3);
    body.extend_from_slice(b"\xEF\xBB\xBF");
    body.extend_from_slice(&data);

    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(body)
}

fn csv_error(e: impl std::fmt::Display) -> actix_web::Error {
    tracing::error!(error = %e, "CSV serialization failed");
    actix_web::error::ErrorInternalServerError("Internal Server Error")
}

fn write_request_rows(rows: Vec<RequestCsvRow>, type_fallback: &str) -> Result<Vec<u8>, actix_web::Error> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "username", "name", "type", "start", "end", "hours", "status", "reason", "reject_reason",
    ])
    .map_err(csv_error)?;

    for row in rows {
        wtr.write_record([
            row.username,
            row.display_name,
            row.leave_type
                .unwrap_or_else(|| type_fallback.to_string()),
            row.start_at.format("%Y-%m-%d %H:%M").to_string(),
            row.end_at.format("%Y-%m-%d %H:%M").to_string(),
            row.hours.to_string(),
            row.status,
            row.reason,
            row.reject_reason.unwrap_or_default(),
        ])
        .map_err(csv_error)?;
    }

    wtr.into_inner().map_err(csv_error)
}

/// Export attendance records as CSV (Admin)
#[utoipa::path(
    get,
    path = "/api/v1/reports/attendance.csv",
    params(RangeQuery),
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn export_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<RangeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let rows = sqlx::query_as::<_, AttendanceCsvRow>(
        r#"
        SELECT r.date, u.username, u.display_name, u.department,
               r.time, r.punch_type, r.distance_m, r.status
        FROM attendance_records r
        JOIN users u ON u.id = r.user_id
        WHERE r.date BETWEEN ? AND ?
        ORDER BY r.date, r.time
        "#,
    )
    .bind(query.start)
    .bind(query.end)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch attendance export");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date", "username", "name", "department", "time", "type", "distance_m", "status",
    ])
    .map_err(csv_error)?;

    for row in rows {
        wtr.write_record([
            row.date.to_string(),
            row.username,
            row.display_name,
            row.department,
            row.time.format("%H:%M:%S").to_string(),
            row.punch_type,
            format!("{:.0}", row.distance_m),
            row.status,
        ])
        .map_err(csv_error)?;
    }

    let data = wtr.into_inner().map_err(csv_error)?;
    let filename = format!("attendance_{}_{}.csv", query.start, query.end);

    Ok(csv_response(&filename, data))
}

/// Export leave requests as CSV (Admin)
#[utoipa::path(
    get,
    path = "/api/v1/reports/leave.csv",
    params(RangeQuery),
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn export_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<RangeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    // A request belongs to the range when its interval overlaps it.
    let rows = sqlx::query_as::<_, RequestCsvRow>(
        r#"
        SELECT u.username, u.display_name, l.leave_type,
               l.start_at, l.end_at, l.hours, l.status, l.reason, l.reject_reason
        FROM leave_requests l
        JOIN users u ON u.id = l.user_id
        WHERE DATE(l.start_at) <= ? AND DATE(l.end_at) >= ?
        ORDER BY l.start_at
        "#,
    )
    .bind(query.end)
    .bind(query.start)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch leave export");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data = write_request_rows(rows, "")?;
    let filename = format!("leave_{}_{}.csv", query.start, query.end);

    Ok(csv_response(&filename, data))
}

/// Export overtime requests as CSV (Admin)
#[utoipa::path(
    get,
    path = "/api/v1/reports/overtime.csv",
    params(RangeQuery),
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn export_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<RangeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let rows = sqlx::query_as::<_, RequestCsvRow>(
        r#"
        SELECT u.username, u.display_name, NULL AS leave_type,
               o.start_at, o.end_at, o.hours, o.status, o.reason, o.reject_reason
        FROM overtime_requests o
        JOIN users u ON u.id = o.user_id
        WHERE DATE(o.start_at) <= ? AND DATE(o.end_at) >= ?
        ORDER BY o.start_at
        "#,
    )
    .bind(query.end)
    .bind(query.start)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch overtime export");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data = write_request_rows(rows, "overtime")?;
    let filename = format!("overtime_{}_{}.csv", query.start, query.end);

    Ok(csv_response(&filename, data))
}

/// Export one employee's leave history as CSV (Admin)
#[utoipa::path(
    get,
    path = "/api/v1/reports/employees/{employee_id}/leave.csv",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn export_employee_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    let rows = sqlx::query_as::<_, RequestCsvRow>(
        r#"
        SELECT u.username, u.display_name, l.leave_type,
               l.start_at, l.end_at, l.hours, l.status, l.reason, l.reject_reason
        FROM leave_requests l
        JOIN users u ON u.id = l.user_id
        WHERE l.user_id = ?
        ORDER BY l.start_at
        "#,
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch employee leave export");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data = write_request_rows(rows, "")?;
    let filename = format!("employee_{}_leave.csv", employee_id);

    Ok(csv_response(&filename, data))
}
