use crate::{
    auth::auth::AuthUser,
    auth::password::hash_password,
    model::role::Role,
    model::user::User,
    utils::account_filter,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "jlin")]
    pub username: String,
    #[schema(example = "initial-password")]
    pub password: String,
    #[schema(example = "Jessica Lin")]
    pub display_name: String,
    #[schema(example = "Engineering")]
    pub department: String,
    /// 1 = admin, 2 = employee
    #[schema(example = 2)]
    pub role_id: u8,
    #[schema(example = 80.0)]
    #[serde(default)]
    pub quota_annual: f64,
    #[schema(example = 8.0)]
    #[serde(default)]
    pub quota_birthday: f64,
    #[schema(example = 0.0)]
    #[serde(default)]
    pub quota_comp: f64,
    #[schema(example = "2026-01-01", value_type = String, format = "date", nullable = true)]
    pub onboard_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub department: Option<String>,
    /// Include archived (soft-deleted) users
    pub include_archived: Option<bool>,
    /// Search by username or display name
    pub search: Option<String>,
}

/// Documented shape of the dynamic profile update payload. The handler takes
/// raw JSON and validates keys against the updatable-columns whitelist.
#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub display_name: Option<String>,
    pub department: Option<String>,
    /// 1 = admin, 2 = employee
    pub role_id: Option<u8>,
    pub quota_annual: Option<f64>,
    pub quota_birthday: Option<f64>,
    pub quota_comp: Option<f64>,
    #[schema(example = "2026-01-01", value_type = String, format = "date", nullable = true)]
    pub onboard_date: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<User>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 10)]
    pub total: i64,
}

/// Columns the dynamic profile update may touch. Credentials and the
/// soft-delete flag have dedicated endpoints.
const UPDATABLE_COLUMNS: &[&str] = &[
    "display_name",
    "department",
    "role_id",
    "quota_annual",
    "quota_birthday",
    "quota_comp",
    "onboard_date",
];

/// true  => username AVAILABLE
/// false => username TAKEN
pub async fn is_username_available(username: &str, pool: &MySqlPool) -> bool {
    let username = username.to_lowercase();

    // 1. Cuckoo filter: fast negative
    if !account_filter::might_exist(&username) {
        return true;
    }

    // 2. Database fallback
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? LIMIT 1)",
    )
    .bind(&username)
    .fetch_one(pool)
    .await
    .unwrap_or(true); // fail-safe

    !exists
}

/// Create employee account (Admin)
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee account created", body = Object, example = json!({
            "message": "Employee account created"
        })),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Username already taken"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let username = payload.username.trim().to_lowercase();

    if username.is_empty() || payload.password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Username and password must not be empty"
        })));
    }

    if Role::from_id(payload.role_id).is_none() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Invalid role_id"
        })));
    }

    if !is_username_available(&username, pool.get_ref()).await {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Username already taken"
        })));
    }

    let hashed = hash_password(&payload.password);

    let result = sqlx::query(
        r#"
        INSERT INTO users
            (username, password, display_name, department, role_id,
             quota_annual, quota_birthday, quota_comp, onboard_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&username)
    .bind(&hashed)
    .bind(&payload.display_name)
    .bind(&payload.department)
    .bind(payload.role_id)
    .bind(payload.quota_annual)
    .bind(payload.quota_birthday)
    .bind(payload.quota_comp)
    .bind(payload.onboard_date)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => {
            account_filter::insert(&username);
            Ok(HttpResponse::Created().json(json!({
                "message": "Employee account created"
            })))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                // Unique-key race with a concurrent create
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Username already taken"
                    })));
                }
            }

            error!(error = %e, "Failed to create employee account");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

/// List employees (Admin)
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if !query.include_archived.unwrap_or(false) {
        conditions.push("deleted = FALSE");
    }

    if let Some(department) = &query.department {
        conditions.push("department = ?");
        bindings.push(department.clone());
    }

    if let Some(search) = &query.search {
        conditions.push("(username LIKE ? OR display_name LIKE ?)");
        let like = format!("%{}%", search);
        bindings.push(like.clone());
        bindings.push(like);
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) as total FROM users {}", where_clause);
    debug!(sql = %count_sql, bindings = ?bindings, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count employees");
        ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        r#"
        SELECT id, username, display_name, department, role_id,
               quota_annual, quota_birthday, quota_comp,
               onboard_date, deleted, last_login_at
        FROM users {} ORDER BY id DESC LIMIT ? OFFSET ?
        "#,
        where_clause
    );
    debug!(sql = %data_sql, page, per_page, offset, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, User>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let employees = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch employees");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Get employee by ID (Admin)
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = User),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    let employee = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, display_name, department, role_id,
               quota_annual, quota_birthday, quota_comp,
               onboard_date, deleted, last_login_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch employee");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match employee {
        Some(emp) => Ok(HttpResponse::Ok().json(emp)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        }))),
    }
}

/// Update employee profile/quotas (Admin)
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated"),
        (status = 400, description = "Unknown or missing fields"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    let update = build_update_sql("users", &body, UPDATABLE_COLUMNS, "id", employee_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().body("Employee not found"));
    }

    Ok(HttpResponse::Ok().body("Employee updated successfully"))
}

/// Archive employee (Admin) — account keeps its history but cannot log in
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}/archive",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee archived"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn archive_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    let result = sqlx::query("UPDATE users SET deleted = TRUE WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Archive employee failed");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    // Kill open sessions so the archive takes effect immediately
    let _ = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee archived"
    })))
}

/// Restore archived employee (Admin)
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}/restore",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee restored"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn restore_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    let result = sqlx::query("UPDATE users SET deleted = FALSE WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Restore employee failed");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee restored"
    })))
}

/// Permanently delete employee (Admin)
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    let username = sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to fetch employee for delete");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let Some(username) = username else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    };

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to delete employee");
            ErrorInternalServerError("Internal Server Error")
        })?;

    account_filter::remove(&username);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
