use actix_web::{HttpResponse, Responder, web};
use sqlx::SqlitePool;
use tracing::{debug, error, info, instrument};

use crate::{
    auth::{
        jwt::generate_access_token,
        pin::{validate_pin, verify_pin},
    },
    config::Config,
    ledger::store,
    models::{LoginReqDto, LoginResponse},
};

/// PIN login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Access token issued", body = LoginResponse),
        (status = 400, description = "PIN missing or malformed", body = Object, example = json!({
            "message": "PIN must be at least 4 digits"
        })),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Too many login attempts")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(employee_id = user.employee_id)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    info!("Login request received");

    validate_pin(&user.pin)?;

    let employee = match store::find_employee(pool.get_ref(), user.employee_id).await? {
        Some(e) if e.is_active => e,
        Some(_) => {
            info!("Invalid credentials: employee inactive");
            return Ok(invalid_credentials());
        }
        None => {
            info!("Invalid credentials: employee not found");
            return Ok(invalid_credentials());
        }
    };

    if let Err(e) = verify_pin(&user.pin, &employee.pin_hash) {
        info!(error = %e, "Invalid credentials: PIN mismatch");
        return Ok(invalid_credentials());
    }

    debug!("PIN verified, generating access token");

    let access_token = generate_access_token(
        employee.id,
        employee.name.clone(),
        employee.role,
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, "Failed to sign access token");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    info!(role = %employee.role, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        employee_id: employee.id,
        role: employee.role,
    }))
}

fn invalid_credentials() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({
        "message": "Invalid credentials"
    }))
}
