use crate::{
    auth::{
        auth::AuthUser,
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    model::{role::Role, user::UserResponse},
    models::{LoginReq, RegisterReq, TokenType},
    store,
    utils::{email_cache, email_filter},
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

#[derive(Serialize)]
struct AuthResponse {
    user: UserResponse,
    access_token: String,
    refresh_token: String,
}

/// true  => email AVAILABLE
/// false => email TAKEN
pub async fn is_email_available(email: &str, pool: &MySqlPool) -> bool {
    let email = email.trim().to_lowercase();

    // Cuckoo filter: fast negative. If the filter has never seen the email,
    // it cannot be registered.
    if !email_filter::might_exist(&email) {
        return true;
    }

    // Moka cache: fast positive.
    if email_cache::is_taken(&email).await {
        return false;
    }

    // Database fallback; on lookup failure report taken (fail-safe).
    let exists = store::user::email_exists(pool, &email).await.unwrap_or(true);

    !exists
}

async fn store_refresh_token(
    pool: &MySqlPool,
    user_id: u64,
    jti: &str,
    exp: usize,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO refresh_tokens (user_id, jti, expires_at) VALUES (?, ?, FROM_UNIXTIME(?))")
        .bind(user_id)
        .bind(jti)
        .bind(exp as i64)
        .execute(pool)
        .await?;
    Ok(())
}

/// User registration handler
pub async fn register(
    payload: web::Json<RegisterReq>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let name = payload.name.trim();
    let email = payload.email.trim().to_lowercase();
    let employee_code = payload.employee_code.trim().to_uppercase();

    if name.is_empty() || email.is_empty() || payload.password.is_empty() || employee_code.is_empty()
    {
        return HttpResponse::BadRequest().json(json!({
            "message": "Please fill all required fields"
        }));
    }

    let role = match payload.role.as_deref() {
        Some(r) => match Role::from_name(r) {
            Some(role) => role,
            None => {
                return HttpResponse::BadRequest().json(json!({
                    "message": "Role must be employee or manager"
                }));
            }
        },
        None => Role::Employee,
    };

    if !is_email_available(&email, pool.get_ref()).await {
        return HttpResponse::Conflict().json(json!({
            "message": "Email already registered"
        }));
    }

    match store::user::find_by_employee_code(pool.get_ref(), &employee_code).await {
        Ok(Some(_)) => {
            return HttpResponse::Conflict().json(json!({
                "message": "Employee ID already used"
            }));
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "Failed to check employee code");
            return HttpResponse::InternalServerError().json(json!({
                "message": "Server error during registration"
            }));
        }
    }

    let hashed = hash_password(&payload.password);
    let new_user = store::user::NewUser {
        employee_code: &employee_code,
        name,
        email: &email,
        password_hash: &hashed,
        role_id: role.as_id(),
        department: payload.department.as_deref(),
    };

    let user_id = match store::user::insert(pool.get_ref(), &new_user).await {
        Ok(id) => id,
        Err(e) => {
            if crate::store::is_duplicate_key(&e) {
                // Lost the uniqueness race between the checks and the insert.
                return HttpResponse::Conflict().json(json!({
                    "message": "Email or employee ID already registered"
                }));
            }
            error!(error = %e, "Failed to register user");
            return HttpResponse::InternalServerError().json(json!({
                "message": "Server error during registration"
            }));
        }
    };

    // Keep the fast-path structures in sync with the insert.
    email_filter::insert(&email);
    email_cache::mark_taken(&email).await;

    let access_token = generate_access_token(
        user_id,
        email.clone(),
        role.as_id(),
        &config.jwt_secret,
        config.access_token_ttl,
    );
    let (refresh_token, refresh_claims) = generate_refresh_token(
        user_id,
        email.clone(),
        role.as_id(),
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    if let Err(e) =
        store_refresh_token(pool.get_ref(), user_id, &refresh_claims.jti, refresh_claims.exp).await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    info!(user_id, "User registered");

    HttpResponse::Created().json(AuthResponse {
        user: UserResponse {
            id: user_id,
            employee_code,
            name: name.to_owned(),
            email,
            role: role.as_str().to_owned(),
            department: payload.department.clone(),
        },
        access_token,
        refresh_token,
    })
}

#[instrument(
    name = "auth_login",
    skip(payload, pool, config),
    fields(email = %payload.email)
)]
pub async fn login(
    payload: web::Json<LoginReq>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if payload.email.trim().is_empty() || payload.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().body("Email or password required");
    }

    debug!("Fetching user from database");

    let db_user = match store::user::find_by_email(pool.get_ref(), &payload.email.to_lowercase())
        .await
    {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().body("Invalid email or password");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    debug!("Verifying password");

    if let Err(e) = verify_password(&payload.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid email or password");
    }

    let access_token = generate_access_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    let (refresh_token, refresh_claims) = generate_refresh_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    debug!(user_id = db_user.id, jti = %refresh_claims.jti, "Storing refresh token");

    if let Err(e) = store_refresh_token(
        pool.get_ref(),
        db_user.id,
        &refresh_claims.jti,
        refresh_claims.exp,
    )
    .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    // Non-fatal: login still succeeds if this bookkeeping write fails.
    if let Err(e) = store::user::touch_last_login(pool.get_ref(), db_user.id).await {
        error!(error = %e, "Failed to update last_login_at");
    }

    info!("Login successful");

    HttpResponse::Ok().json(AuthResponse {
        user: UserResponse::from(&db_user),
        access_token,
        refresh_token,
    })
}

/// Current user's profile.
pub async fn me(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let user = store::user::find_by_id(pool.get_ref(), auth.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to fetch profile");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match user {
        Some(user) => Ok(HttpResponse::Ok().json(UserResponse::from(&user))),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "User not found"
        }))),
    }
}

pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("Invalid token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().finish();
    }

    let record = match sqlx::query_as::<_, (u64, u64, i8)>(
        "SELECT id, user_id, revoked FROM refresh_tokens WHERE jti = ?",
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "Failed to look up refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let (record_id, user_id) = match record {
        Some((id, user_id, revoked)) if revoked == 0 => (id, user_id),
        _ => return HttpResponse::Unauthorized().finish(),
    };

    // Rotate: revoke the presented refresh token before issuing a new one.
    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(record_id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to revoke refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let (new_refresh_token, new_claims) = generate_refresh_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    if let Err(e) =
        store_refresh_token(pool.get_ref(), user_id, &new_claims.jti, new_claims.exp).await
    {
        error!(error = %e, "Failed to store rotated refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let access_token = generate_access_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    HttpResponse::Ok().json(json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token
    }))
}

pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::NoContent().finish(),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    // Only refresh tokens can log out.
    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    // Revoke (idempotent; success even if the token was never stored).
    let _ = sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE jti = ?")
        .bind(&claims.jti)
        .execute(pool.get_ref())
        .await;

    HttpResponse::NoContent().finish()
}
