// POST /login - verify credentials and issue a token

use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{self, Claims};
use crate::database;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn login_post(Json(payload): Json<LoginRequest>) -> Result<Json<Value>, ApiError> {
    let (email, password) = match (
        payload.email.filter(|v| !v.is_empty()),
        payload.password.filter(|v| !v.is_empty()),
    ) {
        (Some(e), Some(p)) => (e, p),
        _ => return Err(ApiError::bad_request("Email and password are required")),
    };

    let pool = database::pool().await?;

    // The identifier is matched against email and username alike; the
    // failure message never reveals which part was wrong.
    let user = database::users::find_by_email_or_username(&pool, &email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !auth::verify_password(&password, &user.password_hash) {
        tracing::warn!("Invalid password for user {}", user.user_id);
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = auth::generate_jwt(Claims::new(user.user_id))?;

    Ok(Json(json!({
        "message": "Login successful",
        "user": {
            "userId": user.user_id,
            "username": user.username,
            "email": user.email,
            "createdAt": user.created_at,
            "token": token,
        },
        "token": token,
    })))
}
