// POST /signup - create an account and issue a token

use axum::{http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::database;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn signup_post(
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (username, email, password) = match (
        payload.username.filter(|v| !v.is_empty()),
        payload.email.filter(|v| !v.is_empty()),
        payload.password.filter(|v| !v.is_empty()),
    ) {
        (Some(u), Some(e), Some(p)) => (u, e, p),
        _ => return Err(ApiError::bad_request("All fields are required")),
    };

    let pool = database::pool().await?;

    if database::users::find_by_email(&pool, &email).await?.is_some() {
        return Err(ApiError::conflict("User already exists"));
    }

    let password_hash = auth::hash_password(&password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal_server_error("Internal server error")
    })?;

    let user_id = Uuid::new_v4();
    database::users::insert(&pool, user_id, &username, &email, &password_hash).await?;

    let token = auth::generate_jwt(Claims::new(user_id))?;

    tracing::info!("Created user {}", user_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": {
                "userId": user_id,
                "username": username,
                "email": email,
                "token": token,
            },
        })),
    ))
}
