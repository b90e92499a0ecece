// POST /loggedIn - "who am I" probe; same verification as the token gate
// but returns the resolved user instead of continuing a pipeline.

use axum::{http::HeaderMap, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::auth::resolve_bearer;

pub async fn logged_in_post(headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    let user = resolve_bearer(&headers).await?;

    Ok(Json(json!({
        "message": "User is logged in",
        "user": {
            "userId": user.user_id,
            "username": user.username,
            "email": user.email,
        },
    })))
}
