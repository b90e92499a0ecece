// POST /uploadFiles - multipart upload of a generic portfolio item.
//
// State machine per request: receive -> validate -> open transaction ->
// duplicate-title check -> item row -> category/tag lookup rows -> per file:
// duplicate-filename check, host push, image row -> commit. Any failure after
// the transaction opened rolls back everything; no partial item survives.

use axum::{extract::Multipart, Extension, Json};
use serde_json::{json, Value};
use sqlx::{Postgres, Transaction};
use std::collections::HashSet;
use uuid::Uuid;

use crate::config;
use crate::database::{self, portfolio};
use crate::error::ApiError;
use crate::media;
use crate::middleware::AuthUser;
use crate::uploads::{self, ReceivedForm};

pub async fn upload_post(
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = uploads::receive(multipart).await?;

    match run(&user, &form).await {
        Ok(item_id) => Ok(Json(json!({
            "success": true,
            "message": "Portfolio item uploaded successfully",
            "itemId": item_id,
        }))),
        Err(err) => {
            form.cleanup().await;
            Err(err)
        }
    }
}

async fn run(user: &AuthUser, form: &ReceivedForm) -> Result<Uuid, ApiError> {
    // Validation happens in a fixed order, all before the transaction opens
    let title = form.field("title");
    let category = form.field("category");
    let (Some(title), Some(category)) = (title, category) else {
        return Err(ApiError::bad_request("Title and category are required"));
    };

    let max_files = config::config().uploads.max_files;
    if form.files.len() > max_files {
        return Err(ApiError::bad_request(format!(
            "You can upload a maximum of {} files",
            max_files
        )));
    }
    if form.files.is_empty() {
        return Err(ApiError::bad_request("At least one image is required"));
    }
    uploads::validate_file_types(&form.files)?;

    let pool = database::pool().await?;
    let mut tx = pool.begin().await?;

    match create_item(&mut tx, user, form, title, category).await {
        Ok(item_id) => {
            tx.commit().await?;
            tracing::info!("Uploaded portfolio item {} for user {}", item_id, user.user_id);
            Ok(item_id)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!("Rollback failed: {}", rollback_err);
            }
            Err(err)
        }
    }
}

async fn create_item(
    tx: &mut Transaction<'_, Postgres>,
    user: &AuthUser,
    form: &ReceivedForm,
    title: &str,
    category: &str,
) -> Result<Uuid, ApiError> {
    if portfolio::find_id_by_title(tx, title).await?.is_some() {
        return Err(ApiError::conflict(
            "A portfolio item with this title already exists",
        ));
    }

    let category_id = portfolio::get_or_create_category(tx, category).await?;

    let item_id = Uuid::new_v4();
    portfolio::insert_item(
        tx,
        item_id,
        title,
        form.field("description"),
        category_id,
        user.user_id,
    )
    .await?;

    for tag in crate::handlers::shared::split_list(form.field("tags")) {
        let tag_id = portfolio::get_or_create_tag(tx, &tag).await?;
        portfolio::link_tag(tx, item_id, tag_id).await?;
    }

    // Filenames are scoped to the in-progress item; the item row is brand
    // new, so a repeat within this request is the only possible duplicate.
    let mut seen_filenames = HashSet::new();
    for (index, file) in form.files.iter().enumerate() {
        if !seen_filenames.insert(file.original_name.clone()) {
            return Err(ApiError::conflict(format!(
                "An image with the name '{}' already exists",
                file.original_name
            )));
        }

        let hosted = media::client()
            .upload(
                &file.path,
                &file.original_name,
                &format!("portfolio/{}", item_id),
            )
            .await?;

        portfolio::insert_image(
            tx,
            item_id,
            &hosted.url,
            &format!("{} - Image {}", title, index + 1),
            index == 0, // first file is primary
            hosted.width,
            hosted.height,
            hosted.bytes,
            &hosted.format,
        )
        .await?;

        uploads::discard(file.path.clone());
    }

    Ok(item_id)
}
