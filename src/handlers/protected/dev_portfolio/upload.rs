// POST /uploadDevFiles - multipart upload of a dev portfolio project.
//
// Same transactional skeleton as the generic upload, with dev metadata
// (type/status/year, comma lists for tags and technologies) and normalized
// dev_images rows carrying the original filename and the host's public id.

use axum::{extract::Multipart, Extension, Json};
use chrono::{Datelike, Utc};
use serde_json::{json, Value};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::config;
use crate::database::{
    self,
    dev_portfolio::{self, NewDevImage, NewDevItem},
};
use crate::error::ApiError;
use crate::handlers::shared::{split_list, ImageJson};
use crate::media;
use crate::middleware::AuthUser;
use crate::uploads::{self, ReceivedForm};

pub async fn upload_post(
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = uploads::receive(multipart).await?;

    match run(&user, &form).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => {
            form.cleanup().await;
            Err(err)
        }
    }
}

async fn run(user: &AuthUser, form: &ReceivedForm) -> Result<Value, ApiError> {
    let (Some(title), Some(category), Some(item_type), Some(status), Some(year)) = (
        form.field("title"),
        form.field("category"),
        form.field("type"),
        form.field("status"),
        form.field("year"),
    ) else {
        return Err(ApiError::bad_request(
            "Title, category, type, status, and year are required",
        ));
    };

    let max_files = config::config().uploads.max_dev_files;
    if form.files.len() > max_files {
        return Err(ApiError::bad_request(format!(
            "You can upload a maximum of {} files",
            max_files
        )));
    }
    if form.files.is_empty() {
        return Err(ApiError::bad_request("At least one image is required"));
    }

    let year = validate_year(year)?;
    uploads::validate_file_types(&form.files)?;

    let pool = database::pool().await?;
    let mut tx = pool.begin().await?;

    match create_project(&mut tx, user, form, title, category, item_type, status, year).await {
        Ok(response) => {
            tx.commit().await?;
            Ok(response)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!("Rollback failed: {}", rollback_err);
            }
            Err(err)
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn create_project(
    tx: &mut Transaction<'_, Postgres>,
    user: &AuthUser,
    form: &ReceivedForm,
    title: &str,
    category: &str,
    item_type: &str,
    status: &str,
    year: i32,
) -> Result<Value, ApiError> {
    if dev_portfolio::find_id_by_title(tx, title).await?.is_some() {
        return Err(ApiError::conflict(
            "A development project with this title already exists",
        ));
    }

    let project_id = Uuid::new_v4();
    let tags = split_list(form.field("tags"));
    let technologies = split_list(form.field("technologies"));

    let item = NewDevItem {
        id: project_id,
        title,
        description: form.field("description"),
        category,
        item_type,
        url: form.field("url"),
        preview_url: form.field("previewUrl"),
        status,
        year,
        tags: tags.clone(),
        technologies: technologies.clone(),
        user_id: user.user_id,
    };
    dev_portfolio::insert_dev_item(tx, &item).await?;

    let mut uploaded_images = Vec::new();
    for (index, file) in form.files.iter().enumerate() {
        // Duplicate filenames are scoped to this project only
        if dev_portfolio::find_image_by_filename(tx, project_id, &file.original_name)
            .await?
            .is_some()
        {
            return Err(ApiError::conflict(format!(
                "An image with the name '{}' already exists for this project",
                file.original_name
            )));
        }

        let hosted = media::client()
            .upload(
                &file.path,
                &file.original_name,
                &format!("dev-portfolio/{}", project_id),
            )
            .await?;

        let alt_text = format!("{} - Screenshot {}", title, index + 1);
        dev_portfolio::insert_dev_image(
            tx,
            &NewDevImage {
                project_id,
                url: &hosted.url,
                original_filename: &file.original_name,
                alt_text: &alt_text,
                is_primary: index == 0,
                width: hosted.width,
                height: hosted.height,
                size: hosted.bytes,
                format: &hosted.format,
                public_id: &hosted.public_id,
            },
        )
        .await?;

        uploaded_images.push(ImageJson {
            url: hosted.url,
            alt_text,
            is_primary: index == 0,
            width: Some(hosted.width),
            height: Some(hosted.height),
        });

        uploads::discard(file.path.clone());
    }

    tracing::info!("Uploaded dev project {} for user {}", project_id, user.user_id);

    Ok(json!({
        "success": true,
        "message": "Development project uploaded successfully",
        "projectId": project_id,
        "data": {
            "id": project_id,
            "title": title,
            "description": form.field("description").unwrap_or_default(),
            "category": category,
            "type": item_type,
            "url": form.field("url").unwrap_or_default(),
            "previewUrl": form.field("previewUrl").unwrap_or_default(),
            "status": status,
            "year": year,
            "tags": tags,
            "technologies": technologies,
            "images": uploaded_images,
        },
    }))
}

/// Years are accepted within `[2000, current + 1]`; a non-numeric value gets
/// the same rejection as an out-of-range one.
fn validate_year(raw: &str) -> Result<i32, ApiError> {
    let max = Utc::now().year() + 1;
    let range_err = || ApiError::bad_request(format!("Year must be between 2000 and {}", max));

    let year: i32 = raw.trim().parse().map_err(|_| range_err())?;
    if !(2000..=max).contains(&year) {
        return Err(range_err());
    }
    Ok(year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_bounds() {
        let max = Utc::now().year() + 1;
        assert_eq!(validate_year("2000").unwrap(), 2000);
        assert_eq!(validate_year(&max.to_string()).unwrap(), max);
        assert!(validate_year("1999").is_err());
        assert!(validate_year(&(max + 1).to_string()).is_err());
        assert!(validate_year("twenty23").is_err());
    }
}
