mod common;

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;

fn png_part(name: &str) -> Result<Part> {
    Ok(Part::bytes(b"not-a-real-png".to_vec())
        .file_name(name.to_string())
        .mime_str("image/png")?)
}

/// Snapshot of the server's upload spool directory. Missing dir counts as
/// empty since it is only created on first intake.
fn spooled_files() -> HashSet<String> {
    std::fs::read_dir("uploads/tmp")
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

/// Wait until no files beyond `before` remain spooled. Concurrent tests may
/// spool transiently, so this polls instead of asserting a single snapshot.
async fn assert_no_new_spooled(before: &HashSet<String>) {
    for _ in 0..20 {
        if spooled_files().difference(before).count() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    let leaked: Vec<_> = spooled_files().difference(before).cloned().collect();
    panic!("spooled files were not cleaned up: {:?}", leaked);
}

#[tokio::test]
async fn generic_upload_rejects_bad_requests() -> Result<()> {
    if !common::enabled() {
        eprintln!("skipping: INKCASE_TEST_SERVER not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::signup_token(server, "uploader").await?;
    let url = format!("{}/uploadFiles", server.base_url);
    let auth = format!("Bearer {}", token);

    // Missing title: rejected before anything touches the database
    let form = Form::new()
        .text("category", "Branding")
        .part("files", png_part("a.png")?);
    let res = client
        .post(&url)
        .header("Authorization", &auth)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Metadata present but no files
    let form = Form::new()
        .text("title", common::unique_handle("nofiles"))
        .text("category", "Branding");
    let res = client
        .post(&url)
        .header("Authorization", &auth)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Disallowed content type
    let pdf = Part::bytes(b"%PDF-1.4".to_vec())
        .file_name("doc.pdf")
        .mime_str("application/pdf")?;
    let form = Form::new()
        .text("title", common::unique_handle("badtype"))
        .text("category", "Branding")
        .part("files", pdf);
    let res = client
        .post(&url)
        .header("Authorization", &auth)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["error"].as_str().unwrap_or("").contains("application/pdf"));

    // One file over the limit
    let mut form = Form::new()
        .text("title", common::unique_handle("toomany"))
        .text("category", "Branding");
    for i in 0..11 {
        form = form.part("files", png_part(&format!("f{}.png", i))?);
    }
    let res = client
        .post(&url)
        .header("Authorization", &auth)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["error"].as_str().unwrap_or("").contains("maximum"));

    Ok(())
}

#[tokio::test]
async fn dev_upload_rejects_bad_requests() -> Result<()> {
    if !common::enabled() {
        eprintln!("skipping: INKCASE_TEST_SERVER not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::signup_token(server, "devup").await?;
    let url = format!("{}/uploadDevFiles", server.base_url);
    let auth = format!("Bearer {}", token);

    let metadata = |title: String| -> Form {
        Form::new()
            .text("title", title)
            .text("category", "Web")
            .text("type", "Web App")
            .text("status", "active")
            .text("year", "2024")
    };

    // Missing year
    let form = Form::new()
        .text("title", common::unique_handle("noyear"))
        .text("category", "Web")
        .text("type", "Web App")
        .text("status", "active")
        .part("files", png_part("a.png")?);
    let res = client
        .post(&url)
        .header("Authorization", &auth)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Year out of bounds
    let form = metadata(common::unique_handle("oldyear"))
        .text("year", "1990")
        .part("files", png_part("a.png")?);
    let res = client
        .post(&url)
        .header("Authorization", &auth)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["error"].as_str().unwrap_or("").contains("Year"));

    // One file over the dev limit
    let mut form = metadata(common::unique_handle("toomany"));
    for i in 0..21 {
        form = form.part("files", png_part(&format!("f{}.png", i))?);
    }
    let res = client
        .post(&url)
        .header("Authorization", &auth)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn upload_failures_leave_no_partial_state() -> Result<()> {
    if !common::enabled() {
        eprintln!("skipping: INKCASE_TEST_SERVER not set");
        return Ok(());
    }
    if std::env::var("MEDIA_CLOUD_NAME").is_ok() {
        // With a real media host configured the push would succeed
        eprintln!("skipping: MEDIA_CLOUD_NAME is set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::signup_token(server, "atomic").await?;
    let before = spooled_files();

    // A stream that breaks after the first file part was already spooled:
    // the request is rejected and the spooled file swept.
    let boundary = "inkcase-test-boundary";
    let mut body = String::new();
    body.push_str(&format!("--{}\r\n", boundary));
    body.push_str("Content-Disposition: form-data; name=\"files\"; filename=\"a.png\"\r\n");
    body.push_str("Content-Type: image/png\r\n\r\n");
    body.push_str("fake-png-bytes\r\n");
    body.push_str(&format!("--{}\r\n", boundary));
    body.push_str("Content-Disposition: form-data; name=\"title\"\r\n\r\n");
    body.push_str("truncated before the closing boundary");

    let res = client
        .post(format!("{}/uploadFiles", server.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(body)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_no_new_spooled(&before).await;

    // A well-formed upload whose host push fails mid-workflow: the whole
    // transaction rolls back, so the caller still owns nothing.
    let form = Form::new()
        .text("title", common::unique_handle("rolledback"))
        .text("category", "Branding")
        .part("files", png_part("a.png")?);
    let res = client
        .post(format!("{}/uploadFiles", server.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let res = client
        .get(format!("{}/countMyPortfolioItems", server.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["total"].as_i64(), Some(0));

    let res = client
        .get(format!("{}/getMyPortfolioItems", server.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["items"].as_array().map(Vec::len), Some(0));

    assert_no_new_spooled(&before).await;

    Ok(())
}

/// Full happy-path plus duplicate-title conflict. Needs real media host
/// credentials, so it sits behind its own opt-in on top of the server gate.
#[tokio::test]
async fn duplicate_title_conflicts_without_side_effects() -> Result<()> {
    if !common::enabled() || std::env::var("INKCASE_TEST_MEDIA").is_err() {
        eprintln!("skipping: INKCASE_TEST_SERVER/INKCASE_TEST_MEDIA not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::signup_token(server, "dup").await?;
    let auth = format!("Bearer {}", token);
    let title = common::unique_handle("dup-title");

    let upload = |title: String| {
        let client = client.clone();
        let url = format!("{}/uploadFiles", server.base_url);
        let auth = auth.clone();
        async move {
            let form = Form::new()
                .text("title", title)
                .text("category", "Branding")
                .part("files", png_part("a.png")?);
            Ok::<_, anyhow::Error>(
                client
                    .post(&url)
                    .header("Authorization", &auth)
                    .multipart(form)
                    .send()
                    .await?,
            )
        }
    };

    let res = upload(title.clone()).await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Same title again: rejected, and the count proves nothing was written
    let res = upload(title).await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .get(format!("{}/countMyPortfolioItems", server.base_url))
        .header("Authorization", &auth)
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["total"].as_i64(), Some(1));

    Ok(())
}
