mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn pagination_metadata_is_consistent() -> Result<()> {
    if !common::enabled() {
        eprintln!("skipping: INKCASE_TEST_SERVER not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Public catalog: whatever the data, the invariants must hold
    let res = client
        .get(format!("{}/dev-portfolio?page=1&limit=2", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;

    let items = body["items"].as_array().expect("items");
    let p = &body["pagination"];
    let total = p["totalItems"].as_i64().expect("totalItems");
    let per_page = p["itemsPerPage"].as_i64().expect("itemsPerPage");
    let pages = p["totalPages"].as_i64().expect("totalPages");

    assert_eq!(per_page, 2);
    assert_eq!(p["currentPage"].as_i64(), Some(1));
    assert!(items.len() as i64 <= per_page);
    assert_eq!(pages, (total + per_page - 1) / per_page);

    Ok(())
}

#[tokio::test]
async fn absent_filter_value_yields_zero_items() -> Result<()> {
    if !common::enabled() {
        eprintln!("skipping: INKCASE_TEST_SERVER not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::signup_token(server, "lister").await?;

    // A category value that never occurs in the data
    let res = client
        .get(format!(
            "{}/getDevPortfolioItems?category=no-such-category-ever",
            server.base_url
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["pagination"]["totalItems"].as_i64(), Some(0));
    assert_eq!(body["pagination"]["totalPages"].as_i64(), Some(0));

    Ok(())
}

#[tokio::test]
async fn fresh_user_owns_nothing() -> Result<()> {
    if !common::enabled() {
        eprintln!("skipping: INKCASE_TEST_SERVER not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::signup_token(server, "lister").await?;

    let res = client
        .get(format!("{}/getMyPortfolioItems", server.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["pagination"]["itemsPerPage"].as_i64(), Some(8));

    let res = client
        .get(format!("{}/countMyPortfolioItems", server.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["total"].as_i64(), Some(0));

    Ok(())
}

#[tokio::test]
async fn unknown_catalog_item_is_404() -> Result<()> {
    if !common::enabled() {
        eprintln!("skipping: INKCASE_TEST_SERVER not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/dev-portfolio/00000000-0000-0000-0000-000000000000",
            server.base_url
        ))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Non-UUID ids are equally absent
    let res = client
        .get(format!("{}/dev-portfolio/not-an-id", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn delete_requires_ownership() -> Result<()> {
    if !common::enabled() {
        eprintln!("skipping: INKCASE_TEST_SERVER not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::signup_token(server, "lister").await?;

    // Nothing owned yet, so any id resolves to 404 for this caller
    let res = client
        .post(format!("{}/deleteItem", server.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "itemId": "00000000-0000-0000-0000-000000000000" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(format!("{}/deleteItem", server.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}
