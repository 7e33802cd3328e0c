mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn note_crud_round_trip() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login("user@acme.test").await?;

    let res = app.create_note(&token, "First").await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let id = res.data()["id"].as_i64().unwrap();
    assert_eq!(res.data()["tenant_id"], app.tenant_id("acme").await?);

    let res = app.get(&format!("/notes/{}", id), &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["title"], "First");
    assert_eq!(res.data()["content"], "body");

    // Partial update leaves content alone
    let res = app.put(&format!("/notes/{}", id), &token, json!({ "title": "Renamed" })).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["title"], "Renamed");
    assert_eq!(res.data()["content"], "body");

    let res = app.delete(&format!("/notes/{}", id), &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["message"], "Note deleted successfully");

    let res = app.get(&format!("/notes/{}", id), &token).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error(), Some("Note not found"));
    Ok(())
}

#[tokio::test]
async fn notes_of_other_tenants_are_not_found() -> Result<()> {
    let app = TestApp::spawn().await?;
    let acme_admin = app.login("admin@acme.test").await?;
    let globex_user = app.login("user@globex.test").await?;

    let res = app.create_note(&acme_admin, "Acme secret").await?;
    let path = format!("/notes/{}", res.data()["id"]);

    let res = app.get(&path, &globex_user).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.put(&path, &globex_user, json!({ "title": "pwned" })).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.delete(&path, &globex_user).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.get("/notes", &globex_user).await?;
    assert_eq!(res.data().as_array().unwrap().len(), 0);

    // Still intact for its owner
    let res = app.get(&path, &acme_admin).await?;
    assert_eq!(res.data()["title"], "Acme secret");
    Ok(())
}

#[tokio::test]
async fn members_share_notes_within_tenant() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.login("admin@acme.test").await?;
    let member = app.login("user@acme.test").await?;

    let res = app.create_note(&admin, "Team note").await?;
    let path = format!("/notes/{}", res.data()["id"]);

    let res = app.put(&path, &member, json!({ "content": "edited by member" })).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["content"], "edited by member");
    Ok(())
}

#[tokio::test]
async fn list_is_paginated() -> Result<()> {
    let mut config = common::test_config();
    config.quota.free_note_limit = 10;
    let app = TestApp::spawn_with(config).await?;
    let token = app.login("admin@acme.test").await?;

    for i in 0..5 {
        app.create_note(&token, &format!("note {}", i)).await?;
    }

    let res = app.get("/notes", &token).await?;
    assert_eq!(res.data().as_array().unwrap().len(), 5);

    let res = app.get("/notes?skip=1&limit=2", &token).await?;
    let titles: Vec<_> = res.data().as_array().unwrap().iter().map(|n| n["title"].clone()).collect();
    assert_eq!(titles, vec![json!("note 1"), json!("note 2")]);

    // Out-of-range values are clamped, not rejected
    let res = app.get("/notes?skip=-4&limit=0", &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data().as_array().unwrap().len(), 5);
    Ok(())
}

#[tokio::test]
async fn invalid_input_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login("admin@acme.test").await?;

    let res = app.post("/notes", &token, json!({ "title": "   " })).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.code(), Some("VALIDATION_ERROR"));

    let res = app.post("/notes", &token, json!({ "content": "no title" })).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.code(), Some("INVALID_JSON"));

    let res = app.get("/notes/abc", &token).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.request(Method::GET, "/notes/1", Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn bad_input_without_token_is_unauthenticated() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.request(Method::GET, "/notes/abc", None, None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.request(Method::POST, "/notes", None, Some(json!({ "content": "no title" }))).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.request(Method::PUT, "/notes/abc", Some("not.a.token"), Some(json!({}))).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}
