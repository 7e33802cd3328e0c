mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use tenant_notes::database::Store;
use tenant_notes::types::SubscriptionPlan;

#[tokio::test]
async fn admin_upgrades_own_tenant() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login("admin@acme.test").await?;

    let res = app.post("/tenants/acme/upgrade", &token, json!({})).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["message"], "Tenant successfully upgraded to Pro plan");
    assert_eq!(res.data()["subscription_plan"], "pro");

    let tenant = app.store.find_tenant_by_slug("acme").await?.unwrap();
    assert_eq!(tenant.subscription_plan, SubscriptionPlan::Pro);
    Ok(())
}

#[tokio::test]
async fn upgrade_is_idempotent() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login("admin@acme.test").await?;

    for _ in 0..2 {
        let res = app.post("/tenants/acme/upgrade", &token, json!({})).await?;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.data()["subscription_plan"], "pro");
    }
    Ok(())
}

#[tokio::test]
async fn member_cannot_upgrade() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login("user@acme.test").await?;

    let res = app.post("/tenants/acme/upgrade", &token, json!({})).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.code(), Some("FORBIDDEN"));

    let tenant = app.store.find_tenant_by_slug("acme").await?.unwrap();
    assert_eq!(tenant.subscription_plan, SubscriptionPlan::Free);
    Ok(())
}

#[tokio::test]
async fn cross_tenant_upgrade_is_forbidden() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login("admin@acme.test").await?;

    let res = app.post("/tenants/globex/upgrade", &token, json!({})).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.error(), Some("Cannot upgrade a different tenant"));

    let globex = app.store.find_tenant_by_slug("globex").await?.unwrap();
    assert_eq!(globex.subscription_plan, SubscriptionPlan::Free);
    Ok(())
}

#[tokio::test]
async fn unknown_slug_is_not_found() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login("admin@acme.test").await?;

    let res = app.post("/tenants/initech/upgrade", &token, json!({})).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error(), Some("Tenant not found"));
    Ok(())
}

#[tokio::test]
async fn current_tenant_reports_usage() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login("user@globex.test").await?;
    app.create_note(&token, "one").await?;

    let res = app.get("/tenants/me", &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["slug"], "globex");
    assert_eq!(res.data()["name"], "Globex Corporation");
    assert_eq!(res.data()["subscription_plan"], "free");
    assert_eq!(res.data()["note_count"], 1);
    assert_eq!(res.data()["note_limit"], 3);

    let admin = app.login("admin@globex.test").await?;
    app.post("/tenants/globex/upgrade", &admin, json!({})).await?;
    let res = app.get("/tenants/me", &token).await?;
    assert!(res.data()["note_limit"].is_null());
    Ok(())
}
