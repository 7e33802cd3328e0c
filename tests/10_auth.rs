mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, Method, StatusCode};
use chrono::{Duration, Utc};
use common::TestApp;
use tenant_notes::auth::{FixedClock, TokenService, TokenSubject};
use tenant_notes::database::models::NewUser;
use tenant_notes::database::Store;
use tenant_notes::types::Role;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = TestApp::spawn().await?;
    let res = app.request(Method::GET, "/health", None, None).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.data()["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn login_issues_token_with_user_claims() -> Result<()> {
    let app = TestApp::spawn().await?;
    let res = app.try_login("admin@acme.test", common::PASSWORD, None).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["token_type"], "bearer");
    assert_eq!(res.data()["expires_in"], 30 * 60);

    let token = res.data()["access_token"].as_str().unwrap();
    let claims = app.tokens().validate(token)?;
    assert_eq!(claims.sub, "admin@acme.test");
    assert_eq!(claims.tenant_id, app.tenant_id("acme").await?);
    assert_eq!(claims.role, Role::Admin);

    let member = app.tokens().validate(&app.login("user@globex.test").await?)?;
    assert_eq!(member.tenant_id, app.tenant_id("globex").await?);
    assert_eq!(member.role, Role::Member);
    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() -> Result<()> {
    let app = TestApp::spawn().await?;
    let wrong_password = app.try_login("admin@acme.test", "nope", None).await?;
    let unknown_email = app.try_login("ghost@acme.test", common::PASSWORD, None).await?;

    for res in [&wrong_password, &unknown_email] {
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.error(), Some("Invalid email or password"));
        assert_eq!(res.headers[header::WWW_AUTHENTICATE], "Bearer");
    }
    assert_eq!(wrong_password.body, unknown_email.body);
    Ok(())
}

#[tokio::test]
async fn login_can_be_qualified_by_tenant() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.try_login("admin@acme.test", common::PASSWORD, Some("acme")).await?;
    assert_eq!(res.status, StatusCode::OK);

    // Right credentials, wrong tenant
    let res = app.try_login("admin@acme.test", common::PASSWORD, Some("globex")).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.try_login("admin@acme.test", common::PASSWORD, Some("initech")).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn shared_email_resolves_by_password_then_tenant_order() -> Result<()> {
    let app = TestApp::spawn().await?;
    let passwords = tenant_notes::auth::PasswordService::with_cost(8, 1, 1)?;
    let acme = app.tenant_id("acme").await?;
    let globex = app.tenant_id("globex").await?;

    for (tenant_id, password) in [(acme, "acme-pass"), (globex, "globex-pass")] {
        app.store
            .create_user(NewUser {
                tenant_id,
                email: "shared@example.test".to_string(),
                password_hash: passwords.hash(password)?,
                role: Role::Member,
            })
            .await?;
    }

    let res = app.try_login("shared@example.test", "globex-pass", None).await?;
    let claims = app.tokens().validate(res.data()["access_token"].as_str().unwrap())?;
    assert_eq!(claims.tenant_id, globex);

    let res = app.try_login("shared@example.test", "acme-pass", None).await?;
    let claims = app.tokens().validate(res.data()["access_token"].as_str().unwrap())?;
    assert_eq!(claims.tenant_id, acme);
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.request(Method::GET, "/notes", None, None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.error(), Some("Could not validate credentials"));
    assert_eq!(res.headers[header::WWW_AUTHENTICATE], "Bearer");

    let res = app.get("/notes", "not.a.token").await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let other = TokenService::new("some-other-secret", "HS256", Duration::minutes(30))?;
    let forged = other.issue(
        &TokenSubject {
            email: "admin@acme.test".to_string(),
            user_id: 1,
            tenant_id: app.tenant_id("acme").await?,
            role: Role::Admin,
        },
        None,
    )?;
    let res = app.get("/notes", &forged).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn expired_token_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;
    let acme = app.tenant_id("acme").await?;
    let admin = app.store.find_user_by_email("admin@acme.test", acme).await?.unwrap();

    let an_hour_ago = Utc::now() - Duration::hours(1);
    let stale = app.tokens().with_clock(Arc::new(FixedClock(an_hour_ago)));
    let token = stale.issue(
        &TokenSubject {
            email: admin.email.clone(),
            user_id: admin.id,
            tenant_id: admin.tenant_id,
            role: admin.role,
        },
        None,
    )?;

    let res = app.get("/notes", &token).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_for_deleted_user_stops_working() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.login("admin@acme.test").await?;
    let member = app.login("user@acme.test").await?;

    let me = app.get("/users/me", &member).await?;
    let member_id = me.data()["id"].as_i64().unwrap();

    let res = app.delete(&format!("/users/{}", member_id), &admin).await?;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.get("/users/me", &member).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}
