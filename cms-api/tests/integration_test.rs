/// Integration tests for the CMS API
///
/// These tests drive the full router against a scratch data directory:
/// - Login and bearer-token protected routes
/// - User management guards (duplicates, roles, last admin)
/// - Blocks, forms, settings and sections
/// - Multipart uploads and static serving

mod common;

use axum::http::{Method, StatusCode};
use common::{TestContext, ADMIN_PASSWORD, ADMIN_USERNAME};
use serde_json::json;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

async fn create_editor(ctx: &TestContext, admin: &str) -> String {
    let response = ctx
        .json(
            Method::POST,
            "/api/users",
            Some(admin),
            Some(json!({
                "username": "editor",
                "email": "editor@site.com",
                "password": "editor-pass",
                "role": "editor"
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

    response.body["user"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_is_public() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "OK");
}

/// Fresh store, default credentials, protected route with and without token
#[tokio::test]
async fn test_bootstrap_login_and_protected_route() {
    let ctx = TestContext::new().await;

    let users = ctx.state.store.read(cms_shared::store::Collection::Users).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert_eq!(users[0]["role"], "admin");

    let token = ctx.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let me = ctx.get("/api/auth/me", Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["username"], "admin");
    assert!(me.body["user"].get("password").is_none());

    let anonymous = ctx.get("/api/auth/me", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert!(anonymous.body["error"].is_string());

    let forged = ctx.get("/api/auth/me", Some("not.a.token")).await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_records_last_login_and_accepts_email() {
    let ctx = TestContext::new().await;

    let response = ctx
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "admin@admin.com", "password": ADMIN_PASSWORD })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["user"]["lastLogin"].is_string());
    assert!(response.body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let ctx = TestContext::new().await;

    let response = ctx
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "admin", "password": "wrong" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_duplicate_username_conflicts_and_keeps_first() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin_token().await;
    let id = create_editor(&ctx, &admin).await;

    let duplicate = ctx
        .json(
            Method::POST,
            "/api/users",
            Some(&admin),
            Some(json!({
                "username": "editor",
                "email": "other@site.com",
                "password": "another-pass"
            })),
        )
        .await;

    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.body["code"], "conflict");

    let first = ctx.get(&format!("/api/users/{id}"), Some(&admin)).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["email"], "editor@site.com");

    let list = ctx.get("/api/users", Some(&admin)).await;
    assert_eq!(list.body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_editor_cannot_manage_users() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin_token().await;
    create_editor(&ctx, &admin).await;

    let editor = ctx.login("editor", "editor-pass").await;
    let response = ctx
        .json(
            Method::POST,
            "/api/users",
            Some(&editor),
            Some(json!({ "username": "x", "email": "x@site.com", "password": "x" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);

    // Reading is allowed
    let list = ctx.get("/api/users", Some(&editor)).await;
    assert_eq!(list.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_guards() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin_token().await;

    let self_delete = ctx.json(Method::DELETE, "/api/users/1", Some(&admin), None).await;
    assert_eq!(self_delete.status, StatusCode::BAD_REQUEST);

    let demote = ctx
        .json(Method::PUT, "/api/users/1", Some(&admin), Some(json!({ "role": "editor" })))
        .await;
    assert_eq!(demote.status, StatusCode::BAD_REQUEST);

    let suspend = ctx
        .json(
            Method::PATCH,
            "/api/users/1/status",
            Some(&admin),
            Some(json!({ "status": "suspended" })),
        )
        .await;
    assert_eq!(suspend.status, StatusCode::BAD_REQUEST);

    let missing = ctx.json(Method::DELETE, "/api/users/404", Some(&admin), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_suspended_user_cannot_log_in() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin_token().await;
    let id = create_editor(&ctx, &admin).await;

    let response = ctx
        .json(
            Method::PATCH,
            &format!("/api/users/{id}/status"),
            Some(&admin),
            Some(json!({ "status": "suspended" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["status"], "suspended");

    let login = ctx
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "editor", "password": "editor-pass" })),
        )
        .await;
    assert_eq!(login.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_blocks_lifecycle() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token().await;

    for id in ["hero", "features"] {
        let response = ctx
            .json(
                Method::POST,
                "/api/blocks",
                Some(&token),
                Some(json!({ "id": id, "type": id, "content": { "title": id } })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let duplicate = ctx
        .json(
            Method::POST,
            "/api/blocks",
            Some(&token),
            Some(json!({ "id": "hero", "type": "hero" })),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);

    let unauthenticated = ctx
        .json(Method::POST, "/api/blocks", None, Some(json!({ "id": "x", "type": "x" })))
        .await;
    assert_eq!(unauthenticated.status, StatusCode::UNAUTHORIZED);

    let reorder = ctx
        .json(
            Method::PUT,
            "/api/blocks/reorder",
            Some(&token),
            Some(json!({ "blockIds": ["features", "hero"] })),
        )
        .await;
    assert_eq!(reorder.status, StatusCode::OK);

    let list = ctx.get("/api/blocks", None).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body[0]["id"], "features");
    assert_eq!(list.body[0]["order"], 1);
    assert_eq!(list.body[1]["id"], "hero");

    let update = ctx
        .json(Method::PUT, "/api/blocks/hero", Some(&token), Some(json!({ "enabled": false })))
        .await;
    assert_eq!(update.status, StatusCode::OK);
    assert_eq!(update.body["block"]["enabled"], false);

    let delete = ctx.json(Method::DELETE, "/api/blocks/hero", Some(&token), None).await;
    assert_eq!(delete.status, StatusCode::OK);

    let gone = ctx.get("/api/blocks/hero", None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_form_submission_flow() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token().await;

    let created = ctx
        .json(
            Method::POST,
            "/api/forms",
            Some(&token),
            Some(json!({
                "name": "Contact",
                "fields": [
                    { "name": "email", "type": "email", "required": true },
                    { "name": "message", "type": "textarea" }
                ]
            })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["form"]["id"].as_str().unwrap().to_string();

    let missing = ctx
        .json(
            Method::POST,
            &format!("/api/forms/{id}/submit"),
            None,
            Some(json!({ "message": "hi" })),
        )
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let submitted = ctx
        .json(
            Method::POST,
            &format!("/api/forms/{id}/submit"),
            None,
            Some(json!({ "email": "visitor@site.com", "message": "hi" })),
        )
        .await;
    assert_eq!(submitted.status, StatusCode::CREATED);

    let form = ctx.get(&format!("/api/forms/{id}"), None).await;
    assert_eq!(form.body["submissions"], 1);

    let submissions = ctx.get(&format!("/api/forms/{id}/submissions"), Some(&token)).await;
    assert_eq!(submissions.status, StatusCode::OK);
    assert_eq!(submissions.body.as_array().unwrap().len(), 1);
    assert_eq!(submissions.body[0]["data"]["email"], "visitor@site.com");

    let unknown = ctx
        .json(Method::POST, "/api/forms/nope/submit", None, Some(json!({})))
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_settings_and_seo() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token().await;

    let defaults = ctx.get("/api/settings", None).await;
    assert_eq!(defaults.status, StatusCode::OK);
    assert_eq!(defaults.body["title"], "My Site");

    let anonymous = ctx
        .json(Method::PUT, "/api/settings", None, Some(json!({ "title": "New" })))
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let unknown_field = ctx
        .json(Method::PUT, "/api/settings", Some(&token), Some(json!({ "colour": "red" })))
        .await;
    assert_eq!(unknown_field.status, StatusCode::BAD_REQUEST);

    let updated = ctx
        .json(Method::PUT, "/api/settings", Some(&token), Some(json!({ "title": "New" })))
        .await;
    assert_eq!(updated.status, StatusCode::OK);

    let seo = ctx
        .json(
            Method::PUT,
            "/api/settings/seo",
            Some(&token),
            Some(json!({ "metaTitle": "Better Title" })),
        )
        .await;
    assert_eq!(seo.status, StatusCode::OK);

    let current = ctx.get("/api/settings", None).await;
    assert_eq!(current.body["title"], "New");
    assert_eq!(current.body["metaTitle"], "Better Title");
    assert!(current.body["updatedAt"].is_string());
}

#[tokio::test]
async fn test_content_sections() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token().await;

    let sections = ctx.get("/api/content/sections", None).await;
    assert_eq!(sections.status, StatusCode::OK);
    assert!(sections.body["hero"].is_object());

    let missing = ctx.get("/api/content/sections/about", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let updated = ctx
        .json(
            Method::PUT,
            "/api/content/sections/about",
            Some(&token),
            Some(json!({ "title": "About us" })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);

    let about = ctx.get("/api/content/sections/about", None).await;
    assert_eq!(about.body["title"], "About us");
}

#[tokio::test]
async fn test_image_upload_serve_and_delete() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token().await;

    let uploaded = ctx
        .upload("/api/images/upload", &token, "image", "photo.png", "image/png", PNG)
        .await;
    assert_eq!(uploaded.status, StatusCode::CREATED, "{}", uploaded.body);

    let image = &uploaded.body["image"];
    let id = image["id"].as_str().unwrap().to_string();
    let filename = image["filename"].as_str().unwrap().to_string();
    assert_eq!(image["category"], "general");
    assert_eq!(image["size"], PNG.len());

    let on_disk = ctx.dir.path().join("uploads/images").join(&filename);
    assert!(on_disk.exists());

    let served = ctx.get(image["path"].as_str().unwrap(), None).await;
    assert_eq!(served.status, StatusCode::OK);

    let list = ctx.get("/api/images", Some(&token)).await;
    assert_eq!(list.body.as_array().unwrap().len(), 1);

    let deleted = ctx
        .json(Method::DELETE, &format!("/api/images/{id}"), Some(&token), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(!on_disk.exists());
}

#[tokio::test]
async fn test_upload_rejections() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token().await;

    let wrong_type = ctx
        .upload("/api/images/upload", &token, "image", "doc.pdf", "application/pdf", b"%PDF")
        .await;
    assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);

    let wrong_field = ctx
        .upload("/api/images/upload", &token, "file", "photo.png", "image/png", PNG)
        .await;
    assert_eq!(wrong_field.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_field.body["error"], "No file uploaded");

    let anonymous = ctx
        .upload("/api/images/upload", "bad-token", "image", "photo.png", "image/png", PNG)
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logo_replace_and_remove() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token().await;

    let empty = ctx.get("/api/logo", None).await;
    assert_eq!(empty.body, json!({}));

    let first = ctx
        .upload("/api/logo/upload", &token, "logo", "logo.png", "image/png", PNG)
        .await;
    assert_eq!(first.status, StatusCode::OK, "{}", first.body);
    let first_file = first.body["logo"]["filename"].as_str().unwrap().to_string();

    let second = ctx
        .upload("/api/logo/upload", &token, "logo", "logo.svg", "image/svg+xml", b"<svg/>")
        .await;
    assert_eq!(second.status, StatusCode::OK);

    let logos = ctx.dir.path().join("uploads/logos");
    assert!(!logos.join(&first_file).exists());

    let current = ctx.get("/api/logo", None).await;
    assert_eq!(current.body["originalName"], "logo.svg");

    let removed = ctx.json(Method::DELETE, "/api/logo", Some(&token), None).await;
    assert_eq!(removed.status, StatusCode::OK);

    let again = ctx.json(Method::DELETE, "/api/logo", Some(&token), None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_and_backup() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token().await;

    let stats = ctx.get("/api/dashboard/stats", Some(&token)).await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(stats.body["users"], 1);
    assert_eq!(stats.body["totalUploads"], 0);

    let overview = ctx.get("/api/dashboard", Some(&token)).await;
    assert_eq!(overview.status, StatusCode::OK);
    assert!(overview.body["recentBlocks"].is_array());

    let backup = ctx.json(Method::POST, "/api/dashboard/backup", Some(&token), None).await;
    assert_eq!(backup.status, StatusCode::CREATED);

    let file = backup.body["file"].as_str().unwrap();
    assert!(ctx.dir.path().join("data/backups").join(file).exists());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let ctx = TestContext::new().await;

    for uri in ["/api/nope", "/elsewhere"] {
        let response = ctx.get(uri, None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body["error"], "Route not found");
    }
}

#[tokio::test]
async fn test_public_video_listing() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/api/videos", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn test_password_change_takes_effect_on_login() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin_token().await;
    let id = create_editor(&ctx, &admin).await;

    let update = ctx
        .json(
            Method::PUT,
            &format!("/api/users/{id}"),
            Some(&admin),
            Some(json!({ "password": "rotated-pass" })),
        )
        .await;
    assert_eq!(update.status, StatusCode::OK, "{}", update.body);

    let old = ctx
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "editor", "password": "editor-pass" })),
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);

    ctx.login("editor", "rotated-pass").await;
}

#[tokio::test]
async fn test_wrong_shape_users_file_is_unauthorized_not_server_error() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin_token().await;

    ctx.state
        .store
        .write(cms_shared::store::Collection::Users, &json!({ "unexpected": true }))
        .await;

    let me = ctx.get("/api/auth/me", Some(&admin)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    let login = ctx
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD })),
        )
        .await;
    assert_eq!(login.status, StatusCode::UNAUTHORIZED);
}
