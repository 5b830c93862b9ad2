mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{admin_json, TestApp, ADMIN_KEY};

#[tokio::test]
async fn privileged_routes_require_the_admin_key() -> Result<()> {
    let app = TestApp::new()?;

    for uri in ["/admin", "/moderator"] {
        let (status, body) = app.send(admin_json(uri, None, json!({ "command": "help" }))).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} without key", uri);
        assert_eq!(body["error"], "Forbidden: Invalid admin key");

        let (status, _) = app.send(admin_json(uri, Some("guess"), json!({ "command": "help" }))).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} with wrong key", uri);
    }
    Ok(())
}

#[tokio::test]
async fn empty_configured_key_locks_everything() -> Result<()> {
    let app = TestApp::with_config(|config| config.security.admin_key = String::new())?;
    let (status, _) = app.send(admin_json("/moderator", Some(""), json!({}))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn admin_rejects_unknown_actions() -> Result<()> {
    let app = TestApp::new()?;

    let (status, body) = app.send(admin_json("/admin", Some(ADMIN_KEY), json!({ "action": "drop_all" }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid action");

    let (status, body) = app
        .send(admin_json("/admin", Some(ADMIN_KEY), json!({ "action": "add_manhwa", "title": " " })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "title is required");

    let (status, body) = app
        .send(admin_json("/admin", Some(ADMIN_KEY), json!({ "action": "add_chapter", "manhwa_id": 3 })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "manhwa_id and chapter_number are required");
    Ok(())
}

#[tokio::test]
async fn moderator_lists_commands() -> Result<()> {
    let app = TestApp::new()?;

    for request in [json!({}), json!({ "command": "help" })] {
        let (status, body) = app.send(admin_json("/moderator", Some(ADMIN_KEY), request)).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bot"], "Moderator Bot v1.0");
        assert!(body["commands"]["add_chapter"].is_object());
        assert!(body["commands"]["approve_submission"].is_object());
    }
    Ok(())
}

#[tokio::test]
async fn moderator_rejects_unknown_commands() -> Result<()> {
    let app = TestApp::new()?;
    let (status, body) = app
        .send(admin_json("/moderator", Some(ADMIN_KEY), json!({ "command": "ban_everyone" })))
        .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], r#"Unknown command: ban_everyone. Use "help" for list of commands"#);
    Ok(())
}

#[tokio::test]
async fn remote_import_is_not_implemented() -> Result<()> {
    let app = TestApp::new()?;

    for command in ["parse_chapters", "sync_chapters"] {
        let (status, body) = app
            .send(admin_json("/moderator", Some(ADMIN_KEY), json!({ "command": command, "manhwa_id": 1 })))
            .await?;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Feature in development");
    }
    Ok(())
}

#[tokio::test]
async fn moderator_validates_parameters_before_touching_the_database() -> Result<()> {
    let app = TestApp::new()?;

    let cases = [
        (json!({ "command": "add_chapter", "manhwa_id": 1 }), "manhwa_id and chapter_number required"),
        (json!({ "command": "update_cover", "manhwa_id": 1, "cover_url": " " }), "manhwa_id and cover_url required"),
        (json!({ "command": "update_manhwa", "manhwa_id": 1, "rank": 9 }), "No fields to update"),
        (json!({ "command": "approve_submission" }), "submission_id required"),
        (json!({ "command": "reject_translator" }), "request_id required"),
    ];

    for (request, expected) in cases {
        let (status, body) = app.send(admin_json("/moderator", Some(ADMIN_KEY), request)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", expected);
        assert_eq!(body["error"], expected);
    }

    let (status, body) = app
        .send(admin_json("/moderator", Some(ADMIN_KEY), json!({ "command": "add_chapter", "manhwa_id": "one" })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().starts_with("Invalid command parameters"));
    Ok(())
}
