mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{TestApp, USER_ID};

#[tokio::test]
async fn bookmarks_require_a_user() -> Result<()> {
    let app = TestApp::new()?;

    for method in [Method::GET, Method::POST, Method::DELETE] {
        let (status, body) = app
            .send(common::json(method.clone(), "/bookmarks", None, json!({ "manhwa_id": 1 })))
            .await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} /bookmarks", method);
        assert_eq!(body["error"], "User ID required");
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
    Ok(())
}

#[tokio::test]
async fn blank_user_header_counts_as_missing() -> Result<()> {
    let app = TestApp::new()?;
    let (status, _) = app
        .send(common::json(Method::POST, "/teams", Some("   "), json!({ "name": "Night Owls" })))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn bookmark_needs_a_title() -> Result<()> {
    let app = TestApp::new()?;

    let (status, body) = app
        .send(common::json(Method::POST, "/bookmarks", Some(USER_ID), json!({ "chapter_id": 4 })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "manhwa_id is required");

    let (status, body) = app
        .send(common::request(Method::DELETE, "/bookmarks", Some(USER_ID), Body::empty()))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "manhwa_id is required");
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_reported() -> Result<()> {
    let app = TestApp::new()?;
    let request = common::request(Method::POST, "/bookmarks", Some(USER_ID), Body::from("{\"manhwa_id\": "));

    let (status, body) = app.send(request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn comment_needs_a_user_before_anything_else() -> Result<()> {
    let app = TestApp::new()?;
    let (status, _) = app
        .send(common::json(Method::POST, "/comments", None, json!({ "text": "" })))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn comment_needs_title_and_text() -> Result<()> {
    let app = TestApp::new()?;

    let (status, body) = app
        .send(common::json(Method::POST, "/comments", Some(USER_ID), json!({ "manhwa_id": 1, "text": "   " })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "manhwa_id and text required");

    // The author may also arrive in the body when the header is absent.
    let (status, body) = app
        .send(common::json(Method::POST, "/comments", None, json!({ "user_id": USER_ID, "text": "first!" })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "manhwa_id and text required");
    Ok(())
}

#[tokio::test]
async fn comment_edit_and_delete_need_an_id() -> Result<()> {
    let app = TestApp::new()?;

    let (status, body) = app
        .send(common::json(Method::PUT, "/comments", Some(USER_ID), json!({ "text": "edited" })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "comment id required");

    let (status, body) = app
        .send(common::json(Method::PUT, "/comments?id=9", Some(USER_ID), json!({ "text": "" })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "text required");

    let (status, body) = app
        .send(common::request(Method::DELETE, "/comments", Some(USER_ID), Body::empty()))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "comment id required");
    Ok(())
}

#[tokio::test]
async fn team_needs_a_name() -> Result<()> {
    let app = TestApp::new()?;

    let (status, body) = app
        .send(common::json(Method::POST, "/teams", Some(USER_ID), json!({ "name": "  " })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Team name is required");

    let (status, body) = app
        .send(common::json(Method::PUT, "/teams", Some(USER_ID), json!({ "name": "Renamed" })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Team ID required");
    Ok(())
}

#[tokio::test]
async fn upload_needs_title_and_cover() -> Result<()> {
    let app = TestApp::new()?;

    let (status, body) = app
        .send(common::json(
            Method::POST,
            "/uploads",
            Some(USER_ID),
            json!({ "title": "Tower of Night", "cover_url": "" }),
        ))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title and cover_url are required");

    let (status, body) = app
        .send(common::json(Method::PUT, "/uploads", Some(USER_ID), json!({ "action": "moderate" })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Upload ID required");
    Ok(())
}
