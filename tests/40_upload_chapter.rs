mod common;

use std::io::{Cursor, Write};

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use common::{close_to, multipart, solid_png, zip_of, Part, TestApp};
use manhwa_api::stitch::decode_data_url;

const RED: [u8; 3] = [220, 30, 30];
const GREEN: [u8; 3] = [30, 200, 60];
const BLUE: [u8; 3] = [30, 40, 210];

fn upload_form<'a>(archive: &'a [u8], manhwa_id: &'a str, chapter_number: &'a str) -> Vec<Part<'a>> {
    vec![
        Part::Text("manhwa_id", manhwa_id),
        Part::Text("chapter_number", chapter_number),
        Part::File("archive", "chapter.zip", archive),
    ]
}

#[tokio::test]
async fn stitches_two_pages_into_one_chapter() -> Result<()> {
    let app = TestApp::new()?;
    let archive = zip_of(&[("001.png", solid_png(100, 50, RED)), ("002.png", solid_png(100, 80, BLUE))]);

    let (status, body) = app.send(multipart("/upload-chapter", &upload_form(&archive, "1", "5"))).await?;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["images_processed"], 2);

    let chapters = app.chapters.chapters();
    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0].manhwa_id, 1);
    assert_eq!(chapters[0].chapter_number, 5);
    assert_eq!(chapters[0].title, "");
    assert_eq!(body["chapter_id"], chapters[0].id);

    let pages = app.chapters.pages();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].chapter_id, chapters[0].id);
    assert_eq!(pages[0].page_number, 1);
    assert!(pages[0].image_url.starts_with("data:image/jpeg;base64,"));

    let jpeg = decode_data_url(&pages[0].image_url).expect("jpeg data url");
    let composite = image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg)?.into_rgb8();
    assert_eq!(composite.dimensions(), (100, 130));
    // Sample away from the seam at row 50, which falls inside a JPEG block.
    for y in [4, 20, 40] {
        assert!(close_to(composite.get_pixel(50, y), RED), "row {} should be from the first page", y);
    }
    for y in [70, 100, 125] {
        assert!(close_to(composite.get_pixel(50, y), BLUE), "row {} should be from the second page", y);
    }
    Ok(())
}

#[tokio::test]
async fn pages_stack_in_filename_order() -> Result<()> {
    let app = TestApp::new()?;
    let archive = zip_of(&[
        ("page_10.png", solid_png(32, 16, BLUE)),
        ("page_1.png", solid_png(32, 16, GREEN)),
        ("page_02.png", solid_png(32, 16, RED)),
    ]);

    let (status, body) = app.send(multipart("/upload-chapter", &upload_form(&archive, "7", "1"))).await?;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["images_processed"], 3);

    let pages = app.chapters.pages();
    let jpeg = decode_data_url(&pages[0].image_url).expect("jpeg data url");
    let composite = image::load_from_memory(&jpeg)?.into_rgb8();
    assert_eq!(composite.dimensions(), (32, 48));
    assert!(close_to(composite.get_pixel(16, 8), RED), "page_02 sorts first");
    assert!(close_to(composite.get_pixel(16, 24), GREEN), "page_1 sorts second");
    assert!(close_to(composite.get_pixel(16, 40), BLUE), "page_10 sorts last");
    Ok(())
}

#[tokio::test]
async fn title_is_stored_trimmed() -> Result<()> {
    let app = TestApp::new()?;
    let archive = zip_of(&[("1.png", solid_png(16, 16, GREEN))]);
    let mut form = upload_form(&archive, "3", "12");
    form.push(Part::Text("title", "  The Return  "));

    let (status, _) = app.send(multipart("/upload-chapter", &form)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.chapters.chapters()[0].title, "The Return");
    Ok(())
}

#[tokio::test]
async fn resubmitting_creates_another_chapter() -> Result<()> {
    let app = TestApp::new()?;
    let archive = zip_of(&[("1.png", solid_png(16, 16, RED))]);

    let (_, first) = app.send(multipart("/upload-chapter", &upload_form(&archive, "1", "5"))).await?;
    let (_, second) = app.send(multipart("/upload-chapter", &upload_form(&archive, "1", "5"))).await?;

    assert_ne!(first["chapter_id"], second["chapter_id"]);
    assert_eq!(app.chapters.chapters().len(), 2);
    assert_eq!(app.chapters.pages().len(), 2);
    Ok(())
}

#[tokio::test]
async fn archive_without_images_is_rejected() -> Result<()> {
    let app = TestApp::new()?;
    let archive = zip_of(&[("notes.txt", b"translator notes".to_vec()), ("cover.gif", vec![0x47, 0x49, 0x46])]);

    let (status, body) = app.send(multipart("/upload-chapter", &upload_form(&archive, "1", "5"))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No images found in archive");
    assert!(app.chapters.chapters().is_empty());
    Ok(())
}

#[tokio::test]
async fn non_zip_archive_is_rejected() -> Result<()> {
    let app = TestApp::new()?;
    let archive = b"definitely not a zip file".to_vec();

    let (status, body) = app.send(multipart("/upload-chapter", &upload_form(&archive, "1", "5"))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().starts_with("Invalid archive"));
    assert!(app.chapters.chapters().is_empty());
    assert!(app.chapters.pages().is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_fields_are_reported() -> Result<()> {
    let app = TestApp::new()?;
    let archive = zip_of(&[("1.png", solid_png(8, 8, RED))]);

    let (status, body) = app
        .send(multipart("/upload-chapter", &[Part::Text("manhwa_id", "1"), Part::File("archive", "c.zip", &archive)]))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");
    assert_eq!(body["field_errors"]["chapter_number"], "This field is required");

    let (status, body) = app
        .send(multipart("/upload-chapter", &[Part::Text("manhwa_id", "1"), Part::Text("chapter_number", "2")]))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["archive"], "This field is required");

    assert!(app.chapters.chapters().is_empty());
    Ok(())
}

#[tokio::test]
async fn non_numeric_identifiers_are_rejected() -> Result<()> {
    let app = TestApp::new()?;
    let archive = zip_of(&[("1.png", solid_png(8, 8, RED))]);

    let (status, body) = app.send(multipart("/upload-chapter", &upload_form(&archive, "1", "five"))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid field format");
    assert!(body["field_errors"]["chapter_number"].is_string());
    Ok(())
}

#[tokio::test]
async fn corrupt_page_fails_without_writing() -> Result<()> {
    let app = TestApp::new()?;
    let archive = zip_of(&[("1.png", solid_png(8, 8, RED)), ("2.jpg", b"not really a jpeg".to_vec())]);

    let (status, body) = app.send(multipart("/upload-chapter", &upload_form(&archive, "1", "5"))).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(app.chapters.chapters().is_empty());
    Ok(())
}

#[tokio::test]
async fn member_failing_its_checksum_is_an_invalid_archive() -> Result<()> {
    let app = TestApp::new()?;
    let page = solid_png(8, 8, GREEN);

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file("1.png", SimpleFileOptions::default().compression_method(CompressionMethod::Stored))?;
    writer.write_all(&page)?;
    let mut archive = writer.finish()?.into_inner();
    let at = archive
        .windows(page.len())
        .position(|window| window == page.as_slice())
        .expect("stored payload");
    archive[at + page.len() - 1] ^= 0xFF;

    let (status, body) = app.send(multipart("/upload-chapter", &upload_form(&archive, "1", "5"))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
    assert!(body["error"].as_str().unwrap_or_default().starts_with("Invalid archive"));
    assert!(app.chapters.chapters().is_empty());
    assert!(app.chapters.pages().is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_page_insert_rolls_back_the_chapter() -> Result<()> {
    let app = TestApp::with_failing_pages()?;
    let archive = zip_of(&[("1.png", solid_png(16, 16, RED)), ("2.png", solid_png(16, 16, BLUE))]);

    let (status, body) = app.send(multipart("/upload-chapter", &upload_form(&archive, "1", "5"))).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to save chapter");
    assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
    assert!(app.chapters.chapters().is_empty());
    assert!(app.chapters.pages().is_empty());
    Ok(())
}

#[tokio::test]
async fn wide_and_tall_pages_are_measured_as_one_canvas() -> Result<()> {
    // Each page alone is 1000 pixels; the composite would be 1000x1001.
    let app = TestApp::with_config(|config| config.upload.max_total_pixels = 2_000)?;
    let archive = zip_of(&[("1.png", solid_png(1000, 1, RED)), ("2.png", solid_png(1, 1000, BLUE))]);

    let (status, body) = app.send(multipart("/upload-chapter", &upload_form(&archive, "1", "5"))).await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE, "body: {}", body);
    assert!(app.chapters.chapters().is_empty());
    Ok(())
}

#[tokio::test]
async fn entry_limit_is_enforced() -> Result<()> {
    let app = TestApp::with_config(|config| config.upload.max_archive_entries = 1)?;
    let archive = zip_of(&[("1.png", solid_png(8, 8, RED)), ("2.png", solid_png(8, 8, BLUE))]);

    let (status, body) = app.send(multipart("/upload-chapter", &upload_form(&archive, "1", "5"))).await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert!(app.chapters.chapters().is_empty());
    Ok(())
}

#[tokio::test]
async fn json_body_is_not_a_multipart_upload() -> Result<()> {
    let app = TestApp::new()?;
    let request = common::json(Method::POST, "/upload-chapter", None, json!({ "manhwa_id": 1 }));

    let (status, body) = app.send(request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn only_post_is_routed() -> Result<()> {
    let app = TestApp::new()?;
    let (status, _) = app.send(common::get("/upload-chapter")).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}
