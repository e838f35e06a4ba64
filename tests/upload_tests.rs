// tests/upload_tests.rs

use std::sync::Arc;

use blog_backend::repository::InMemoryPostRepository;
use blog_backend::routes;
use blog_backend::state::AppState;
use blog_backend::upload::{MAX_UPLOAD_BYTES, UploadPolicy};

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL and the temp upload dir (kept so its contents can
/// be inspected).
async fn spawn_app() -> (String, tempfile::TempDir) {
    let upload_dir = tempfile::tempdir().expect("Failed to create temp upload dir");

    let state = AppState {
        repo: Arc::new(InMemoryPostRepository::new()),
        uploads: UploadPolicy::new(upload_dir.path()),
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, upload_dir)
}

fn stored_file_count(dir: &tempfile::TempDir) -> usize {
    std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0)
}

fn media_form(filename: &str, mime: &str, data: Vec<u8>) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(data)
        .file_name(filename.to_string())
        .mime_str(mime)
        .unwrap();
    reqwest::multipart::Form::new().part("media", part)
}

#[tokio::test]
async fn upload_returns_a_public_url_and_serves_the_file_back() {
    // Arrange
    let (address, uploads) = spawn_app().await;
    let client = reqwest::Client::new();
    let data = b"fake jpeg bytes".to_vec();

    // Act
    let response = client
        .post(format!("{}/upload", address))
        .multipart(media_form("photo.jpg", "image/jpeg", data.clone()))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let payload = response.json::<serde_json::Value>().await.unwrap();
    let url = payload["url"].as_str().unwrap();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".jpg"));
    assert_eq!(stored_file_count(&uploads), 1);

    // The stored file is served back under the public prefix.
    let served = client
        .get(format!("{}{}", address, url))
        .send()
        .await
        .unwrap();
    assert_eq!(served.status().as_u16(), 200);
    assert_eq!(served.bytes().await.unwrap().to_vec(), data);
}

#[tokio::test]
async fn upload_rejects_disallowed_mime_before_storage() {
    let (address, uploads) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/upload", address))
        .multipart(media_form("notes.txt", "text/plain", b"hello".to_vec()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let payload = response.json::<serde_json::Value>().await.unwrap();
    assert!(payload["error"].is_string());

    // Nothing was written.
    assert_eq!(stored_file_count(&uploads), 0);
}

#[tokio::test]
async fn upload_rejects_oversize_file_before_storage() {
    let (address, uploads) = spawn_app().await;
    let client = reqwest::Client::new();

    let data = vec![0u8; MAX_UPLOAD_BYTES + 1];
    let response = client
        .post(format!("{}/upload", address))
        .multipart(media_form("big.png", "image/png", data))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(stored_file_count(&uploads), 0);
}

#[tokio::test]
async fn upload_without_a_media_field_is_rejected() {
    let (address, uploads) = spawn_app().await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new().text("other", "value".to_string());
    let response = client
        .post(format!("{}/upload", address))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(stored_file_count(&uploads), 0);
}

#[tokio::test]
async fn create_post_stores_the_cover_and_links_it() {
    // Arrange
    let (address, uploads) = spawn_app().await;
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let cover = reqwest::multipart::Part::bytes(b"fake png bytes".to_vec())
        .file_name("cover.png")
        .mime_str("image/png")
        .unwrap();
    let form = reqwest::multipart::Form::new()
        .text("title", "With cover".to_string())
        .text("author", "tester".to_string())
        .text("content", "Some content".to_string())
        .part("cover", cover);

    // Act
    let response = client
        .post(format!("{}/create", address))
        .multipart(form)
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status().as_u16(), 302);
    assert_eq!(stored_file_count(&uploads), 1);

    let body = client
        .get(format!("{}/main", address))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();
    let cover_url = body["posts"][0]["cover_image"].as_str().unwrap();
    assert!(cover_url.starts_with("/uploads/"));
    assert!(cover_url.ends_with(".png"));
}

#[tokio::test]
async fn create_post_with_disallowed_cover_leaves_no_post_behind() {
    let (address, uploads) = spawn_app().await;
    let client = reqwest::Client::new();

    let cover = reqwest::multipart::Part::bytes(b"not an image".to_vec())
        .file_name("cover.txt")
        .mime_str("text/plain")
        .unwrap();
    let form = reqwest::multipart::Form::new()
        .text("title", "Never stored".to_string())
        .text("author", "tester".to_string())
        .text("content", "Some content".to_string())
        .part("cover", cover);

    let response = client
        .post(format!("{}/create", address))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(stored_file_count(&uploads), 0);

    let body = client
        .get(format!("{}/main", address))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();
    assert_eq!(body["posts"].as_array().unwrap().len(), 0);
}
