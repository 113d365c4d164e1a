//! HTTP API tests, driving the router in-process.
//!
//! Run with: cargo test -p slidemaker-server

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use slidemaker::sample::{sample_png, SampleDeck};
use slidemaker::{Limits, Presentation};
use slidemaker_server::{router, AppState};
use tower::ServiceExt;

const BOUNDARY: &str = "----slidemaker-test-boundary";

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, Vec<u8>),
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn post(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn app() -> Router {
    router(AppState::new(Limits::default()))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, header::HeaderMap, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, headers, body)
}

async fn error_of(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let (status, _, body) = send(app, request).await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    (status, json["error"].as_str().unwrap_or_default().to_string())
}

fn deck(slides: usize) -> Vec<u8> {
    SampleDeck::new().slides(slides).build().unwrap()
}

#[tokio::test]
async fn test_health() {
    let request = Request::get("/api/health").body(Body::empty()).unwrap();
    let (status, _, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"status": "healthy", "message": "SlideMaker API is running"})
    );
}

#[tokio::test]
async fn test_unknown_route() {
    let request = Request::get("/api/nope").body(Body::empty()).unwrap();
    assert_eq!(
        error_of(app(), request).await,
        (StatusCode::NOT_FOUND, "Not found".to_string())
    );
}

#[tokio::test]
async fn test_add_slide_returns_presentation() {
    let request = post(
        "/api/add-slide",
        &[
            Part::File("file", "deck.pptx", deck(3)),
            Part::Text("layout", "Title and Content"),
            Part::Text("title", "From the API"),
            Part::Text("text", "First\nSecond"),
            Part::Text("position", "1"),
        ],
    );
    let (status, headers, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.presentationml.presentation"
    );
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"presentation_modified.pptx\""
    );

    let presentation = Presentation::from_bytes(body, u64::MAX).unwrap();
    assert_eq!(presentation.slide_count(), 4);
    let slide = presentation.slide(1).unwrap();
    assert_eq!(slide.title().as_deref(), Some("From the API"));
    assert!(slide.shape_texts().contains(&"First\nSecond".to_string()));
}

#[tokio::test]
async fn test_position_is_clamped() {
    let request = post(
        "/api/add-slide",
        &[
            Part::File("file", "deck.pptx", deck(3)),
            Part::Text("layout", "Title and Content"),
            Part::Text("title", "Appended"),
            Part::Text("text", "x"),
            Part::Text("position", "999"),
        ],
    );
    let (status, _, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    let presentation = Presentation::from_bytes(body, u64::MAX).unwrap();
    assert_eq!(
        presentation.slide(3).unwrap().title().as_deref(),
        Some("Appended")
    );
}

#[tokio::test]
async fn test_add_slide_with_image() {
    let request = post(
        "/api/add-slide",
        &[
            Part::File("file", "deck.pptx", deck(1)),
            Part::Text("layout", "Picture with Caption"),
            Part::Text("text", "Caption"),
            Part::File("image", "photo.PNG", sample_png(30, 20).unwrap()),
        ],
    );
    let (status, _, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    let presentation = Presentation::from_bytes(body, u64::MAX).unwrap();
    assert_eq!(presentation.slide(0).unwrap().picture_count(), 1);
}

#[tokio::test]
async fn test_image_with_empty_filename_is_ignored() {
    let request = post(
        "/api/add-slide",
        &[
            Part::File("file", "deck.pptx", deck(0)),
            Part::Text("layout", "Blank"),
            Part::Text("text", "x"),
            Part::File("image", "", Vec::new()),
        ],
    );
    let (status, _, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_validation_messages() {
    let cases: Vec<(Vec<Part<'static>>, &str)> = vec![
        (
            vec![Part::Text("layout", "Blank"), Part::Text("text", "x")],
            "No PowerPoint file uploaded",
        ),
        (
            vec![Part::File("file", "", deck(0))],
            "No file selected",
        ),
        (
            vec![Part::File("file", "deck.ppt", deck(0))],
            "File must be a .pptx PowerPoint file",
        ),
        (
            vec![Part::File("file", "deck.pptx", deck(0)), Part::Text("text", "x")],
            "Layout name is required",
        ),
        (
            vec![
                Part::File("file", "deck.pptx", deck(0)),
                Part::Text("layout", "Blank"),
                Part::Text("text", "   "),
            ],
            "Content text is required",
        ),
        (
            vec![
                Part::File("file", "deck.pptx", deck(0)),
                Part::Text("layout", "Blank"),
                Part::Text("text", "x"),
                Part::File("image", "photo.webp", vec![1, 2, 3]),
            ],
            "Invalid image format. Allowed: png, jpg, jpeg, gif, bmp",
        ),
        (
            vec![
                Part::File("file", "deck.pptx", deck(0)),
                Part::Text("layout", "Blank"),
                Part::Text("text", "x"),
                Part::Text("position", "-1"),
            ],
            "Position cannot be negative",
        ),
        (
            vec![
                Part::File("file", "deck.pptx", deck(0)),
                Part::Text("layout", "Blank"),
                Part::Text("text", "x"),
                Part::Text("position", "second"),
            ],
            "Position must be a valid number",
        ),
        (
            // Layout is checked before position.
            vec![
                Part::File("file", "deck.pptx", deck(0)),
                Part::Text("text", "x"),
                Part::Text("position", "second"),
            ],
            "Layout name is required",
        ),
    ];

    for (parts, expected) in cases {
        let (status, message) = error_of(app(), post("/api/add-slide", &parts)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", expected);
        assert_eq!(message, expected);
    }
}

#[tokio::test]
async fn test_not_multipart() {
    let request = Request::post("/api/add-slide")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    assert_eq!(
        error_of(app(), request).await,
        (StatusCode::BAD_REQUEST, "No PowerPoint file uploaded".to_string())
    );
}

#[tokio::test]
async fn test_document_too_large() {
    let limits = Limits {
        max_document_bytes: 64,
        ..Limits::default()
    };
    let request = post(
        "/api/add-slide",
        &[
            Part::File("file", "deck.pptx", deck(0)),
            Part::Text("layout", "Blank"),
            Part::Text("text", "x"),
        ],
    );
    let (status, message) = error_of(router(AppState::new(limits)), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(message.starts_with("PowerPoint file too large: "), "{}", message);
}

#[tokio::test]
async fn test_request_body_limit() {
    let state = AppState::new(Limits::with_megabytes(0, 0));
    let limit = state.body_limit;
    let request = post(
        "/api/add-slide",
        &[Part::File("file", "deck.pptx", vec![0; 2 * 1024 * 1024])],
    );
    let (status, message) = error_of(router(state), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        message,
        format!("Upload too large: request body exceeds {} bytes", limit)
    );
}

#[tokio::test]
async fn test_document_errors() {
    let no_layouts = SampleDeck::new().layouts(Vec::new()).build().unwrap();
    let cases = vec![
        (no_layouts, "Presentation has no slide layouts"),
        (
            SampleDeck::new().without_master().build().unwrap(),
            "No slide masters found in presentation",
        ),
    ];
    for (bytes, expected) in cases {
        let request = post(
            "/api/add-slide",
            &[
                Part::File("file", "deck.pptx", bytes),
                Part::Text("layout", "Blank"),
                Part::Text("text", "x"),
            ],
        );
        assert_eq!(
            error_of(app(), request).await,
            (StatusCode::BAD_REQUEST, expected.to_string())
        );
    }

    let request = post(
        "/api/add-slide",
        &[
            Part::File("file", "deck.pptx", b"not a zip".to_vec()),
            Part::Text("layout", "Blank"),
            Part::Text("text", "x"),
        ],
    );
    let (status, message) = error_of(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(message.starts_with("Invalid or corrupted PowerPoint file: "));
}

#[tokio::test]
async fn test_get_layouts() {
    let request = post("/api/get-layouts", &[Part::File("file", "deck.pptx", deck(2))]);
    let (status, _, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_slides"], 2);
    assert_eq!(json["message"], "Found 5 layouts in presentation");
    assert_eq!(
        json["layouts"][0],
        serde_json::json!({"index": 0, "name": "Title Slide", "type": "title"})
    );
}

#[tokio::test]
async fn test_get_layouts_errors() {
    let request = post(
        "/api/get-layouts",
        &[Part::File("file", "deck.pptx", b"garbage".to_vec())],
    );
    let (status, message) = error_of(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(message.starts_with("Invalid PowerPoint file: "), "{}", message);

    let request = post(
        "/api/get-layouts",
        &[Part::File(
            "file",
            "deck.pptx",
            SampleDeck::new().without_master().build().unwrap(),
        )],
    );
    assert_eq!(
        error_of(app(), request).await,
        (
            StatusCode::BAD_REQUEST,
            "No slide masters found in presentation".to_string()
        )
    );

    let request = post("/api/get-layouts", &[]);
    assert_eq!(
        error_of(app(), request).await,
        (StatusCode::BAD_REQUEST, "No PowerPoint file uploaded".to_string())
    );
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let request = Request::get("/api/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(app(), request).await;
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
