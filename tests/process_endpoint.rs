use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
    Router,
};
use image2text::{Element, HttpTransport, Outcome, Page, SelectedFile, UploadController};
use tokio::net::TcpListener;

#[derive(Debug)]
struct SeenField {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone)]
struct Backend {
    status: StatusCode,
    body: &'static str,
    seen: Arc<Mutex<Vec<SeenField>>>,
}

impl Backend {
    fn new(status: StatusCode, body: &'static str) -> Self {
        Self {
            status,
            body,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

async fn process(State(backend): State<Backend>, mut multipart: Multipart) -> (StatusCode, String) {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        backend.seen.lock().unwrap().push(SeenField {
            name,
            file_name,
            content_type,
            bytes,
        });
    }
    (backend.status, backend.body.to_string())
}

async fn serve(backend: Backend) -> String {
    let app = Router::new()
        .route("/process", post(process))
        .with_state(backend);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn bind(server: &str) -> (UploadController<Arc<Page>, HttpTransport>, Arc<Page>) {
    let page = Arc::new(Page::new());
    let transport = HttpTransport::new(server).unwrap();
    let controller = UploadController::bind(page.clone(), transport).unwrap();
    (controller, page)
}

fn write_image(dir: &Path, name: &str, bytes: &[u8]) -> SelectedFile {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    SelectedFile::from_path(path)
}

fn assert_controls_restored(page: &Page) {
    assert!(!page.is_visible(Element::Spinner));
    assert!(!page.is_disabled(Element::SubmitButton));
}

#[tokio::test]
async fn posts_single_image_field_and_renders_description() {
    let backend = Backend::new(StatusCode::OK, r#"{"description_fr":"un chat sur un canapé"}"#);
    let seen = backend.seen.clone();
    let server = serve(backend).await;
    let (controller, page) = bind(&server);

    let dir = tempfile::tempdir().unwrap();
    let body = b"\x89PNG\r\n\x1a\npixels";
    controller
        .handle_file_selected(Some(write_image(dir.path(), "chat.png", body)))
        .await;
    let outcome = controller.handle_submit().await;

    assert_eq!(outcome, Outcome::Described("un chat sur un canapé".into()));
    assert!(page.is_visible(Element::Result));
    assert_eq!(page.text(Element::Description), "un chat sur un canapé");
    assert!(!page.is_visible(Element::Error));
    assert_controls_restored(&page);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].name, "image");
    assert_eq!(seen[0].file_name.as_deref(), Some("chat.png"));
    assert_eq!(seen[0].content_type.as_deref(), Some("image/png"));
    assert_eq!(seen[0].bytes, body);
}

#[tokio::test]
async fn rejected_upload_shows_server_message() {
    let server = serve(Backend::new(
        StatusCode::BAD_REQUEST,
        r#"{"error":"File type not allowed (png, jpg, jpeg only)."}"#,
    ))
    .await;
    let (controller, page) = bind(&server);

    let dir = tempfile::tempdir().unwrap();
    controller
        .handle_file_selected(Some(write_image(dir.path(), "anim.gif", b"GIF89a")))
        .await;
    controller.handle_submit().await;

    assert!(page.is_visible(Element::Error));
    assert_eq!(
        page.text(Element::ErrorMessage),
        "File type not allowed (png, jpg, jpeg only)."
    );
    assert!(!page.is_visible(Element::Result));
    assert_controls_restored(&page);
}

#[tokio::test]
async fn non_json_failure_mentions_status() {
    let server = serve(Backend::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
    ))
    .await;
    let (controller, page) = bind(&server);

    let dir = tempfile::tempdir().unwrap();
    controller
        .handle_file_selected(Some(write_image(dir.path(), "a.jpg", b"\xff\xd8\xff")))
        .await;
    let outcome = controller.handle_submit().await;

    assert_eq!(outcome, Outcome::Failed("Server error 500".into()));
    assert!(page.text(Element::ErrorMessage).contains("500"));
    assert_controls_restored(&page);
}

#[tokio::test]
async fn missing_file_never_reaches_server() {
    let backend = Backend::new(StatusCode::OK, "{}");
    let seen = backend.seen.clone();
    let server = serve(backend).await;
    let (controller, page) = bind(&server);

    assert_eq!(controller.handle_submit().await, Outcome::Blocked);
    assert!(seen.lock().unwrap().is_empty());
    assert!(page.is_visible(Element::Error));
}

#[tokio::test]
async fn unreachable_server_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let (controller, page) = bind(&format!("http://{addr}"));

    let dir = tempfile::tempdir().unwrap();
    controller
        .handle_file_selected(Some(write_image(dir.path(), "a.png", b"\x89PNG")))
        .await;

    match controller.handle_submit().await {
        Outcome::Failed(message) => assert!(!message.is_empty()),
        other => panic!("unexpected {other:?}"),
    }
    assert!(page.is_visible(Element::Error));
    assert_controls_restored(&page);
}
