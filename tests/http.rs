use std::time::Duration;

use axum::http::StatusCode;
use axum_test::{TestServer, TestWebSocket};
use bridge::{AppState, config::Config, db};
use serde_json::{Value, json};
use tokio::time::{sleep, timeout};

const DEBOUNCE: Duration = Duration::from_millis(200);

async fn state(debounce: Duration) -> AppState {
    let config = Config {
        database_url: "sqlite::memory:".to_owned(),
        debounce,
        ..Config::default()
    };
    let db_pool = db::connect(&config.database_url, 1).await.unwrap();
    AppState::new(db_pool, config)
}

async fn server() -> TestServer {
    TestServer::new(bridge::app(state(DEBOUNCE).await)).unwrap()
}

async fn ws_server(debounce: Duration) -> TestServer {
    TestServer::builder()
        .http_transport()
        .build(bridge::app(state(debounce).await))
        .unwrap()
}

async fn open_editor(server: &TestServer, code: &str) -> TestWebSocket {
    server
        .get_websocket(&format!("/api/rooms/{code}/ws"))
        .await
        .into_websocket()
        .await
}

async fn next_text(socket: &mut TestWebSocket) -> Option<String> {
    let room: Value = timeout(Duration::from_secs(2), socket.receive_json()).await.ok()?;
    Some(room["text"].as_str().unwrap().to_owned())
}

async fn stored_text(server: &TestServer, code: &str) -> String {
    let room: Value = server.get(&format!("/api/rooms/{code}")).await.json();
    room["text"].as_str().unwrap().to_owned()
}

async fn create(server: &TestServer) -> String {
    let response = server.post("/api/rooms").await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["code"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn health_and_version() {
    let server = server().await;

    server.get("/health").await.assert_status_ok();
    server.get("/version").await.assert_text(env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn created_room_reads_back_empty() {
    let server = server().await;
    let code = create(&server).await;

    let room: Value = server.get(&format!("/api/rooms/{code}")).await.json();

    assert_eq!(room["code"], code.as_str());
    assert_eq!(room["text"], "");
    assert!(room["createdAt"].is_string());
    assert!(room["lastUpdatedAt"].is_string());
}

#[tokio::test]
async fn update_then_read() {
    let server = server().await;
    let code = create(&server).await;

    server
        .put(&format!("/api/rooms/{code}"))
        .json(&json!({ "text": "hello" }))
        .await
        .assert_status_ok();
    let room: Value = server.get(&format!("/api/rooms/{}", code.to_lowercase())).await.json();

    assert_eq!(room["text"], "hello");
}

#[tokio::test]
async fn unknown_room_is_404_and_bad_code_is_400() {
    let server = server().await;

    server.get("/api/rooms/ZZZZ").await.assert_status(StatusCode::NOT_FOUND);
    server.get("/api/rooms/TOOLONG").await.assert_status(StatusCode::BAD_REQUEST);
    server
        .put("/api/rooms/ZZZZ")
        .json(&json!({ "text": "x" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn room_page_and_sorry_page() {
    let server = server().await;
    let code = create(&server).await;

    let page = server.get(&format!("/{code}")).await;
    page.assert_status_ok();
    assert!(page.text().contains(&format!("<h1>{code}</h1>")));
    assert!(page.text().contains(r#"id="theme""#));

    server.get("/ZZZZ").await.assert_status(StatusCode::NOT_FOUND);
    server.get("/nope!").await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_is_a_text_attachment() {
    let server = server().await;
    let code = create(&server).await;
    server
        .put(&format!("/api/rooms/{code}"))
        .json(&json!({ "text": "line one\nline two" }))
        .await
        .assert_status_ok();

    let response = server.get(&format!("/{code}/download")).await;

    response.assert_status_ok();
    response.assert_text("line one\nline two");
    assert_eq!(
        response.header("content-disposition"),
        format!("attachment; filename=\"bridge-{code}.txt\"").as_str()
    );
}

#[tokio::test]
async fn landing_page_is_served() {
    let server = server().await;

    let page = server.get("/").await;

    page.assert_status_ok();
    assert!(page.text().contains("Create New Room"));
    assert!(page.text().contains(r#"id="theme""#));
}

#[tokio::test]
async fn editors_share_one_debounced_write() {
    let server = ws_server(DEBOUNCE).await;
    let code = create(&server).await;
    let mut writer = open_editor(&server, &code).await;
    let mut viewer = open_editor(&server, &code).await;
    assert_eq!(next_text(&mut writer).await.as_deref(), Some(""));
    assert_eq!(next_text(&mut viewer).await.as_deref(), Some(""));

    for i in 0..10 {
        writer.send_json(&json!({ "text": format!("t{i}") })).await;
    }

    assert_eq!(next_text(&mut writer).await.as_deref(), Some("t9"));
    assert_eq!(next_text(&mut viewer).await.as_deref(), Some("t9"));
    assert_eq!(stored_text(&server, &code).await, "t9");

    // one write means one echo each
    assert!(timeout(DEBOUNCE * 2, writer.receive_text()).await.is_err());
    assert!(timeout(DEBOUNCE, viewer.receive_text()).await.is_err());
}

#[tokio::test]
async fn closing_an_editor_flushes_its_pending_edit() {
    // long enough that only the close can trigger the write
    let server = ws_server(Duration::from_secs(60)).await;
    let code = create(&server).await;
    let mut writer = open_editor(&server, &code).await;
    assert_eq!(next_text(&mut writer).await.as_deref(), Some(""));

    writer.send_json(&json!({ "text": "bye" })).await;
    writer.close().await;

    let mut stored = String::new();
    for _ in 0..40 {
        stored = stored_text(&server, &code).await;
        if stored == "bye" {
            break;
        }
        sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(stored, "bye");
}

#[tokio::test]
async fn editor_for_missing_room_is_refused() {
    let server = ws_server(DEBOUNCE).await;

    server
        .get_websocket("/api/rooms/ZZZZ/ws")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
