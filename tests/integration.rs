use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use rax_file_manager::FileManager;
use rax_file_manager::locations::{ConfigPatch, Location, LocationStore};
use rax_file_manager::server::build_router;
use rax_file_manager::storage::{CreateOutcome, DeleteOutcome, EntryType};
use serde_json::Value;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

// Helper to build a manager over two locations inside a scratch directory
fn setup_manager(dir: &TempDir) -> FileManager {
    FileManager::new(Arc::new(store_for(dir.path())))
}

fn store_for(base: &Path) -> LocationStore {
    LocationStore::with_defaults(
        base.join("fm-config.json"),
        vec![
            Location::new("Primary", base.join("primary")),
            Location::new("Secondary", base.join("secondary")),
        ],
    )
    .unwrap()
}

// Start the HTTP API on an ephemeral port
async fn start_test_server(manager: FileManager) -> SocketAddr {
    start_test_server_with_limit(manager, 1024 * 1024).await
}

async fn start_test_server_with_limit(manager: FileManager, max_upload_bytes: usize) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(manager, max_upload_bytes);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

// Send a raw HTTP/1.1 JSON request and return (status code, body)
async fn send_request(
    addr: SocketAddr,
    method: &str,
    target: &str,
    body: Option<&str>,
) -> (u16, String) {
    let body = body.unwrap_or("");
    send_raw(addr, method, target, "application/json", body.as_bytes()).await
}

async fn send_raw(
    addr: SocketAddr,
    method: &str,
    target: &str,
    content_type: &str,
    body: &[u8],
) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let head = format!(
        "{method} {target} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
         Content-Type: {content_type}\r\nContent-Length: {}\r\n\r\n",
        body.len()
    );
    stream.write_all(head.as_bytes()).await.unwrap();
    stream.write_all(body).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let response = String::from_utf8_lossy(&raw).to_string();

    let status = response
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap();
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();
    (status, body)
}

fn parse_json(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("invalid JSON {body:?}: {e}"))
}

const BOUNDARY: &str = "rax-test-boundary";

// A part is (field name, file name, content); no file name means a text field
fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, file_name, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(content.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(addr: SocketAddr, target: &str, body: &[u8]) -> (u16, String) {
    let content_type = format!("multipart/form-data; boundary={BOUNDARY}");
    send_raw(addr, "POST", target, &content_type, body).await
}

#[tokio::test]
async fn test_fresh_root_lists_empty() {
    let dir = TempDir::new().unwrap();
    let manager = setup_manager(&dir);
    assert!(manager.list("").await.unwrap().is_empty());
    assert!(!dir.path().join("primary").exists());
}

#[tokio::test]
async fn test_create_folder_then_list() {
    let dir = TempDir::new().unwrap();
    let manager = setup_manager(&dir);

    let outcome = manager.create_folder("reports", "").await.unwrap();
    assert!(matches!(outcome, CreateOutcome::Created(_)));

    let entries = manager.list("").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_directory);
    assert_eq!(entries[0].name, "reports");
    assert_eq!(entries[0].path, "reports");
}

#[tokio::test]
async fn test_save_then_list() {
    let dir = TempDir::new().unwrap();
    let manager = setup_manager(&dir);
    let bytes = b"quarterly numbers".to_vec();

    manager.create_folder("reports", "").await.unwrap();
    manager.save_file("a.txt", bytes.clone(), "reports").await.unwrap();

    let entries = manager.list("reports").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].size, bytes.len() as u64);
    assert_eq!(entries[0].entry_type, EntryType::Document);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let manager = setup_manager(&dir);
    manager.save_file("a.txt", b"x".to_vec(), "reports").await.unwrap();

    assert_eq!(manager.delete("reports/a.txt").await.unwrap(), DeleteOutcome::Removed);
    assert_eq!(
        manager.delete("reports/a.txt").await.unwrap(),
        DeleteOutcome::AlreadyAbsent
    );
}

#[tokio::test]
async fn test_move_into_missing_folder() {
    let dir = TempDir::new().unwrap();
    let manager = setup_manager(&dir);
    manager.save_file("a.txt", b"x".to_vec(), "reports").await.unwrap();

    manager.move_entry("reports/a.txt", "archive/a.txt").await.unwrap();

    let reports = manager.list("reports").await.unwrap();
    assert!(reports.iter().all(|e| e.name != "a.txt"));
    let archive = manager.list("archive").await.unwrap();
    assert!(archive.iter().any(|e| e.name == "a.txt"));
}

#[tokio::test]
async fn test_switching_active_location() {
    let dir = TempDir::new().unwrap();
    let manager = setup_manager(&dir);
    manager.save_file("first.txt", b"1".to_vec(), "").await.unwrap();

    manager
        .update_configuration(ConfigPatch::active_index(1))
        .await
        .unwrap();
    assert!(manager.list("").await.unwrap().is_empty());

    manager.save_file("second.txt", b"2".to_vec(), "").await.unwrap();
    assert!(dir.path().join("secondary/second.txt").is_file());
    assert!(!dir.path().join("primary/second.txt").exists());
}

#[tokio::test]
async fn test_config_survives_restart() {
    let dir = TempDir::new().unwrap();
    let manager = setup_manager(&dir);

    let patch = ConfigPatch {
        locations: Some(vec![
            Location::new("Only", dir.path().join("only")),
            Location::new("Other", dir.path().join("other")),
        ]),
        active_location_index: Some(1),
    };
    let merged = manager.update_configuration(patch).await.unwrap();

    let restarted = setup_manager(&dir);
    assert_eq!(restarted.configuration().await, merged);
    assert_eq!(restarted.active_root().await, dir.path().join("other"));
}

#[tokio::test]
async fn test_upload_items_are_independent() {
    let dir = TempDir::new().unwrap();
    let manager = setup_manager(&dir);

    let report = manager
        .upload(
            vec![
                rax_file_manager::manager::UploadItem {
                    name: "ok.png".into(),
                    bytes: b"png".to_vec(),
                },
                rax_file_manager::manager::UploadItem {
                    name: "".into(),
                    bytes: b"lost".to_vec(),
                },
                rax_file_manager::manager::UploadItem {
                    name: "also ok.mp4".into(),
                    bytes: b"mp4".to_vec(),
                },
            ],
            "media",
        )
        .await;

    assert_eq!(report.stored.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.stored[1].name, "also_ok.mp4");
    assert_eq!(manager.list("media").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_traversal_never_leaves_root() {
    let dir = TempDir::new().unwrap();
    let manager = setup_manager(&dir);
    std::fs::write(dir.path().join("secret.txt"), "top secret").unwrap();

    assert!(manager.open("../secret.txt").await.is_err());
    manager.save_file("x.txt", b"x".to_vec(), "../../..").await.unwrap();
    assert!(dir.path().join("primary/__/__/__/x.txt").is_file());
    assert_eq!(manager.delete("../secret.txt").await.unwrap(), DeleteOutcome::AlreadyAbsent);
    assert!(dir.path().join("secret.txt").exists());
}

#[tokio::test]
async fn test_http_list_and_create_folder() {
    let dir = TempDir::new().unwrap();
    let addr = start_test_server(setup_manager(&dir)).await;

    let (status, body) = send_request(addr, "GET", "/api/files?path=", None).await;
    assert_eq!(status, 200);
    assert_eq!(parse_json(&body), serde_json::json!([]));

    let (status, body) = send_request(
        addr,
        "POST",
        "/api/folders",
        Some(r#"{"name":"reports","path":""}"#),
    )
    .await;
    assert_eq!(status, 201);
    let created = parse_json(&body);
    assert_eq!(created["isDirectory"], true);
    assert_eq!(created["type"], "folder");
    assert_eq!(created["size"], 0);

    let (status, body) = send_request(addr, "GET", "/api/files", None).await;
    assert_eq!(status, 200);
    let listing = parse_json(&body);
    let entries = listing.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "reports");
    assert_eq!(entries[0]["path"], "reports");
    assert!(entries[0]["createdAt"].is_string());
}

#[tokio::test]
async fn test_http_move_into_self_rejected() {
    let dir = TempDir::new().unwrap();
    let manager = setup_manager(&dir);
    manager.create_folder("photos", "").await.unwrap();
    let addr = start_test_server(manager).await;

    let (status, body) = send_request(
        addr,
        "POST",
        "/api/files/move",
        Some(r#"{"source":"photos","destination":"photos/2024/photos"}"#),
    )
    .await;
    assert_eq!(status, 400);
    let error = parse_json(&body);
    assert_eq!(error["success"], false);
    assert!(error["error"].is_string());
    assert!(!dir.path().join("primary/photos/2024").exists());
}

#[tokio::test]
async fn test_http_download_and_delete() {
    let dir = TempDir::new().unwrap();
    let manager = setup_manager(&dir);
    manager
        .save_file("notes.txt", b"hello there".to_vec(), "docs")
        .await
        .unwrap();
    let addr = start_test_server(manager).await;

    let (status, body) =
        send_request(addr, "GET", "/api/files/download?path=docs/notes.txt", None).await;
    assert_eq!(status, 200);
    assert!(body.contains("hello there"));

    let (status, _) = send_request(addr, "GET", "/api/files/download?path=docs", None).await;
    assert_eq!(status, 404);

    let (status, body) = send_request(addr, "DELETE", "/api/files?path=docs/notes.txt", None).await;
    assert_eq!(status, 200);
    assert_eq!(parse_json(&body), serde_json::json!({ "success": true }));

    let (status, body) =
        send_request(addr, "DELETE", "/api/files?path=docs/notes.txt", None).await;
    assert_eq!(status, 200);
    assert_eq!(parse_json(&body), serde_json::json!({ "success": false }));
}

#[tokio::test]
async fn test_http_config_round_trip() {
    let dir = TempDir::new().unwrap();
    let addr = start_test_server(setup_manager(&dir)).await;

    let (status, body) =
        send_request(addr, "PUT", "/api/config", Some(r#"{"activeLocationIndex":1}"#)).await;
    assert_eq!(status, 200);
    assert_eq!(parse_json(&body)["activeLocationIndex"], 1);

    let (status, body) = send_request(addr, "GET", "/api/config", None).await;
    assert_eq!(status, 200);
    let config = parse_json(&body);
    assert_eq!(config["activeLocationIndex"], 1);
    assert_eq!(config["locations"][1]["name"], "Secondary");
}

#[tokio::test]
async fn test_http_upload_reports_each_part() {
    let dir = TempDir::new().unwrap();
    let addr = start_test_server(setup_manager(&dir)).await;

    let body = multipart_body(&[
        ("path", None, "inbox"),
        ("files", Some("report one.txt"), "hello"),
        ("files", Some(".gitkeep"), ""),
    ]);
    let (status, body) = upload(addr, "/api/files/upload?path=ignored", &body).await;

    assert_eq!(status, 200);
    let report = parse_json(&body);
    assert_eq!(report["success"], false);
    assert_eq!(report["message"], "1 file(s) uploaded");

    let files = report["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "report_one.txt");
    assert_eq!(files[0]["path"], "inbox/report_one.txt");
    assert_eq!(files[0]["size"], 5);

    let failed = report["failed"].as_array().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["name"], ".gitkeep");
    assert!(failed[0]["error"].is_string());

    assert_eq!(
        std::fs::read(dir.path().join("primary/inbox/report_one.txt")).unwrap(),
        b"hello"
    );
    assert!(!dir.path().join("primary/ignored").exists());
}

#[tokio::test]
async fn test_http_upload_uses_query_path_without_path_part() {
    let dir = TempDir::new().unwrap();
    let addr = start_test_server(setup_manager(&dir)).await;

    let body = multipart_body(&[("files", Some("a.png"), "png")]);
    let (status, body) = upload(addr, "/api/files/upload?path=media/2024", &body).await;

    assert_eq!(status, 200);
    let report = parse_json(&body);
    assert_eq!(report["success"], true);
    assert_eq!(report["files"][0]["path"], "media/2024/a.png");
    assert_eq!(report["files"][0]["type"], "image");
    assert_eq!(report["failed"], serde_json::json!([]));
}

#[tokio::test]
async fn test_http_upload_all_failed_or_empty_is_rejected() {
    let dir = TempDir::new().unwrap();
    let addr = start_test_server(setup_manager(&dir)).await;

    let body = multipart_body(&[("files", Some(".gitkeep"), "")]);
    let (status, body) = upload(addr, "/api/files/upload", &body).await;
    assert_eq!(status, 400);
    let report = parse_json(&body);
    assert_eq!(report["message"], "0 file(s) uploaded");
    assert_eq!(report["failed"].as_array().unwrap().len(), 1);

    let body = multipart_body(&[("path", None, "inbox")]);
    let (status, body) = upload(addr, "/api/files/upload", &body).await;
    assert_eq!(status, 400);
    assert_eq!(parse_json(&body)["error"], "No files uploaded");
}

#[tokio::test]
async fn test_http_upload_over_limit_is_refused() {
    let dir = TempDir::new().unwrap();
    let addr = start_test_server_with_limit(setup_manager(&dir), 64).await;

    let big = "x".repeat(256);
    let body = multipart_body(&[("files", Some("big.bin"), big.as_str())]);
    let (status, _) = upload(addr, "/api/files/upload", &body).await;

    assert_eq!(status, 413);
    assert!(!dir.path().join("primary/big.bin").exists());
}

#[tokio::test]
async fn test_paths_through_a_file_are_absent() {
    let dir = TempDir::new().unwrap();
    let manager = setup_manager(&dir);
    manager.save_file("a.txt", b"x".to_vec(), "").await.unwrap();
    let addr = start_test_server(manager).await;

    let (status, body) = send_request(addr, "GET", "/api/files?path=a.txt/sub", None).await;
    assert_eq!(status, 200);
    assert_eq!(parse_json(&body), serde_json::json!([]));

    let (status, body) = send_request(addr, "DELETE", "/api/files?path=a.txt/sub", None).await;
    assert_eq!(status, 200);
    assert_eq!(parse_json(&body)["success"], false);

    let (status, _) =
        send_request(addr, "GET", "/api/files/download?path=a.txt/sub", None).await;
    assert_eq!(status, 404);
}
