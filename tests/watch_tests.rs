mod common;

use common::http::{get, loopback};
use common::test_server::{free_port, setup_may_runtime};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use webserve::watch::watch_document;
use webserve::ServerController;

#[test]
fn test_watched_file_is_reserved_on_change() {
    setup_may_runtime();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.html");
    std::fs::write(&path, "<p>v1</p>").unwrap();

    let port = free_port();
    let controller = Arc::new(ServerController::new());
    controller.start("<p>v1</p>", "127.0.0.1", port).unwrap();
    controller.wait_ready(Duration::from_secs(2)).unwrap();

    let _watcher =
        watch_document(&path, Arc::clone(&controller), "127.0.0.1".to_string(), port).unwrap();
    std::fs::write(&path, "<p>v2</p>").unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while controller.document().as_str() != "<p>v2</p>" && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }

    assert_eq!(get(loopback(port)).unwrap().body, "<p>v2</p>");
    assert_eq!(controller.local_addr(), Some(loopback(port)));
    controller.stop();
}
