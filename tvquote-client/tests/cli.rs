//! Проверки бинарника, которые падают до любого сетевого запроса.

use assert_cmd::Command;
use predicates::prelude::*;

fn client() -> Command {
    Command::cargo_bin("tvquote-client").unwrap()
}

#[test]
fn help_lists_arguments() {
    client()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--fields"))
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--ws-url"));
}

#[test]
fn query_is_required() {
    client().assert().failure();
}

#[test]
fn unknown_category_fails_fast() {
    client()
        .args(["btcusdt", "bonds"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown category"));
}

#[test]
fn non_websocket_url_fails_validation() {
    client()
        .args(["btcusdt", "crypto", "--ws-url", "http://example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--ws-url must start with ws:// or wss://"));
}

#[test]
fn empty_fields_list_fails_before_lookup() {
    client()
        .args(["btcusdt", "--fields", " , "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fields list is empty"));
}

#[test]
fn missing_fields_file_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fields.txt");

    client()
        .args(["btcusdt", "--fields-file"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("fields file not found"));
}

#[test]
fn failed_lookup_exits_nonzero() {
    // порт закрыт -> ошибка HTTP до открытия websocket
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    client()
        .args(["btcusdt", "--search-url"])
        .arg(format!("http://{addr}/symbol_search/"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to resolve"));
}
