//! Round trips against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `ZoteroApi` with the
//! default ureq transport over real HTTP. Validates that the headers, URL
//! joining and response accessors work end-to-end.

use std::fmt::Write as _;
use std::io::{BufRead, BufReader, Write};
use std::net::SocketAddr;
use std::time::Duration;

use zotero_core::{ClientConfig, ZoteroApi, ZoteroError};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

/// Answer one request with a canned `200` carrying `body`.
fn serve_once(body: Vec<u8>) -> SocketAddr {
    serve_once_with_status("200 OK", body)
}

fn serve_once_with_status(status: &'static str, body: Vec<u8>) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap() > 2 {
            line.clear();
        }
        let head = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(&body);
    });

    addr
}

fn client(addr: SocketAddr) -> ZoteroApi {
    let config = ClientConfig {
        base_url: format!("http://{addr}/"),
        timeout: Duration::from_secs(10),
        connection_timeout: Duration::from_secs(5),
        ..ClientConfig::default()
    };
    ZoteroApi::with_config("secret", config)
}

#[test]
fn library_round_trip() {
    let addr = start_server();

    // Step 1: item listing with paging.
    let mut api = client(addr);
    api.group(6789)
        .and_then(|a| a.items())
        .and_then(|a| a.limit(2))
        .and_then(|a| a.send())
        .unwrap();
    assert_eq!(api.status_code().unwrap(), 200);
    assert_eq!(api.reason_phrase().unwrap(), "OK");
    let body = api.body().unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["key"], "ABCD2345");
    let headers = api.headers().unwrap();
    assert_eq!(headers["total-results"], vec!["3"]);
    assert_eq!(headers["zotero-api-version"], vec!["3"]);

    // Step 2: versions of every item.
    let mut api = client(addr);
    api.user(12345)
        .and_then(|a| a.items())
        .and_then(|a| a.versions())
        .and_then(|a| a.send())
        .unwrap();
    let versions = api.body().unwrap();
    assert_eq!(versions["BCDE3456"], 9);

    // Step 3: a single item, decoded into a typed value.
    #[derive(serde::Deserialize)]
    struct Item {
        key: String,
        #[serde(rename = "parentItem")]
        parent_item: Option<String>,
    }
    let mut api = client(addr);
    api.user(12345)
        .and_then(|a| a.item("CDEF4567"))
        .and_then(|a| a.send())
        .unwrap();
    let item: Item = api.body_as().unwrap();
    assert_eq!(item.key, "CDEF4567");
    assert_eq!(item.parent_item.as_deref(), Some("BCDE3456"));

    // Step 4: key information; the requested API version is echoed back.
    let mut api = client(addr);
    api.set_version(2);
    api.key("abc123").and_then(|a| a.send()).unwrap();
    assert_eq!(api.body().unwrap()["userID"], 12345);
    assert_eq!(api.headers().unwrap()["zotero-api-version"], vec!["2"]);

    // Step 5: raw path.
    let mut api = client(addr);
    api.raw("groups/6789/collections").and_then(|a| a.send()).unwrap();
    assert!(api.json().unwrap().contains("Reading list"));
}

#[test]
fn non_success_status_propagates_from_transport() {
    let addr = start_server();

    let mut api = client(addr);
    api.user(12345).and_then(|a| a.item("ZZZZ9999")).unwrap();
    let err = api.send().unwrap_err();
    assert!(matches!(err, ZoteroError::Http(ureq::Error::StatusCode(404))));
    assert!(matches!(api.body(), Err(ZoteroError::BadMethodCall(_))));
}

#[test]
fn missing_bearer_token_is_forbidden() {
    let addr = start_server();

    let config = ClientConfig {
        base_url: format!("http://{addr}"),
        ..ClientConfig::default()
    };
    let mut api = ZoteroApi::with_config("", config);
    api.user(1).and_then(|a| a.items()).unwrap();
    let err = api.send().unwrap_err();
    assert!(matches!(err, ZoteroError::Http(ureq::Error::StatusCode(403))));
}

#[test]
fn body_larger_than_ten_mib_is_read_whole() {
    let mut body = String::from("{");
    for i in 0..800_000 {
        write!(body, "\"K{i:07}\":{i},").unwrap();
    }
    body.pop();
    body.push('}');
    assert!(body.len() > 11 * 1024 * 1024);
    let addr = serve_once(body.clone().into_bytes());

    let mut api = client(addr);
    api.user(1)
        .and_then(|a| a.items())
        .and_then(|a| a.versions())
        .and_then(|a| a.send())
        .unwrap();
    assert_eq!(api.status_code().unwrap(), 200);
    assert_eq!(api.json().unwrap().len(), body.len());
    let versions = api.body().unwrap();
    assert_eq!(versions.as_object().unwrap().len(), 800_000);
    assert_eq!(versions["K0799999"], 799_999);
}

#[test]
fn non_utf8_body_is_stored_lossily() {
    let addr = serve_once(vec![0xff, 0xfe, b'x']);

    let mut api = client(addr);
    api.user(1).and_then(|a| a.items()).and_then(|a| a.send()).unwrap();
    assert_eq!(api.status_code().unwrap(), 200);
    assert_eq!(api.json().unwrap(), "\u{FFFD}\u{FFFD}x");
    assert!(matches!(api.body(), Err(ZoteroError::Json(_))));
}

#[test]
fn reason_phrase_is_canonical_for_the_status() {
    let addr = serve_once_with_status("200 Everything Fine", b"[]".to_vec());

    let mut api = client(addr);
    api.user(1).and_then(|a| a.items()).and_then(|a| a.send()).unwrap();
    assert_eq!(api.status_code().unwrap(), 200);
    assert_eq!(api.reason_phrase().unwrap(), "OK");
}
