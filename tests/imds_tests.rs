// Copyright (c) 2025 - Cowboy AI, Inc.
//! IMDS Adapter Tests
//!
//! Runs `ImdsClient` against a minimal HTTP/1.1 metadata stub on a local
//! port.

use cim_hostname::adapters::{IdentitySource, ImdsClient, ImdsConfig};
use cim_hostname::IdentityError;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const TOKEN: &str = "test-session-token";
const DOCUMENT: &str = r#"{"instanceId": "i-0abc123", "region": "us-east-1", "privateIp": "10.0.0.5"}"#;

/// Route table keyed by `"<METHOD> <path>"`
type Routes = HashMap<&'static str, (u16, &'static str)>;

struct Stub {
    routes: Routes,
    /// GETs must carry this token
    required_token: Option<&'static str>,
}

async fn start(stub: Stub) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let stub = Arc::new(stub);

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(handle(stream, stub.clone()));
        }
    });

    format!("http://{}", addr)
}

async fn handle(mut stream: TcpStream, stub: Arc<Stub>) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let request = String::from_utf8_lossy(&request).to_lowercase();
    let mut request_line = request.lines().next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_uppercase();
    let path = request_line.next().unwrap_or_default().to_string();
    let token = request
        .lines()
        .find_map(|line| line.strip_prefix("x-aws-ec2-metadata-token:"))
        .map(str::trim);

    let (status, body) = match (method.as_str(), stub.required_token) {
        ("GET", Some(required)) if token != Some(&required.to_lowercase()[..]) => (401, ""),
        _ => stub
            .routes
            .get(format!("{} {}", method, path).as_str())
            .copied()
            .unwrap_or((404, "")),
    };

    let response = format!(
        "HTTP/1.1 {} STUB\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn client(endpoint: String) -> ImdsClient {
    ImdsClient::new(ImdsConfig {
        endpoint,
        timeout_secs: 2,
        ..Default::default()
    })
    .unwrap()
}

fn metadata_routes() -> Routes {
    HashMap::from([
        ("GET /latest/meta-data/instance-id", (200, "i-0abc123\n")),
        ("GET /latest/meta-data/local-ipv4", (200, "10.0.0.5")),
        ("GET /latest/dynamic/instance-identity/document", (200, DOCUMENT)),
    ])
}

#[tokio::test]
async fn test_resolve_with_session_token() {
    let mut routes = metadata_routes();
    routes.insert("PUT /latest/api/token", (200, TOKEN));
    let endpoint = start(Stub {
        routes,
        required_token: Some(TOKEN),
    })
    .await;

    let identity = client(endpoint).resolve().await.unwrap();

    assert_eq!(identity.id(), "i-0abc123");
    assert_eq!(identity.region(), "us-east-1");
    assert_eq!(
        identity.primary_address(),
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5))
    );
}

#[tokio::test]
async fn test_resolve_falls_back_without_token_endpoint() {
    let endpoint = start(Stub {
        routes: metadata_routes(),
        required_token: None,
    })
    .await;

    let identity = client(endpoint).resolve().await.unwrap();

    assert_eq!(identity.id(), "i-0abc123");
}

#[tokio::test]
async fn test_region_from_placement_when_document_missing() {
    let mut routes = metadata_routes();
    routes.remove("GET /latest/dynamic/instance-identity/document");
    routes.insert("GET /latest/meta-data/placement/region", (200, "us-west-2"));
    let endpoint = start(Stub {
        routes,
        required_token: None,
    })
    .await;

    let identity = client(endpoint).resolve().await.unwrap();

    assert_eq!(identity.region(), "us-west-2");
}

#[tokio::test]
async fn test_missing_instance_id() {
    let mut routes = metadata_routes();
    routes.remove("GET /latest/meta-data/instance-id");
    let endpoint = start(Stub {
        routes,
        required_token: None,
    })
    .await;

    assert_eq!(
        client(endpoint).resolve().await,
        Err(IdentityError::MissingField("instance-id"))
    );
}

#[tokio::test]
async fn test_empty_address_is_missing() {
    let mut routes = metadata_routes();
    routes.insert("GET /latest/meta-data/local-ipv4", (200, "  \n"));
    let endpoint = start(Stub {
        routes,
        required_token: None,
    })
    .await;

    assert_eq!(
        client(endpoint).resolve().await,
        Err(IdentityError::MissingField("local-ipv4"))
    );
}

#[tokio::test]
async fn test_malformed_address() {
    let mut routes = metadata_routes();
    routes.insert("GET /latest/meta-data/local-ipv4", (200, "not-an-ip"));
    let endpoint = start(Stub {
        routes,
        required_token: None,
    })
    .await;

    assert!(matches!(
        client(endpoint).resolve().await,
        Err(IdentityError::InvalidAddress(_))
    ));
}

#[tokio::test]
async fn test_server_error_is_unreachable() {
    let mut routes = metadata_routes();
    routes.insert("GET /latest/meta-data/instance-id", (500, "boom"));
    let endpoint = start(Stub {
        routes,
        required_token: None,
    })
    .await;

    assert!(matches!(
        client(endpoint).resolve().await,
        Err(IdentityError::Unreachable { .. })
    ));
}
