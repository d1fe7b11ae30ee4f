//! Mutual TLS against a local gateway that demands a client certificate

mod common;

use common::*;
use openssl::ssl::{SslAcceptor, SslFiletype, SslMethod, SslVerifyMode};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use swish::{ClientConfig, SwishClient, SwishError, TransactionStatus};

const STRANGER_BUNDLE: &[u8] = include_bytes!("fixtures/stranger.p12");
const OTHER_CA_PEM: &[u8] = include_bytes!("fixtures/other_ca.pem");

const STATUS_BODY: &str = r#"{"id": "AB23D7406ECE4542A80152D909EF9F6B", "payeeAlias": "1234679304", "amount": 100.00, "currency": "SEK", "status": "PAID", "datePaid": "2019-04-04T13:53:01.321Z"}"#;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Start an HTTPS gateway that only completes handshakes with clients whose
/// certificate chains to the fixture CA. Returns its base URL.
fn start_gateway() -> String {
    let mut acceptor = SslAcceptor::mozilla_intermediate_v5(SslMethod::tls()).unwrap();
    acceptor
        .set_certificate_chain_file(fixture("gateway.pem"))
        .unwrap();
    acceptor
        .set_private_key_file(fixture("gateway.key"), SslFiletype::PEM)
        .unwrap();
    acceptor.set_ca_file(fixture("ca.pem")).unwrap();
    acceptor.set_verify(SslVerifyMode::PEER | SslVerifyMode::FAIL_IF_NO_PEER_CERT);
    let acceptor = Arc::new(acceptor.build());

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            let acceptor = Arc::clone(&acceptor);
            thread::spawn(move || {
                // Rejected handshakes end here
                let Ok(mut tls) = acceptor.accept(stream) else {
                    return;
                };

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match tls.read(&mut buf) {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    STATUS_BODY.len(),
                    STATUS_BODY
                );
                let _ = tls.write_all(response.as_bytes());
                let _ = tls.shutdown();
            });
        }
    });

    format!("https://127.0.0.1:{}", port)
}

#[tokio::test]
async fn test_handshake_with_merchant_certificate() {
    let base_url = start_gateway();
    let client = client_for(&base_url);

    let record = client
        .payment_request_status("AB23D7406ECE4542A80152D909EF9F6B")
        .await
        .unwrap();

    assert!(record.is_paid());
    assert_eq!(record.status, TransactionStatus::Paid);
    assert_eq!(record.amount.to_string(), "100.00");
}

#[tokio::test]
async fn test_handshake_rejects_untrusted_gateway() {
    let base_url = start_gateway();
    init_tracing();
    let client = SwishClient::new(
        test_config()
            .with_ca_pem(OTHER_CA_PEM)
            .with_base_url(&base_url),
    )
    .unwrap();

    let error = client.payment_request_status("T1").await.unwrap_err();
    assert!(
        matches!(error, SwishError::Http(_)),
        "gateway outside the CA pool MUST fail the handshake - actual: {:?}",
        error
    );
}

#[tokio::test]
async fn test_handshake_rejects_unknown_merchant() {
    let base_url = start_gateway();
    init_tracing();
    let config = ClientConfig {
        certificate: STRANGER_BUNDLE.to_vec(),
        ..test_config()
    };
    let client = SwishClient::new(config.with_base_url(&base_url)).unwrap();

    let error = client.payment_request_status("T2").await.unwrap_err();
    assert!(
        matches!(error, SwishError::Http(_)),
        "certificate from another CA MUST be refused - actual: {:?}",
        error
    );
}

#[tokio::test]
async fn test_gateway_requires_client_certificate() {
    let base_url = start_gateway();
    let ca = reqwest::Certificate::from_pem(CA_PEM).unwrap();
    let anonymous = reqwest::Client::builder()
        .use_native_tls()
        .tls_built_in_root_certs(false)
        .add_root_certificate(ca)
        .build()
        .unwrap();

    let url = format!("{}/swish-cpcapi/api/v2/paymentrequests/T3", base_url);
    assert!(anonymous.get(url).send().await.is_err());
}
