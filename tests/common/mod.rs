//! Shared helpers for the integration tests

#![allow(dead_code)]

use std::time::Duration;
use swish::{ClientConfig, Environment, SwishClient};

pub const BUNDLE: &[u8] = include_bytes!("../fixtures/merchant.p12");
pub const CA_PEM: &[u8] = include_bytes!("../fixtures/ca.pem");
pub const PASSPHRASE: &str = "swish";

pub const PAYEE_ALIAS: &str = "1234679304";
pub const CALLBACK_URL: &str = "https://example.com/api/swishcb/paymentrequests";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn test_config() -> ClientConfig {
    ClientConfig::new(BUNDLE, PASSPHRASE, "")
        .with_ca_pem(CA_PEM)
        .with_environment(Environment::Test)
        .with_timeout(Duration::from_secs(5))
}

/// Client pointed at a stand-in gateway
pub fn client_for(base_url: &str) -> SwishClient {
    init_tracing();
    SwishClient::new(test_config().with_base_url(base_url)).unwrap()
}

pub fn payment_path(instruction_id: &str) -> String {
    format!("/swish-cpcapi/api/v2/paymentrequests/{}", instruction_id)
}

pub fn refund_path(instruction_id: &str) -> String {
    format!("/swish-cpcapi/api/v2/refunds/{}", instruction_id)
}
