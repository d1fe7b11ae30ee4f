//! # swish - Swish merchant payment gateway client
//!
//! Creates payment requests and refunds against the Swish v2 API and reads
//! back their status. Every call is a single HTTPS round trip authenticated
//! with the merchant's PKCS#12 certificate bundle and a pinned CA.
//!
//! ```no_run
//! use swish::{currency, ClientConfig, Environment, InstructionId, PaymentRequest, SwishClient};
//!
//! # async fn run(bundle: Vec<u8>, ca: String) -> swish::Result<()> {
//! let client = SwishClient::new(
//!     ClientConfig::new(bundle, "swish", ca).with_environment(Environment::Test),
//! )?;
//!
//! let request = PaymentRequest::new(
//!     InstructionId::new(),
//!     "https://example.com/callback",
//!     "1234679304",
//!     "100.00",
//!     currency::SEK,
//! );
//! let created = client.create_payment_request(&request).await?;
//! let status = client.status(&created.location).await?;
//! println!("{}", status.status);
//! # Ok(())
//! # }
//! ```

pub mod callback;
pub mod cancel;
pub mod client;
pub mod config;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use client::SwishClient;
pub use config::{ClientConfig, Environment};
pub use error::{Result, SwishError};
pub use types::*;

/// Current version of the swish library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_reexports() {
        assert_eq!(currency::SEK, "SEK");
        assert_eq!(Environment::default(), Environment::Production);
        assert_eq!(client::API_PATH.join("/"), "swish-cpcapi/api/v2");
    }
}
