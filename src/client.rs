//! Mutually authenticated HTTP client for the Swish gateway

use crate::config::ClientConfig;
use crate::types::*;
use crate::{Result, SwishError};
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Certificate, Client, Identity, Response, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

/// Path of the v2 API below the base URL
pub const API_PATH: [&str; 3] = ["swish-cpcapi", "api", "v2"];

const PAYMENT_REQUESTS: &str = "paymentrequests";
const REFUNDS: &str = "refunds";

/// Response header carrying the m-commerce token
pub const PAYMENT_REQUEST_TOKEN: &str = "paymentrequesttoken";

/// Client for creating payment requests and refunds and reading their status.
///
/// Holds no mutable state after construction. Clones share the connection pool
/// and can be used from any number of tasks at once.
#[derive(Debug, Clone)]
pub struct SwishClient {
    /// Underlying HTTP client carrying the merchant identity and CA pool
    client: Client,
    /// Base URL of the gateway
    base_url: Url,
}

impl SwishClient {
    /// Create a new client.
    ///
    /// Fails with [`SwishError::Config`] when the certificate bundle cannot be
    /// opened with the passphrase or the CA is not valid base64 PEM.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let identity = Identity::from_pkcs12_der(&config.certificate, &config.passphrase)
            .map_err(|e| SwishError::config(format!("Failed to decode certificate bundle: {}", e)))?;

        let ca_pem = config
            .ca_pem()
            .map_err(|e| SwishError::config(format!("Failed to decode CA certificate: {}", e)))?;
        let ca_certificates = parse_ca_certificates(&ca_pem)?;

        let mut client_builder = Client::builder()
            .use_native_tls()
            .tls_built_in_root_certs(false)
            .identity(identity);

        // Zero leaves requests unbounded
        if !config.timeout.is_zero() {
            client_builder = client_builder.timeout(config.timeout);
        }

        let client = ca_certificates
            .into_iter()
            .fold(client_builder, |builder, certificate| {
                builder.add_root_certificate(certificate)
            })
            .build()
            .map_err(|e| SwishError::config(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = Url::parse(config.base_url())?;
        if base_url.cannot_be_a_base() {
            return Err(SwishError::config(format!(
                "Base URL cannot carry a path: {}",
                base_url
            )));
        }

        debug!(
            environment = config.environment.as_str(),
            base_url = %base_url,
            timeout = ?config.timeout,
            "Created Swish client"
        );

        Ok(Self { client, base_url })
    }

    /// Get the base URL of the gateway
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Create a payment request.
    ///
    /// Sends `PUT {base}/swish-cpcapi/api/v2/paymentrequests/{instruction_id}`.
    /// On success the gateway answers with an empty body; the status location
    /// and the m-commerce token are taken from the response headers.
    pub async fn create_payment_request(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentRequestCreated> {
        let url = self.endpoint(PAYMENT_REQUESTS, &request.instruction_id)?;
        debug!(%url, instruction_id = %request.instruction_id, "Creating payment request");

        let response = self.put_json(url, request).await?;
        if !response.status().is_success() {
            return Err(creation_error(response).await);
        }

        let location = location_header(response.headers())?;
        let token = header_value(response.headers(), PAYMENT_REQUEST_TOKEN);

        info!(
            instruction_id = %request.instruction_id,
            %location,
            has_token = token.is_some(),
            "Payment request created"
        );

        Ok(PaymentRequestCreated { location, token })
    }

    /// Refund all or part of a paid payment request.
    ///
    /// Sends `PUT {base}/swish-cpcapi/api/v2/refunds/{instruction_id}`.
    pub async fn create_refund(&self, request: &RefundRequest) -> Result<RefundCreated> {
        let url = self.endpoint(REFUNDS, &request.instruction_id)?;
        debug!(%url, instruction_id = %request.instruction_id, "Creating refund");

        let response = self.put_json(url, request).await?;
        if !response.status().is_success() {
            return Err(creation_error(response).await);
        }

        let location = location_header(response.headers())?;
        info!(instruction_id = %request.instruction_id, %location, "Refund created");

        Ok(RefundCreated { location })
    }

    /// Fetch the status behind a `Location` returned on creation.
    ///
    /// Single shot; call again to poll.
    pub async fn status(&self, location: &str) -> Result<StatusRecord> {
        let url = Url::parse(location)?;
        debug!(%url, "Fetching status");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(SwishError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(SwishError::from_transport)?;

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        if status == StatusCode::NOT_FOUND {
            let errors = decode_api_errors(&body)?;
            warn!(
                location,
                code = errors.first().map(|e| e.error_code.as_str()),
                "Status lookup found nothing"
            );
            return Err(SwishError::NotFound { errors });
        }

        warn!(location, status = status.as_u16(), "Unexpected status on lookup");
        Err(SwishError::unexpected_status(status.as_u16(), body))
    }

    /// Status location of a payment request, as the gateway reports it on creation
    pub fn payment_request_location(&self, instruction_id: &str) -> Result<String> {
        Ok(self.endpoint(PAYMENT_REQUESTS, instruction_id)?.into())
    }

    /// Status location of a refund, as the gateway reports it on creation
    pub fn refund_location(&self, instruction_id: &str) -> Result<String> {
        Ok(self.endpoint(REFUNDS, instruction_id)?.into())
    }

    /// Fetch the status of a payment request by its instruction id
    pub async fn payment_request_status(&self, instruction_id: &str) -> Result<StatusRecord> {
        let location = self.payment_request_location(instruction_id)?;
        self.status(&location).await
    }

    /// Fetch the status of a refund by its instruction id
    pub async fn refund_status(&self, instruction_id: &str) -> Result<StatusRecord> {
        let location = self.refund_location(instruction_id)?;
        self.status(&location).await
    }

    fn endpoint(&self, collection: &str, instruction_id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SwishError::config("Base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(API_PATH)
            .push(collection)
            .push(instruction_id);
        Ok(url)
    }

    async fn put_json<T: serde::Serialize>(&self, url: Url, body: &T) -> Result<Response> {
        self.client
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(SwishError::from_transport)
    }
}

/// Map a non-success answer to a create call
async fn creation_error(response: Response) -> SwishError {
    let status = response.status();

    if status == StatusCode::FORBIDDEN {
        warn!("Gateway rejected payee alias");
        return SwishError::AliasMismatch {
            errors: vec![ApiError::payee_alias_mismatch()],
        };
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return SwishError::from_transport(e),
    };

    if status == StatusCode::UNPROCESSABLE_ENTITY {
        return match decode_api_errors(&body) {
            Ok(errors) => {
                warn!(
                    codes = ?errors.iter().map(|e| e.error_code.as_str()).collect::<Vec<_>>(),
                    "Gateway rejected request"
                );
                SwishError::Validation { errors }
            }
            Err(e) => e,
        };
    }

    warn!(status = status.as_u16(), "Unexpected status on create");
    SwishError::unexpected_status(status.as_u16(), body)
}

fn decode_api_errors(body: &str) -> Result<Vec<ApiError>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(body)?)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn location_header(headers: &HeaderMap) -> Result<String> {
    header_value(headers, LOCATION.as_str()).ok_or_else(|| SwishError::missing_header("Location"))
}

/// Split a PEM bundle into certificates
fn parse_ca_certificates(pem: &[u8]) -> Result<Vec<Certificate>> {
    let certificates = Certificate::from_pem_bundle(pem)
        .map_err(|e| SwishError::config(format!("Invalid CA certificate: {}", e)))?;

    if certificates.is_empty() {
        return Err(SwishError::config("CA contains no certificates"));
    }

    Ok(certificates)
}
