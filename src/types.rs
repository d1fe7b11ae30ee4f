//! Request, response and status types for the Swish v2 API

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Currency codes accepted by the gateway
pub mod currency {
    /// Swedish krona, the only currency the gateway currently settles in
    pub const SEK: &str = "SEK";
}

/// Error entry returned by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Short error code, e.g. "RP03"
    #[serde(rename = "errorCode")]
    pub error_code: String,
    /// Description of what went wrong
    #[serde(rename = "errorMessage", default)]
    pub error_message: String,
    /// Additional information about the error
    #[serde(
        rename = "additionalInformation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_information: Option<String>,
}

impl ApiError {
    /// Create a new error entry
    pub fn new(error_code: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            error_message: error_message.into(),
            additional_information: None,
        }
    }

    /// The fixed entry reported when the gateway answers 403
    pub fn payee_alias_mismatch() -> Self {
        Self::new(
            "PA01",
            "The payeeAlias in the payment request object is not the same as merchant’s Swish number",
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code, self.error_message)
    }
}

/// Identifier of a payment request or refund.
///
/// The gateway expects 32 uppercase hexadecimal characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstructionId(String);

impl InstructionId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string().to_uppercase())
    }

    /// Bring a caller-supplied identifier into gateway shape (dashes dropped, uppercase)
    pub fn normalize(id: &str) -> Self {
        Self(id.chars().filter(|c| *c != '-').collect::<String>().to_uppercase())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for InstructionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstructionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<InstructionId> for String {
    fn from(id: InstructionId) -> Self {
        id.0
    }
}

/// Payment request sent to the gateway.
///
/// The instruction id travels in the URL path and is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Identifier of the payment request, placed in the URL path
    #[serde(skip)]
    pub instruction_id: String,
    /// HTTPS endpoint the gateway notifies with status updates
    #[serde(rename = "callbackUrl")]
    pub callback_url: String,
    /// Swish number receiving the payment
    #[serde(rename = "payeeAlias")]
    pub payee_alias: String,
    /// Amount as a decimal string, e.g. "100.01"
    pub amount: String,
    /// ISO 4217 currency code
    pub currency: String,
    /// Merchant reference such as an order id
    #[serde(
        rename = "payeePaymentReference",
        skip_serializing_if = "Option::is_none"
    )]
    pub payee_payment_reference: Option<String>,
    /// Registered phone number of the payer (e-commerce flow)
    #[serde(rename = "payerAlias", skip_serializing_if = "Option::is_none")]
    pub payer_alias: Option<String>,
    /// Social security number the payer alias must be registered to
    #[serde(rename = "payerSSN", skip_serializing_if = "Option::is_none")]
    pub payer_ssn: Option<String>,
    /// Minimum payer age in years
    #[serde(rename = "payerAgeLimit", skip_serializing_if = "Option::is_none")]
    pub payer_age_limit: Option<String>,
    /// Message shown to the payer, max 50 chars
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PaymentRequest {
    /// Create a new payment request with the required fields
    pub fn new(
        instruction_id: impl Into<String>,
        callback_url: impl Into<String>,
        payee_alias: impl Into<String>,
        amount: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            instruction_id: instruction_id.into(),
            callback_url: callback_url.into(),
            payee_alias: payee_alias.into(),
            amount: amount.into(),
            currency: currency.into(),
            payee_payment_reference: None,
            payer_alias: None,
            payer_ssn: None,
            payer_age_limit: None,
            message: None,
        }
    }

    /// Set the merchant payment reference
    pub fn with_payee_payment_reference(mut self, reference: impl Into<String>) -> Self {
        self.payee_payment_reference = Some(reference.into());
        self
    }

    /// Set the payer alias
    pub fn with_payer_alias(mut self, alias: impl Into<String>) -> Self {
        self.payer_alias = Some(alias.into());
        self
    }

    /// Set the social security number the payer alias must match
    pub fn with_payer_ssn(mut self, ssn: impl Into<String>) -> Self {
        self.payer_ssn = Some(ssn.into());
        self
    }

    /// Set the minimum payer age in years
    pub fn with_payer_age_limit(mut self, years: u8) -> Self {
        self.payer_age_limit = Some(years.to_string());
        self
    }

    /// Set the message shown to the payer
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Get the amount as a decimal
    pub fn amount_as_decimal(&self) -> crate::Result<Decimal> {
        parse_amount(&self.amount)
    }
}

/// Refund of a previously paid payment request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequest {
    /// Identifier of the refund, placed in the URL path. Must differ from the payment's.
    #[serde(skip)]
    pub instruction_id: String,
    /// Payment reference of the original payment
    #[serde(rename = "originalPaymentReference")]
    pub original_payment_reference: String,
    /// HTTPS endpoint the gateway notifies with the refund outcome
    #[serde(rename = "callbackUrl")]
    pub callback_url: String,
    /// Swish number of the merchant making the refund
    #[serde(rename = "payerAlias")]
    pub payer_alias: String,
    /// Amount as a decimal string; cannot exceed what remains of the original payment
    pub amount: String,
    /// ISO 4217 currency code
    pub currency: String,
    /// Merchant reference such as an order id
    #[serde(
        rename = "payerPaymentReference",
        skip_serializing_if = "Option::is_none"
    )]
    pub payer_payment_reference: Option<String>,
    /// Message about the refund, max 50 chars
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RefundRequest {
    /// Create a new refund request with the required fields
    pub fn new(
        instruction_id: impl Into<String>,
        original_payment_reference: impl Into<String>,
        callback_url: impl Into<String>,
        payer_alias: impl Into<String>,
        amount: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            instruction_id: instruction_id.into(),
            original_payment_reference: original_payment_reference.into(),
            callback_url: callback_url.into(),
            payer_alias: payer_alias.into(),
            amount: amount.into(),
            currency: currency.into(),
            payer_payment_reference: None,
            message: None,
        }
    }

    /// Set the merchant payment reference
    pub fn with_payer_payment_reference(mut self, reference: impl Into<String>) -> Self {
        self.payer_payment_reference = Some(reference.into());
        self
    }

    /// Set the message about the refund
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Get the amount as a decimal
    pub fn amount_as_decimal(&self) -> crate::Result<Decimal> {
        parse_amount(&self.amount)
    }
}

fn parse_amount(amount: &str) -> crate::Result<Decimal> {
    Decimal::from_str(amount).map_err(|_| crate::SwishError::InvalidAmount {
        value: amount.to_string(),
    })
}

/// State of a payment request or refund as reported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Created,
    Paid,
    Declined,
    Error,
    /// Reported for cancelled payment requests
    Cancelled,
    /// Reported for refunds debited from the merchant account
    Debited,
    #[serde(other)]
    Unknown,
}

impl TransactionStatus {
    /// Whether the gateway will report no further transitions
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Self::Paid | Self::Declined | Self::Error | Self::Cancelled
        )
    }

    /// Get the status string as the gateway spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Paid => "PAID",
            Self::Declined => "DECLINED",
            Self::Error => "ERROR",
            Self::Cancelled => "CANCELLED",
            Self::Debited => "DEBITED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gateway view of a payment request or refund
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Instruction id the request was created with
    pub id: String,
    /// Merchant reference of a payment request
    #[serde(
        rename = "payeePaymentReference",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub payee_payment_reference: Option<String>,
    /// Bank payment reference, only present once paid
    #[serde(
        rename = "paymentReference",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_reference: Option<String>,
    /// Payment reference a refund applies to
    #[serde(
        rename = "originalPaymentReference",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub original_payment_reference: Option<String>,
    /// Merchant reference of a refund
    #[serde(
        rename = "payerPaymentReference",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub payer_payment_reference: Option<String>,
    #[serde(rename = "callbackUrl", default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(rename = "payerAlias", default, skip_serializing_if = "Option::is_none")]
    pub payer_alias: Option<String>,
    #[serde(rename = "payerSSN", default, skip_serializing_if = "Option::is_none")]
    pub payer_ssn: Option<String>,
    #[serde(rename = "payeeAlias", default, skip_serializing_if = "Option::is_none")]
    pub payee_alias: Option<String>,
    /// Amount as the gateway wrote it, trailing zeros included
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: TransactionStatus,
    #[serde(rename = "dateCreated", default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<DateTime<Utc>>,
    /// Only present once paid
    #[serde(rename = "datePaid", default, skip_serializing_if = "Option::is_none")]
    pub date_paid: Option<DateTime<Utc>>,
    /// Only present when status is ERROR
    #[serde(rename = "errorCode", default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(rename = "errorMessage", default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(
        rename = "additionalInformation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_information: Option<String>,
}

impl StatusRecord {
    /// Whether the payment or refund went through
    pub fn is_paid(&self) -> bool {
        self.status == TransactionStatus::Paid
    }

    /// The error the gateway attached to the record, if any
    pub fn api_error(&self) -> Option<ApiError> {
        self.error_code.as_ref().map(|code| ApiError {
            error_code: code.clone(),
            error_message: self.error_message.clone().unwrap_or_default(),
            additional_information: self.additional_information.clone(),
        })
    }
}

/// Result of creating a payment request.
///
/// Both values arrive in response headers, the body is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequestCreated {
    /// URL to GET for the status of the payment request (`Location` header)
    pub location: String,
    /// Token for opening the Swish app (`PaymentRequestToken` header), m-commerce only
    pub token: Option<String>,
}

/// Result of creating a refund, carried in the `Location` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundCreated {
    /// URL to GET for the status of the refund
    pub location: String,
}
