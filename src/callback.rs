//! Decoding of gateway callbacks
//!
//! The gateway POSTs the full status record to the `callbackUrl` of a payment
//! request or refund whenever it reaches a final state.

use crate::types::StatusRecord;
use crate::Result;
use tracing::debug;

/// Decode a callback body
pub fn parse_callback(body: &[u8]) -> Result<StatusRecord> {
    let record: StatusRecord = serde_json::from_slice(body)?;
    debug!(
        id = %record.id,
        status = %record.status,
        refund = is_refund(&record),
        "Decoded callback"
    );
    Ok(record)
}

/// Whether a record describes a refund rather than a payment request
pub fn is_refund(record: &StatusRecord) -> bool {
    record.original_payment_reference.is_some()
}
