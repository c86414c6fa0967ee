//! Error types for the PayPal NVP client.
//!
//! Three error classes exist and are never conflated:
//!
//! - **Usage errors** ([`PaypalError::NotConfigured`] through
//!   [`PaypalError::MissingChargeField`]): caller mistakes detected before
//!   any network I/O. No request is sent.
//! - **Provider errors** ([`PaypalError::Provider`]): PayPal answered with a
//!   non-success `ACK`. The decoded first-error detail rides along.
//! - **Transport errors** ([`PaypalError::Transport`]): the HTTP round-trip
//!   itself failed (connect, TLS, timeout, non-2xx status).
//!
//! [`PaypalError::Malformed`] covers the narrow protocol corner of a
//! success response missing a promised field.

use std::fmt;

use thiserror::Error;

/// Result type alias for NVP client operations.
pub type Result<T> = std::result::Result<T, PaypalError>;

/// Errors that can occur while driving the NVP API.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum PaypalError {
    /// No API credentials were supplied at construction.
    ///
    /// The client is still usable for pure helpers such as
    /// [`redirect_url`](crate::PaypalClient::redirect_url), but every API
    /// operation fails with this error before touching the network.
    #[error(
        "PayPal credentials are not configured; supply user, password and signature before calling the API"
    )]
    NotConfigured,

    /// No checkout token is available, neither explicitly nor cached.
    ///
    /// Run `SetExpressCheckout` first, or pass the token returned by an
    /// earlier checkout. No money has been charged.
    #[error("no checkout TOKEN is available to continue the PayPal payment; no money has been charged")]
    MissingToken,

    /// The payer id from PayPal's redirect back to the return URL is missing.
    #[error("no PAYERID is available to complete the PayPal payment; no money has been charged")]
    MissingPayerId,

    /// A partial refund was requested without amount and currency.
    #[error("a partial refund requires refund terms (amount and currency)")]
    MissingRefundTerms,

    /// A refund type string outside `Full` / `Partial`.
    #[error("refund type must be \"Full\" or \"Partial\", got {0:?}")]
    InvalidRefundType(String),

    /// A card type string outside the supported set.
    #[error(
        "card type must be one of Visa, MasterCard, Discover, Amex, Maestro or Solo, got {0:?}"
    )]
    InvalidCardType(String),

    /// A card expiry that is not exactly six digits (`MMYYYY`).
    #[error("card expiry must be exactly six digits in MMYYYY format, got {0:?}")]
    InvalidExpiry(String),

    /// A required direct-payment field is absent from the extra parameters.
    #[error("direct payment requires the {0} parameter")]
    MissingChargeField(&'static str),

    /// PayPal decoded the request but answered with a non-success `ACK`.
    #[error("{0}")]
    Provider(ProviderFailure),

    /// A success response that is missing a field the protocol promises.
    #[error("malformed NVP response: {0}")]
    Malformed(String),

    /// The HTTP round-trip failed before an NVP response was obtained.
    #[error("transport error while calling the NVP endpoint: {0}")]
    Transport(#[from] reqwest::Error),
}

/// First-error detail extracted from a failure response.
///
/// PayPal reports errors as indexed parameter groups; only the first group
/// (`L_ERRORCODE0` and friends) is surfaced, matching the wire convention.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorDetail {
    /// `L_ERRORCODE0`.
    pub code: Option<String>,
    /// `L_SHORTMESSAGE0`.
    pub short_message: Option<String>,
    /// `L_LONGMESSAGE0`.
    pub long_message: Option<String>,
    /// `CORRELATIONID`, useful when contacting PayPal support.
    pub correlation_id: Option<String>,
}

impl ErrorDetail {
    /// Most descriptive message available: long, then short, then the bare
    /// error code.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.long_message
            .as_deref()
            .or(self.short_message.as_deref())
            .or(self.code.as_deref())
    }

    /// True when the response carried no recognizable error fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.short_message.is_none() && self.long_message.is_none()
    }
}

/// A non-success `ACK` answer from the provider.
#[derive(Debug, Clone)]
pub struct ProviderFailure {
    /// The NVP method that was rejected (e.g. `SetExpressCheckout`).
    pub operation: &'static str,
    /// The raw `ACK` value, absent when the response carried none.
    pub ack: Option<String>,
    /// First-error detail fields, possibly empty.
    pub detail: ErrorDetail,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PayPal rejected {} (ACK={})",
            self.operation,
            self.ack.as_deref().unwrap_or("<missing>")
        )?;
        match self.detail.message() {
            Some(message) => write!(f, ": {message}"),
            None => write!(f, ": no error detail provided"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_error_display() {
        let error = PaypalError::InvalidRefundType("Half".to_owned());
        assert_eq!(
            error.to_string(),
            "refund type must be \"Full\" or \"Partial\", got \"Half\""
        );
    }

    #[test]
    fn test_missing_charge_field_display() {
        let error = PaypalError::MissingChargeField("IPADDRESS");
        assert_eq!(error.to_string(), "direct payment requires the IPADDRESS parameter");
    }

    #[test]
    fn test_error_detail_message_preference() {
        let detail = ErrorDetail {
            code: Some("10007".to_owned()),
            short_message: Some("Permission denied".to_owned()),
            long_message: Some("You do not have permission to refund this transaction".to_owned()),
            correlation_id: None,
        };
        assert_eq!(
            detail.message(),
            Some("You do not have permission to refund this transaction")
        );

        let detail = ErrorDetail { long_message: None, ..detail };
        assert_eq!(detail.message(), Some("Permission denied"));
    }

    #[test]
    fn test_error_detail_empty() {
        assert!(ErrorDetail::default().is_empty());
        assert!(ErrorDetail::default().message().is_none());
    }

    #[test]
    fn test_provider_failure_display() {
        let failure = ProviderFailure {
            operation: "RefundTransaction",
            ack: Some("Failure".to_owned()),
            detail: ErrorDetail {
                code: Some("10007".to_owned()),
                short_message: Some("Permission denied".to_owned()),
                long_message: None,
                correlation_id: Some("3d8fa24c46c65".to_owned()),
            },
        };
        assert_eq!(
            failure.to_string(),
            "PayPal rejected RefundTransaction (ACK=Failure): Permission denied"
        );
    }

    #[test]
    fn test_provider_failure_display_without_detail() {
        let failure = ProviderFailure {
            operation: "DoDirectPayment",
            ack: None,
            detail: ErrorDetail::default(),
        };
        assert_eq!(
            failure.to_string(),
            "PayPal rejected DoDirectPayment (ACK=<missing>): no error detail provided"
        );
    }
}
