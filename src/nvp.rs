//! NVP wire codec: ordered request forms and decoded responses.
//!
//! Both request and response travel as URL-encoded key/value text. One
//! encoder and one decoder serve every operation; lookups return the first
//! value seen for a key.

use url::form_urlencoded;

use crate::error::ErrorDetail;

/// Ordered request parameter list.
///
/// Parameters serialize in insertion order. [`merge`](Self::merge) applies
/// caller-supplied extras with last-write-wins semantics: an overridden key
/// appears exactly once in the encoded body.
#[derive(Debug, Clone, Default)]
pub struct NvpForm {
    pairs: Vec<(String, String)>,
}

impl NvpForm {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter without inspecting existing keys.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Sets a parameter, replacing any previous occurrence of the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.pairs.retain(|(existing, _)| *existing != key);
        self.pairs.push((key, value.into()));
    }

    /// Merges caller extras last, overriding any base parameter they name.
    pub fn merge(&mut self, extras: &[(String, String)]) {
        for (key, value) in extras {
            self.set(key.clone(), value.clone());
        }
    }

    /// Appends every pair of `other` after the existing ones.
    pub(crate) fn append(&mut self, other: NvpForm) {
        self.pairs.extend(other.pairs);
    }

    /// The parameters in serialization order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Serializes the form into a URL-encoded request body.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

/// Overall call status reported in the `ACK` response field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    /// The operation succeeded.
    Success,
    /// The operation succeeded but carries warning entries.
    SuccessWithWarning,
    /// The operation was rejected.
    Failure,
    /// Any other value; treated as failure.
    Other(String),
}

impl Ack {
    fn classify(raw: &str) -> Self {
        match raw {
            "Success" => Self::Success,
            "SuccessWithWarning" => Self::SuccessWithWarning,
            "Failure" => Self::Failure,
            other => Self::Other(other.to_owned()),
        }
    }

    /// `Success` and `SuccessWithWarning` are the only success states.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::SuccessWithWarning)
    }
}

/// Decoded NVP response.
///
/// The canonical decode path for every operation: percent-decoded pairs in
/// wire order, first value wins on duplicate keys.
#[derive(Debug, Clone, Default)]
pub struct NvpResponse {
    pairs: Vec<(String, String)>,
}

impl NvpResponse {
    /// Decodes a URL-encoded response body.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        let pairs = form_urlencoded::parse(body.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        Self { pairs }
    }

    /// First value for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// The `ACK` field, absent when the response carried none.
    #[must_use]
    pub fn ack(&self) -> Option<Ack> {
        self.get("ACK").map(Ack::classify)
    }

    /// True only for `ACK=Success` or `ACK=SuccessWithWarning`; a missing
    /// `ACK` field is a failure.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.ack().is_some_and(|ack| ack.is_success())
    }

    /// The checkout `TOKEN` field, if present.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.get("TOKEN")
    }

    /// First-error detail fields (`L_*0` group plus correlation id).
    #[must_use]
    pub fn first_error(&self) -> ErrorDetail {
        ErrorDetail {
            code: self.get("L_ERRORCODE0").map(ToOwned::to_owned),
            short_message: self.get("L_SHORTMESSAGE0").map(ToOwned::to_owned),
            long_message: self.get("L_LONGMESSAGE0").map(ToOwned::to_owned),
            correlation_id: self.get("CORRELATIONID").map(ToOwned::to_owned),
        }
    }

    /// The decoded pairs in wire order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_encodes_in_insertion_order() {
        let mut form = NvpForm::new();
        form.push("METHOD", "SetExpressCheckout");
        form.push("AMT", "10.00");
        form.push("CURRENCYCODE", "USD");

        assert_eq!(form.encode(), "METHOD=SetExpressCheckout&AMT=10.00&CURRENCYCODE=USD");
    }

    #[test]
    fn test_form_percent_encodes_values() {
        let mut form = NvpForm::new();
        form.push("RETURNURL", "https://shop.example.com/return?order=1");

        assert_eq!(
            form.encode(),
            "RETURNURL=https%3A%2F%2Fshop.example.com%2Freturn%3Forder%3D1"
        );
    }

    #[test]
    fn test_merge_overrides_base_key_once() {
        let mut form = NvpForm::new();
        form.push("NOSHIPPING", "1");
        form.push("AMT", "10.00");
        form.merge(&[("NOSHIPPING".to_owned(), "0".to_owned())]);

        let body = form.encode();
        assert_eq!(body.matches("NOSHIPPING=").count(), 1);
        assert!(body.contains("NOSHIPPING=0"));
        assert!(body.contains("AMT=10.00"));
    }

    #[test]
    fn test_merge_appends_new_keys() {
        let mut form = NvpForm::new();
        form.push("AMT", "10.00");
        form.merge(&[("SHIPTOSTREET".to_owned(), "T Street".to_owned())]);

        assert_eq!(form.encode(), "AMT=10.00&SHIPTOSTREET=T+Street");
    }

    #[test]
    fn test_set_replaces_existing_key() {
        let mut form = NvpForm::new();
        form.push("CURRENCYCODE", "USD");
        form.set("CURRENCYCODE", "EUR");

        assert_eq!(form.pairs(), &[("CURRENCYCODE".to_owned(), "EUR".to_owned())]);
    }

    #[test]
    fn test_response_parse_percent_decodes() {
        let response = NvpResponse::parse("TOKEN=EC%2d123&L_LONGMESSAGE0=Payment%20declined");
        assert_eq!(response.token(), Some("EC-123"));
        assert_eq!(response.get("L_LONGMESSAGE0"), Some("Payment declined"));
    }

    #[test]
    fn test_response_first_value_wins() {
        let response = NvpResponse::parse("ACK=Success&ACK=Failure");
        assert_eq!(response.ack(), Some(Ack::Success));
        assert!(response.is_success());
    }

    #[test]
    fn test_response_ack_classification() {
        assert!(NvpResponse::parse("ACK=Success").is_success());
        assert!(NvpResponse::parse("ACK=SuccessWithWarning").is_success());
        assert!(!NvpResponse::parse("ACK=Failure").is_success());
        assert!(!NvpResponse::parse("ACK=FailureWithWarning").is_success());
    }

    #[test]
    fn test_response_missing_ack_is_failure() {
        let response = NvpResponse::parse("TIMESTAMP=2009-12-13T09%3A51%3A19Z");
        assert_eq!(response.ack(), None);
        assert!(!response.is_success());
    }

    #[test]
    fn test_response_first_error_extraction() {
        let response = NvpResponse::parse(
            "ACK=Failure&L_ERRORCODE0=10007&L_SHORTMESSAGE0=Permission%20denied\
             &L_LONGMESSAGE0=You%20do%20not%20have%20permission&CORRELATIONID=3d8fa24c46c65",
        );

        let detail = response.first_error();
        assert_eq!(detail.code.as_deref(), Some("10007"));
        assert_eq!(detail.short_message.as_deref(), Some("Permission denied"));
        assert_eq!(detail.long_message.as_deref(), Some("You do not have permission"));
        assert_eq!(detail.correlation_id.as_deref(), Some("3d8fa24c46c65"));
    }

    #[test]
    fn test_response_first_error_empty() {
        let response = NvpResponse::parse("ACK=Failure");
        assert!(response.first_error().is_empty());
    }

    #[test]
    fn test_response_plus_decodes_to_space() {
        let response = NvpResponse::parse("L_SHORTMESSAGE0=Invalid+token");
        assert_eq!(response.get("L_SHORTMESSAGE0"), Some("Invalid token"));
    }
}
