//! Request-side data models for the five NVP operations.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::PaypalError;

/// Note sent with a partial refund when the caller supplies none.
pub const DEFAULT_REFUND_NOTE: &str = "Dummy note for refund";

/// Extra parameter names that must be present for a direct payment.
pub(crate) const REQUIRED_CHARGE_FIELDS: [&str; 6] =
    ["IPADDRESS", "STREET", "CITY", "STATE", "COUNTRYCODE", "ZIP"];

/// Formats an amount as the provider expects: two fraction digits,
/// ties rounded away from zero.
#[must_use]
pub(crate) fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// One cart line for `SetExpressCheckout`.
///
/// Serialized as the index-suffixed `L_NAME{i}` / `L_NUMBER{i}` /
/// `L_DESC{i}` / `L_AMT{i}` / `L_QTY{i}` parameter group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Item name.
    pub name: String,
    /// Item number (SKU).
    pub number: String,
    /// Item description.
    pub description: String,
    /// Price per unit.
    pub unit_amount: Decimal,
    /// Quantity.
    pub quantity: u32,
}

/// Inputs for initiating an Express Checkout.
#[derive(Debug, Clone, Default)]
pub struct CheckoutRequest {
    /// Total order amount.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Where PayPal sends the buyer after approval.
    pub return_url: String,
    /// Where PayPal sends the buyer on cancellation.
    pub cancel_url: String,
    /// Cart lines, serialized as indexed parameter groups.
    pub items: Vec<CartItem>,
    /// Free-form extra parameters, merged last with override semantics.
    pub extra: Vec<(String, String)>,
}

impl CheckoutRequest {
    /// Creates a request with no cart items and no extras.
    pub fn new(
        amount: Decimal,
        currency: impl Into<String>,
        return_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            currency: currency.into(),
            return_url: return_url.into(),
            cancel_url: cancel_url.into(),
            items: Vec::new(),
            extra: Vec::new(),
        }
    }
}

/// Refund scope for `RefundTransaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundType {
    /// Refund the full transaction amount.
    Full,
    /// Refund part of the transaction; requires [`RefundTerms`].
    Partial,
}

impl RefundType {
    /// Wire value for the `REFUNDTYPE` parameter.
    #[must_use]
    pub fn as_nvp(self) -> &'static str {
        match self {
            Self::Full => "Full",
            Self::Partial => "Partial",
        }
    }
}

impl FromStr for RefundType {
    type Err = PaypalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Full" => Ok(Self::Full),
            "Partial" => Ok(Self::Partial),
            other => Err(PaypalError::InvalidRefundType(other.to_owned())),
        }
    }
}

impl fmt::Display for RefundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_nvp())
    }
}

/// Amount, currency and note for a partial refund.
#[derive(Debug, Clone)]
pub struct RefundTerms {
    /// Amount to refund.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Free-text note shown to the buyer; defaults to
    /// [`DEFAULT_REFUND_NOTE`] when absent.
    pub note: Option<String>,
}

impl RefundTerms {
    /// Creates refund terms with the default note.
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self { amount, currency: currency.into(), note: None }
    }
}

/// Card networks accepted by `DoDirectPayment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardType {
    /// Visa.
    Visa,
    /// MasterCard.
    MasterCard,
    /// Discover.
    Discover,
    /// American Express.
    Amex,
    /// Maestro.
    Maestro,
    /// Solo.
    Solo,
}

impl CardType {
    /// Wire value for the `CREDITCARDTYPE` parameter; the provider expects
    /// it uppercased.
    #[must_use]
    pub fn as_nvp(self) -> &'static str {
        match self {
            Self::Visa => "VISA",
            Self::MasterCard => "MASTERCARD",
            Self::Discover => "DISCOVER",
            Self::Amex => "AMEX",
            Self::Maestro => "MAESTRO",
            Self::Solo => "SOLO",
        }
    }
}

impl FromStr for CardType {
    type Err = PaypalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Visa" => Ok(Self::Visa),
            "MasterCard" => Ok(Self::MasterCard),
            "Discover" => Ok(Self::Discover),
            "Amex" => Ok(Self::Amex),
            "Maestro" => Ok(Self::Maestro),
            "Solo" => Ok(Self::Solo),
            other => Err(PaypalError::InvalidCardType(other.to_owned())),
        }
    }
}

/// Inputs for a direct card charge.
#[derive(Debug, Clone)]
pub struct CardCharge {
    /// Card number, numeric characters only.
    pub card_number: String,
    /// Expiry in `MMYYYY` format, exactly six digits.
    pub expiry: String,
    /// Card verification value, three or four digits.
    pub cvv: String,
    /// Card network.
    pub card_type: CardType,
    /// Cardholder first name.
    pub first_name: String,
    /// Cardholder last name.
    pub last_name: String,
    /// Amount to charge; rounded to two fraction digits on the wire.
    pub amount: Decimal,
    /// ISO 4217 currency code, `USD` by default.
    pub currency: String,
    /// Free-form extra parameters; keys are uppercased on the wire. Must
    /// include `IPADDRESS`, `STREET`, `CITY`, `STATE`, `COUNTRYCODE` and
    /// `ZIP` (any key casing).
    pub extra: Vec<(String, String)>,
}

impl CardCharge {
    /// Creates a charge in USD with no extra parameters yet.
    #[allow(clippy::too_many_arguments, reason = "mirrors the wire parameter set")]
    pub fn new(
        card_number: impl Into<String>,
        expiry: impl Into<String>,
        cvv: impl Into<String>,
        card_type: CardType,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            card_number: card_number.into(),
            expiry: expiry.into(),
            cvv: cvv.into(),
            card_type,
            first_name: first_name.into(),
            last_name: last_name.into(),
            amount,
            currency: "USD".to_owned(),
            extra: Vec::new(),
        }
    }

    /// Checks the charge before any request is built.
    ///
    /// # Errors
    ///
    /// [`InvalidExpiry`](PaypalError::InvalidExpiry) unless the expiry is
    /// exactly six ASCII digits; [`MissingChargeField`](PaypalError::MissingChargeField)
    /// for the first absent required extra.
    pub fn validate(&self) -> Result<(), PaypalError> {
        if self.expiry.len() != 6 || !self.expiry.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PaypalError::InvalidExpiry(self.expiry.clone()));
        }

        for required in REQUIRED_CHARGE_FIELDS {
            if !self.extra.iter().any(|(key, _)| key.eq_ignore_ascii_case(required)) {
                return Err(PaypalError::MissingChargeField(required));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn charge_with_extras() -> CardCharge {
        let mut charge = CardCharge::new(
            "4111111111111111",
            "122030",
            "123",
            CardType::Visa,
            "Ada",
            "Lovelace",
            dec!(10.00),
        );
        charge.extra = vec![
            ("ipaddress".to_owned(), "192.0.2.1".to_owned()),
            ("street".to_owned(), "10 Downing St".to_owned()),
            ("city".to_owned(), "London".to_owned()),
            ("state".to_owned(), "LND".to_owned()),
            ("countrycode".to_owned(), "GB".to_owned()),
            ("zip".to_owned(), "SW1A".to_owned()),
        ];
        charge
    }

    #[test]
    fn test_format_amount_keeps_two_digits() {
        assert_eq!(format_amount(dec!(10.00)), "10.00");
    }

    #[test]
    fn test_format_amount_rounds_half_up() {
        assert_eq!(format_amount(dec!(10.005)), "10.01");
        assert_eq!(format_amount(dec!(10.004)), "10.00");
        assert_eq!(format_amount(dec!(-10.005)), "-10.01");
    }

    #[test]
    fn test_format_amount_pads_integers() {
        assert_eq!(format_amount(dec!(5)), "5.00");
        assert_eq!(format_amount(dec!(5.1)), "5.10");
    }

    #[test]
    fn test_refund_type_from_str() {
        assert_eq!("Full".parse::<RefundType>().unwrap(), RefundType::Full);
        assert_eq!("Partial".parse::<RefundType>().unwrap(), RefundType::Partial);
    }

    #[test]
    fn test_refund_type_rejects_unknown_value() {
        let error = "Half".parse::<RefundType>().unwrap_err();
        assert!(matches!(error, PaypalError::InvalidRefundType(value) if value == "Half"));
    }

    #[test]
    fn test_card_type_from_str() {
        for (name, expected) in [
            ("Visa", CardType::Visa),
            ("MasterCard", CardType::MasterCard),
            ("Discover", CardType::Discover),
            ("Amex", CardType::Amex),
            ("Maestro", CardType::Maestro),
            ("Solo", CardType::Solo),
        ] {
            assert_eq!(name.parse::<CardType>().unwrap(), expected);
        }
    }

    #[test]
    fn test_card_type_rejects_case_variants() {
        assert!("AmEx".parse::<CardType>().is_err());
        assert!("visa".parse::<CardType>().is_err());
        assert!("Diners".parse::<CardType>().is_err());
    }

    #[test]
    fn test_card_type_wire_values_are_uppercase() {
        assert_eq!(CardType::MasterCard.as_nvp(), "MASTERCARD");
        assert_eq!(CardType::Visa.as_nvp(), "VISA");
    }

    #[test]
    fn test_charge_validate_accepts_complete_charge() {
        assert!(charge_with_extras().validate().is_ok());
    }

    #[test]
    fn test_charge_validate_rejects_short_expiry() {
        let mut charge = charge_with_extras();
        charge.expiry = "12025".to_owned();
        let error = charge.validate().unwrap_err();
        assert!(matches!(error, PaypalError::InvalidExpiry(value) if value == "12025"));
    }

    #[test]
    fn test_charge_validate_rejects_non_digit_expiry() {
        let mut charge = charge_with_extras();
        charge.expiry = "12a025".to_owned();
        assert!(matches!(charge.validate(), Err(PaypalError::InvalidExpiry(_))));
    }

    #[test]
    fn test_charge_validate_requires_each_extra_field() {
        for missing in REQUIRED_CHARGE_FIELDS {
            let mut charge = charge_with_extras();
            charge.extra.retain(|(key, _)| !key.eq_ignore_ascii_case(missing));
            let error = charge.validate().unwrap_err();
            assert!(
                matches!(error, PaypalError::MissingChargeField(field) if field == missing),
                "expected missing {missing}"
            );
        }
    }

    #[test]
    fn test_charge_extras_accept_any_key_casing() {
        let mut charge = charge_with_extras();
        for (key, _) in &mut charge.extra {
            *key = key.to_ascii_uppercase();
        }
        assert!(charge.validate().is_ok());
    }

    #[test]
    fn test_refund_terms_default_note() {
        let terms = RefundTerms::new(dec!(13.89), "AUD");
        assert!(terms.note.is_none());
        assert_eq!(terms.currency, "AUD");
    }
}
