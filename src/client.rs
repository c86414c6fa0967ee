//! The NVP payment client and its five operations.
//!
//! Every operation follows the same shape: build an ordered parameter form,
//! prefix the credential block, POST the URL-encoded body, decode the
//! response and classify its `ACK`. Usage errors short-circuit before any
//! network I/O.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use crate::config::{Config, NVP_VERSION};
use crate::error::{PaypalError, ProviderFailure, Result};
use crate::nvp::{NvpForm, NvpResponse};
use crate::types::{
    CardCharge, CheckoutRequest, DEFAULT_REFUND_NOTE, RefundTerms, RefundType, format_amount,
};

/// Stored after a rejected `SetExpressCheckout` or `GetExpressCheckoutDetails`.
const GENERIC_CHECKOUT_ERROR: &str =
    "An error occurred during the PayPal checkout process; no money has been charged.";
/// Stored after a rejected payment capture or direct charge.
const GENERIC_PAYMENT_ERROR: &str = "Transaction failed. Check your order details and try again.";
/// Stored after a rejected refund.
const GENERIC_REFUND_ERROR: &str = "The refund request could not be performed.";

/// Client for the PayPal Classic NVP API.
///
/// Holds the merchant credentials and endpoint selection for its lifetime,
/// plus a small amount of convenience state: the token issued by the last
/// successful checkout initiation, the last error messages, and the decoded
/// responses of the most recent capture and refund. Correctness never
/// depends on that state; callers may always pass tokens explicitly.
///
/// All operations take `&mut self`, so concurrent use from multiple threads
/// requires caller-side synchronization, which the borrow checker enforces.
#[derive(Debug)]
pub struct PaypalClient {
    http: Client,
    config: Config,
    token: Option<String>,
    last_error: Option<String>,
    api_error: Option<String>,
    api_response: Option<NvpResponse>,
    payment_response: Option<NvpResponse>,
    refund_response: Option<NvpResponse>,
}

impl PaypalClient {
    /// Creates a client for the configured environment.
    ///
    /// Performs no I/O. Absent credentials do not fail construction; every
    /// API operation then fails with
    /// [`NotConfigured`](PaypalError::NotConfigured) before touching the
    /// network.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the underlying HTTP client cannot be
    /// built.
    pub fn new(config: Config) -> Result<Self> {
        let http = Client::builder()
            .pool_max_idle_per_host(10)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            config,
            token: None,
            last_error: None,
            api_error: None,
            api_response: None,
            payment_response: None,
            refund_response: None,
        })
    }

    /// The browser-redirect URL for the provider's hosted checkout page.
    ///
    /// Uses the explicit `token` if given, else the token cached by the last
    /// successful [`set_express_checkout`](Self::set_express_checkout).
    /// Returns `None` when neither is available, never a malformed URL.
    #[must_use]
    pub fn redirect_url(&self, token: Option<&str>) -> Option<String> {
        let token = token.or(self.token.as_deref())?;
        if token.is_empty() {
            return None;
        }
        Some(format!("{}{token}", self.config.environment.redirect_base()))
    }

    /// Initiates an Express Checkout (`SetExpressCheckout`).
    ///
    /// Caller extras merge last and may override any base parameter. Cart
    /// items are appended as index-suffixed parameter groups. On success the
    /// issued token is cached and returned.
    ///
    /// # Errors
    ///
    /// Usage, provider or transport errors per [`PaypalError`].
    #[instrument(
        skip(self, request),
        fields(
            amount = %request.amount,
            currency = %request.currency,
            cart_items = request.items.len()
        )
    )]
    pub async fn set_express_checkout(&mut self, request: &CheckoutRequest) -> Result<String> {
        let mut form = NvpForm::new();
        form.push("METHOD", "SetExpressCheckout");
        form.push("NOSHIPPING", "1");
        form.push("PAYMENTACTION", "Sale");
        form.push("RETURNURL", request.return_url.as_str());
        form.push("CANCELURL", request.cancel_url.as_str());
        form.push("AMT", format_amount(request.amount));
        form.push("CURRENCYCODE", request.currency.as_str());
        form.merge(&request.extra);

        for (index, item) in request.items.iter().enumerate() {
            form.push(format!("L_NAME{index}"), item.name.as_str());
            form.push(format!("L_NUMBER{index}"), item.number.as_str());
            form.push(format!("L_DESC{index}"), item.description.as_str());
            form.push(format!("L_AMT{index}"), format_amount(item.unit_amount));
            form.push(format!("L_QTY{index}"), item.quantity.to_string());
        }

        let response = self.call(form).await?;
        if !response.is_success() {
            let detail = response.first_error();
            self.last_error = Some(GENERIC_CHECKOUT_ERROR.to_owned());
            self.api_error = detail.long_message.clone();
            return Err(self.reject("SetExpressCheckout", &response));
        }

        let token = response
            .token()
            .ok_or_else(|| {
                PaypalError::Malformed("success response did not include a TOKEN".to_owned())
            })?
            .to_owned();
        self.token = Some(token.clone());
        debug!(token, "checkout initiated");
        Ok(token)
    }

    /// Fetches the details of a pending checkout (`GetExpressCheckoutDetails`).
    ///
    /// `token` defaults to the cached one; with neither available the call
    /// fails immediately without touching the network.
    ///
    /// # Errors
    ///
    /// [`MissingToken`](PaypalError::MissingToken) without any token;
    /// provider or transport errors otherwise.
    #[instrument(skip(self, return_url, cancel_url, token))]
    pub async fn get_express_checkout_details(
        &mut self,
        return_url: &str,
        cancel_url: &str,
        token: Option<&str>,
    ) -> Result<NvpResponse> {
        let Some(token) = token.map(ToOwned::to_owned).or_else(|| self.token.clone()) else {
            return Err(self.usage(PaypalError::MissingToken));
        };

        let mut form = NvpForm::new();
        form.push("METHOD", "GetExpressCheckoutDetails");
        form.push("RETURNURL", return_url);
        form.push("CANCELURL", cancel_url);
        form.push("TOKEN", token);

        let response = self.call(form).await?;
        if !response.is_success() {
            // This operation historically surfaces the short message.
            let detail = response.first_error();
            let message = detail
                .short_message
                .clone()
                .unwrap_or_else(|| GENERIC_CHECKOUT_ERROR.to_owned());
            self.last_error = Some(message.clone());
            self.api_error = Some(message);
            return Err(self.reject("GetExpressCheckoutDetails", &response));
        }

        Ok(response)
    }

    /// Captures an approved payment (`DoExpressCheckoutPayment`).
    ///
    /// Both `token` and `payer_id` come from the provider's redirect back to
    /// the return URL. Each missing value fails immediately with its own
    /// distinct error, before any network call.
    ///
    /// # Errors
    ///
    /// [`MissingToken`](PaypalError::MissingToken) /
    /// [`MissingPayerId`](PaypalError::MissingPayerId) for absent inputs;
    /// provider or transport errors otherwise.
    #[instrument(skip(self, amount, token, payer_id), fields(amount = %amount))]
    pub async fn do_express_checkout_payment(
        &mut self,
        currency: &str,
        amount: Decimal,
        token: Option<&str>,
        payer_id: Option<&str>,
    ) -> Result<NvpResponse> {
        let Some(token) = token else {
            return Err(self.usage(PaypalError::MissingToken));
        };
        let Some(payer_id) = payer_id else {
            return Err(self.usage(PaypalError::MissingPayerId));
        };

        let mut form = NvpForm::new();
        form.push("METHOD", "DoExpressCheckoutPayment");
        form.push("PAYMENTACTION", "Sale");
        form.push("TOKEN", token);
        form.push("AMT", format_amount(amount));
        form.push("CURRENCYCODE", currency);
        form.push("PAYERID", payer_id);

        let response = self.call(form).await?;
        if !response.is_success() {
            let detail = response.first_error();
            self.last_error = Some(GENERIC_PAYMENT_ERROR.to_owned());
            self.api_error = detail.long_message.clone();
            return Err(self.reject("DoExpressCheckoutPayment", &response));
        }

        self.payment_response = Some(response.clone());
        debug!("payment captured");
        Ok(response)
    }

    /// Refunds a settled transaction (`RefundTransaction`).
    ///
    /// A full refund omits amount, currency and note; a partial refund
    /// requires [`RefundTerms`] and fails immediately without them. The note
    /// defaults to [`DEFAULT_REFUND_NOTE`].
    ///
    /// # Errors
    ///
    /// [`MissingRefundTerms`](PaypalError::MissingRefundTerms) for a partial
    /// refund without terms; provider or transport errors otherwise.
    #[instrument(skip(self, terms), fields(refund_type = %refund_type))]
    pub async fn refund_transaction(
        &mut self,
        transaction_id: &str,
        refund_type: RefundType,
        terms: Option<RefundTerms>,
    ) -> Result<NvpResponse> {
        let mut form = NvpForm::new();
        form.push("METHOD", "RefundTransaction");
        form.push("TRANSACTIONID", transaction_id);
        form.push("REFUNDTYPE", refund_type.as_nvp());

        if refund_type == RefundType::Partial {
            let Some(terms) = terms else {
                return Err(self.usage(PaypalError::MissingRefundTerms));
            };
            form.push("AMT", format_amount(terms.amount));
            form.push("CURRENCYCODE", terms.currency.as_str());
            form.push("NOTE", terms.note.as_deref().unwrap_or(DEFAULT_REFUND_NOTE));
        }

        let response = self.call(form).await?;
        if !response.is_success() {
            let detail = response.first_error();
            self.last_error = Some(GENERIC_REFUND_ERROR.to_owned());
            self.api_error = detail.long_message.clone();
            return Err(self.reject("RefundTransaction", &response));
        }

        self.refund_response = Some(response.clone());
        debug!("refund accepted");
        Ok(response)
    }

    /// Charges a card directly (`DoDirectPayment`).
    ///
    /// The charge is validated before any request is built: six-digit
    /// expiry, all required extra parameters present. Extra keys and the
    /// card type are uppercased on the wire, and the amount is rounded to
    /// two fraction digits with ties away from zero.
    ///
    /// # Errors
    ///
    /// [`InvalidExpiry`](PaypalError::InvalidExpiry) /
    /// [`MissingChargeField`](PaypalError::MissingChargeField) before any
    /// network call; provider or transport errors otherwise.
    #[instrument(
        skip(self, charge),
        fields(
            amount = %charge.amount,
            currency = %charge.currency,
            card_type = charge.card_type.as_nvp()
        )
    )]
    pub async fn do_direct_payment(&mut self, charge: &CardCharge) -> Result<NvpResponse> {
        if let Err(error) = charge.validate() {
            return Err(self.usage(error));
        }

        let mut form = NvpForm::new();
        form.push("METHOD", "DoDirectPayment");
        form.push("PAYMENTACTION", "Sale");
        form.push("RETURNFMFDETAILS", "0");
        form.push("CREDITCARDTYPE", charge.card_type.as_nvp());
        form.push("ACCT", charge.card_number.as_str());
        form.push("EXPDATE", charge.expiry.as_str());
        form.push("CVV2", charge.cvv.as_str());
        form.push("FIRSTNAME", charge.first_name.as_str());
        form.push("LASTNAME", charge.last_name.as_str());
        form.push("CURRENCYCODE", charge.currency.as_str());
        form.push("AMT", format_amount(charge.amount));

        for (key, value) in &charge.extra {
            form.set(key.to_ascii_uppercase(), value.as_str());
        }

        let response = self.call(form).await?;
        if !response.is_success() {
            let detail = response.first_error();
            let message = detail
                .message()
                .map_or_else(|| GENERIC_PAYMENT_ERROR.to_owned(), ToOwned::to_owned);
            self.last_error = Some(message.clone());
            self.api_error = Some(message);
            return Err(self.reject("DoDirectPayment", &response));
        }

        self.payment_response = Some(response.clone());
        debug!("card charged");
        Ok(response)
    }

    /// The token cached by the last successful checkout initiation.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The human-readable message of the last failed call, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The provider's detailed error line from the last rejected call.
    #[must_use]
    pub fn api_error(&self) -> Option<&str> {
        self.api_error.as_deref()
    }

    /// The decoded response of the most recent call, whatever its outcome.
    #[must_use]
    pub fn api_response(&self) -> Option<&NvpResponse> {
        self.api_response.as_ref()
    }

    /// The decoded response of the most recent successful capture or direct
    /// charge.
    #[must_use]
    pub fn payment_response(&self) -> Option<&NvpResponse> {
        self.payment_response.as_ref()
    }

    /// The decoded response of the most recent successful refund.
    #[must_use]
    pub fn refund_response(&self) -> Option<&NvpResponse> {
        self.refund_response.as_ref()
    }

    /// Records a usage error before returning it.
    fn usage(&mut self, error: PaypalError) -> PaypalError {
        self.last_error = Some(error.to_string());
        error
    }

    /// Builds the provider-rejection error for a non-success response.
    fn reject(&mut self, operation: &'static str, response: &NvpResponse) -> PaypalError {
        let failure = ProviderFailure {
            operation,
            ack: response.get("ACK").map(ToOwned::to_owned),
            detail: response.first_error(),
        };
        warn!(%failure, "provider rejected the request");
        PaypalError::Provider(failure)
    }

    /// Prefixes the credential block, POSTs the encoded body and decodes the
    /// response. The single network funnel for all five operations.
    async fn call(&mut self, form: NvpForm) -> Result<NvpResponse> {
        let Some(credentials) = self.config.credentials.as_ref() else {
            return Err(self.usage(PaypalError::NotConfigured));
        };

        let mut body = NvpForm::new();
        body.push("USER", credentials.user.as_str());
        body.push("PWD", credentials.password.as_str());
        body.push("SIGNATURE", credentials.signature.as_str());
        body.push("VERSION", NVP_VERSION);
        body.append(form);

        let response = self
            .http
            .post(self.config.environment.api_url())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body.encode())
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        let decoded = NvpResponse::parse(&text);
        self.api_response = Some(decoded.clone());
        Ok(decoded)
    }
}
