//! PayPal Classic NVP API client.
//!
//! A thin, typed wrapper around PayPal's name-value-pair (NVP) HTTP API.
//! Five operations are exposed (Express Checkout initiation, checkout
//! details, payment capture, transaction refund, and direct card charge),
//! each following the same four-step shape: build an ordered parameter
//! form, serialize it URL-encoded, POST it, decode and classify the
//! response.
//!
//! # Payment flow
//!
//! ```text
//! ┌────────────┐ SetExpressCheckout  ┌─────────────┐
//! │  Merchant  │────────────────────▶│ PayPal NVP  │──▶ TOKEN
//! │   (this    │                     │  endpoint   │
//! │   crate)   │◀───redirect_url()───┤             │
//! └─────┬──────┘   buyer approves    └─────────────┘
//!       │          on PayPal's page, returns with PAYERID
//!       │
//!       └──── DoExpressCheckoutPayment(TOKEN, PAYERID) ──▶ captured
//! ```
//!
//! `GetExpressCheckoutDetails` (optional) inspects the pending checkout;
//! `RefundTransaction` reverses a settled transaction; `DoDirectPayment`
//! charges a card without the redirect dance.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use paypal_nvp::{CheckoutRequest, Config, PaypalClient};
//! use rust_decimal::Decimal;
//!
//! # async fn example() -> paypal_nvp::Result<()> {
//! // Credentials from PAYPAL_USER / PAYPAL_PASSWORD / PAYPAL_SIGNATURE;
//! // PAYPAL_SANDBOX=1 selects the sandbox endpoints.
//! let mut client = PaypalClient::new(Config::from_env())?;
//!
//! let request = CheckoutRequest::new(
//!     Decimal::new(1000, 2),
//!     "USD",
//!     "https://shop.example.com/return",
//!     "https://shop.example.com/cancel",
//! );
//! let token = client.set_express_checkout(&request).await?;
//!
//! // Send the buyer to PayPal's hosted checkout page.
//! let url = client.redirect_url(None).expect("token was just cached");
//! println!("redirect the buyer to {url}");
//!
//! // After the buyer approves, PayPal redirects back with a PAYERID.
//! let receipt = client
//!     .do_express_checkout_payment("USD", Decimal::new(1000, 2), Some(token.as_str()), Some("PAYER123"))
//!     .await?;
//! println!("transaction: {:?}", receipt.get("TRANSACTIONID"));
//! # Ok(())
//! # }
//! ```
//!
//! # Error handling
//!
//! All operations return [`Result<T>`](Result). Errors fall into three
//! classes that are never conflated: usage errors (caller mistakes, no
//! request is sent), provider errors (PayPal answered with a non-success
//! `ACK`), and transport errors (the HTTP round-trip failed).
//!
//! ```rust,no_run
//! use paypal_nvp::{CheckoutRequest, Config, PaypalClient, PaypalError};
//! use rust_decimal::Decimal;
//!
//! # async fn example() {
//! let mut client = PaypalClient::new(Config::from_env()).unwrap();
//! let request = CheckoutRequest::new(
//!     Decimal::new(1000, 2),
//!     "USD",
//!     "https://shop.example.com/return",
//!     "https://shop.example.com/cancel",
//! );
//!
//! match client.set_express_checkout(&request).await {
//!     Ok(token) => println!("checkout token: {token}"),
//!     Err(PaypalError::Provider(failure)) => {
//!         // PayPal rejected the request; detail fields are attached and
//!         // the client stores the message for later retrieval.
//!         eprintln!("rejected: {failure}");
//!     }
//!     Err(PaypalError::Transport(e)) => eprintln!("network problem: {e}"),
//!     Err(e) => eprintln!("usage error: {e}"),
//! }
//! # }
//! ```
//!
//! # Module organization
//!
//! - [`client`]: the [`PaypalClient`] and its five operations
//! - [`config`]: environment selection and merchant credentials
//! - [`nvp`]: the URL-encoded wire codec shared by every operation
//! - [`types`]: request-side models (cart items, card charges, refunds)
//! - [`error`]: the three-class error enum

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod client;
pub mod config;
pub mod error;
pub mod nvp;
pub mod types;

pub use client::PaypalClient;
pub use config::{Config, Credentials, Environment, NVP_VERSION};
pub use error::{ErrorDetail, PaypalError, ProviderFailure, Result};
pub use nvp::{Ack, NvpForm, NvpResponse};
pub use types::{
    CardCharge, CardType, CartItem, CheckoutRequest, DEFAULT_REFUND_NOTE, RefundTerms, RefundType,
};
