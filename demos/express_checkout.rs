//! Express Checkout walkthrough: initiate, redirect, capture.
//!
//! # Running this demo
//!
//! ```bash
//! PAYPAL_USER=... PAYPAL_PASSWORD=... PAYPAL_SIGNATURE=... PAYPAL_SANDBOX=1 \
//!     cargo run --example express_checkout
//! ```

use paypal_nvp::{CheckoutRequest, Config, PaypalClient, PaypalError};
use rust_decimal::Decimal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("PayPal NVP: Express Checkout demo\n");

    // Step 1: load configuration from the environment.
    println!("1. Loading configuration...");
    let config = Config::from_env();
    if !config.is_configured() {
        println!("   (no credentials in the environment; API calls will fail fast)");
    }
    let mut client = PaypalClient::new(config)?;

    // Step 2: initiate the checkout.
    println!("\n2. Calling SetExpressCheckout...");
    let request = CheckoutRequest::new(
        Decimal::new(1000, 2),
        "USD",
        "https://shop.example.com/return",
        "https://shop.example.com/cancel",
    );

    match client.set_express_checkout(&request).await {
        Ok(token) => {
            println!("   checkout token: {token}");

            // Step 3: the buyer approves on PayPal's hosted page.
            let url = client.redirect_url(None).expect("token was just cached");
            println!("\n3. Redirect the buyer to:\n   {url}");

            // Step 4: capture once PayPal redirects back with a PAYERID.
            println!("\n4. After approval, capture with:");
            println!("   client.do_express_checkout_payment(\"USD\", amount, Some(token.as_str()), Some(payer_id))");
        }
        Err(PaypalError::NotConfigured) => {
            eprintln!("   set PAYPAL_USER, PAYPAL_PASSWORD and PAYPAL_SIGNATURE to run this demo");
        }
        Err(PaypalError::Provider(failure)) => {
            eprintln!("   PayPal rejected the request: {failure}");
            if let Some(stored) = client.api_error() {
                eprintln!("   stored detail: {stored}");
            }
        }
        Err(e) => eprintln!("   failed: {e}"),
    }

    println!("\nDemo complete");
    Ok(())
}
