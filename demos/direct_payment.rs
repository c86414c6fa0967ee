//! Direct card charge walkthrough.
//!
//! # Running this demo
//!
//! ```bash
//! PAYPAL_USER=... PAYPAL_PASSWORD=... PAYPAL_SIGNATURE=... PAYPAL_SANDBOX=1 \
//!     cargo run --example direct_payment
//! ```

use paypal_nvp::{CardCharge, CardType, Config, PaypalClient, PaypalError};
use rust_decimal::Decimal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("PayPal NVP: Direct Payment demo\n");

    println!("1. Loading configuration...");
    let mut client = PaypalClient::new(Config::from_env())?;

    // Sandbox test card; a live card number would be charged for real.
    println!("\n2. Preparing the charge...");
    let mut charge = CardCharge::new(
        "4111111111111111",
        "122030",
        "123",
        CardType::Visa,
        "Ada",
        "Lovelace",
        Decimal::new(1999, 2),
    );
    charge.extra = vec![
        ("ipaddress".to_owned(), "192.0.2.1".to_owned()),
        ("street".to_owned(), "10 Downing St".to_owned()),
        ("city".to_owned(), "London".to_owned()),
        ("state".to_owned(), "LND".to_owned()),
        ("countrycode".to_owned(), "GB".to_owned()),
        ("zip".to_owned(), "SW1A".to_owned()),
    ];
    println!("   {} {} for {} {}", charge.card_type.as_nvp(), "....1111", charge.amount, charge.currency);

    println!("\n3. Calling DoDirectPayment...");
    match client.do_direct_payment(&charge).await {
        Ok(receipt) => {
            println!("   charged; transaction id: {:?}", receipt.get("TRANSACTIONID"));
        }
        Err(PaypalError::NotConfigured) => {
            eprintln!("   set PAYPAL_USER, PAYPAL_PASSWORD and PAYPAL_SIGNATURE to run this demo");
        }
        Err(PaypalError::Provider(failure)) => {
            eprintln!("   PayPal declined the charge: {failure}");
        }
        Err(e) => eprintln!("   failed: {e}"),
    }

    println!("\nDemo complete");
    Ok(())
}
