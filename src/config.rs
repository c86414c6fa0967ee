//! Client configuration: environment selection and merchant credentials.
//!
//! Configuration is an explicit struct handed to
//! [`PaypalClient::new`](crate::PaypalClient::new); nothing is read from
//! ambient global state unless the caller opts into [`Config::from_env`].

use std::fmt;

use serde::Deserialize;

/// NVP protocol version sent with every request.
pub const NVP_VERSION: &str = "53.0";

const LIVE_API_URL: &str = "https://api-3t.paypal.com/nvp";
const LIVE_REDIRECT_URL: &str = "https://www.paypal.com/cgi-bin/webscr?cmd=_express-checkout&token=";
const SANDBOX_API_URL: &str = "https://api-3t.sandbox.paypal.com/nvp";
const SANDBOX_REDIRECT_URL: &str =
    "https://www.sandbox.paypal.com/cgi-bin/webscr?cmd=_express-checkout&token=";

/// Which endpoint pair the client talks to.
///
/// Fixed for the lifetime of the client. `Custom` exists for integration
/// tests and self-hosted NVP simulators.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Production endpoints.
    Live,
    /// PayPal sandbox endpoints.
    Sandbox,
    /// Arbitrary endpoint pair, e.g. a mock server.
    Custom {
        /// URL the NVP POST requests go to.
        api_url: String,
        /// Base URL the checkout token is appended to for browser redirects.
        redirect_url: String,
    },
}

impl Default for Environment {
    fn default() -> Self {
        Self::Live
    }
}

impl Environment {
    /// URL the NVP POST requests go to.
    #[must_use]
    pub fn api_url(&self) -> &str {
        match self {
            Self::Live => LIVE_API_URL,
            Self::Sandbox => SANDBOX_API_URL,
            Self::Custom { api_url, .. } => api_url,
        }
    }

    /// Base URL for the hosted-checkout browser redirect; the checkout token
    /// is appended verbatim.
    #[must_use]
    pub fn redirect_base(&self) -> &str {
        match self {
            Self::Live => LIVE_REDIRECT_URL,
            Self::Sandbox => SANDBOX_REDIRECT_URL,
            Self::Custom { redirect_url, .. } => redirect_url,
        }
    }
}

/// Merchant API credentials.
///
/// Supplied once at construction and never mutated. The `Debug`
/// representation redacts the password and signature.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// API username (`USER`).
    pub user: String,
    /// API password (`PWD`).
    pub password: String,
    /// API signature (`SIGNATURE`).
    pub signature: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("signature", &"<redacted>")
            .finish()
    }
}

/// Full client configuration.
///
/// Deserializable so applications can embed it in their own config files:
///
/// ```
/// let config: paypal_nvp::Config = toml::from_str(
///     r#"
///     environment = "sandbox"
///
///     [credentials]
///     user = "merchant_api1.example.com"
///     password = "secret"
///     signature = "AFcWxV21C7fd0v3bYYYRCpSSRl31A"
///     "#,
/// )
/// .unwrap();
/// assert!(config.is_configured());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Endpoint selection; defaults to [`Environment::Live`].
    #[serde(default)]
    pub environment: Environment,
    /// Merchant credentials. Absence does not fail construction; it surfaces
    /// as [`NotConfigured`](crate::PaypalError::NotConfigured) on every API
    /// call.
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

impl Config {
    /// Builds a configuration from the process environment.
    ///
    /// Reads `PAYPAL_USER`, `PAYPAL_PASSWORD` and `PAYPAL_SIGNATURE`; the
    /// credentials stay unset unless all three are present. `PAYPAL_SANDBOX`
    /// set to `1`, `true` or `yes` selects the sandbox endpoints.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let environment = match get("PAYPAL_SANDBOX") {
            Some(flag)
                if flag.eq_ignore_ascii_case("1")
                    || flag.eq_ignore_ascii_case("true")
                    || flag.eq_ignore_ascii_case("yes") =>
            {
                Environment::Sandbox
            }
            _ => Environment::Live,
        };

        let credentials = match (get("PAYPAL_USER"), get("PAYPAL_PASSWORD"), get("PAYPAL_SIGNATURE"))
        {
            (Some(user), Some(password), Some(signature)) => {
                Some(Credentials { user, password, signature })
            }
            _ => None,
        };

        Self { environment, credentials }
    }

    /// True when credentials are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}
