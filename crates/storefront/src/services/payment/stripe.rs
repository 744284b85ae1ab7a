//! Minimal Stripe REST client.
//!
//! Covers exactly the calls the shop makes: create and refund a charge,
//! create a customer, attach a card to a customer, and list a customer's
//! cards.
//! Requests are form-encoded and authenticated with the secret key as the
//! basic-auth user.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use wardrobe_core::CurrencyCode;

use crate::config::StripeConfig;

/// Stripe API version pinned for all requests.
const API_VERSION: &str = "2020-08-27";

/// Errors returned by the Stripe API or while talking to it.
#[derive(Debug, Error)]
pub enum StripeError {
    /// The card was declined; the message comes from Stripe.
    #[error("card error: {message}")]
    Card {
        message: String,
        code: Option<String>,
    },

    /// Too many requests (HTTP 429).
    #[error("rate limited")]
    RateLimit,

    /// Invalid parameters were sent to the API.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The secret key was rejected (HTTP 401).
    #[error("authentication failed")]
    Authentication,

    /// The request never reached Stripe or timed out.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Any other error reported by the API.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The response could not be understood.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl StripeError {
    /// Message shown to the customer after a failed payment.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Card { message, .. } => message.clone(),
            Self::RateLimit => "Rate limit error.".to_owned(),
            Self::InvalidRequest(_) => "Invalid parameters.".to_owned(),
            Self::Authentication => "Not authenticated.".to_owned(),
            Self::Network(_) => "Network error.".to_owned(),
            Self::Api { .. } => {
                "Something went wrong. You were not charged. Please try again.".to_owned()
            }
            Self::Decode(_) => "A serious error occurred. We have been notified.".to_owned(),
        }
    }

    /// Whether this failure points at our side (keys, parameters, parsing)
    /// rather than at the customer's card.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_) | Self::Authentication | Self::Api { .. } | Self::Decode(_)
        )
    }
}

impl From<reqwest::Error> for StripeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err)
        }
    }
}

/// Error envelope returned by Stripe on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: String,
    message: Option<String>,
    code: Option<String>,
}

/// Turn a non-success response into a typed error.
fn classify(status: StatusCode, body: &str) -> StripeError {
    if status == StatusCode::UNAUTHORIZED {
        return StripeError::Authentication;
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return StripeError::RateLimit;
    }

    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return StripeError::Api {
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        };
    };

    let ErrorBody {
        kind,
        message,
        code,
    } = envelope.error;
    let message = message.unwrap_or_default();

    match kind.as_str() {
        "card_error" => StripeError::Card { message, code },
        "invalid_request_error" => StripeError::InvalidRequest(message),
        _ => StripeError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// What a charge is paid with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeSource<'a> {
    /// A single-use card token from Stripe.js.
    Token(&'a str),
    /// The customer's default card.
    Customer(&'a str),
    /// A specific saved card of a customer.
    CustomerCard { customer: &'a str, card: &'a str },
}

impl ChargeSource<'_> {
    /// Stripe id of the token or card being charged.
    #[must_use]
    pub const fn source_id(&self) -> &str {
        match *self {
            Self::Token(id) | Self::Customer(id) | Self::CustomerCard { card: id, .. } => id,
        }
    }

    fn form_fields(&self) -> Vec<(&'static str, String)> {
        match *self {
            Self::Token(token) => vec![("source", token.to_owned())],
            Self::Customer(customer) => vec![("customer", customer.to_owned())],
            Self::CustomerCard { customer, card } => vec![
                ("customer", customer.to_owned()),
                ("source", card.to_owned()),
            ],
        }
    }
}

/// A captured charge.
#[derive(Debug, Clone, Deserialize)]
pub struct Charge {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub paid: bool,
}

/// A refund of a captured charge.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeRefund {
    pub id: String,
    pub amount: i64,
}

/// A Stripe customer.
#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub id: String,
    pub email: Option<String>,
}

/// A card saved on a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct Card {
    pub id: String,
    pub brand: Option<String>,
    pub last4: Option<String>,
    pub exp_month: Option<u32>,
    pub exp_year: Option<u32>,
}

impl Card {
    /// Short label such as `Visa •••• 4242 (12/2030)`.
    #[must_use]
    pub fn label(&self) -> String {
        let brand = self.brand.as_deref().unwrap_or("Card");
        let last4 = self.last4.as_deref().unwrap_or("????");
        match (self.exp_month, self.exp_year) {
            (Some(month), Some(year)) => format!("{brand} •••• {last4} ({month:02}/{year})"),
            _ => format!("{brand} •••• {last4}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    secret_key: SecretString,
    currency: CurrencyCode,
    api_base: Url,
}

impl StripeClient {
    /// Create a new Stripe client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(concat!("wardrobe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StripeError::Network)?;

        Ok(Self {
            client,
            secret_key: config.secret_key.clone(),
            currency: config.currency,
            api_base: config.api_base.clone(),
        })
    }

    /// Currency charges are made in.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    fn endpoint(&self, path: &str) -> Result<Url, StripeError> {
        self.api_base
            .join(path)
            .map_err(|e| StripeError::Decode(format!("invalid endpoint {path}: {e}")))
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StripeError> {
        let response = request
            .basic_auth(self.secret_key.expose_secret(), Some(""))
            .header("Stripe-Version", API_VERSION)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = classify(status, &body);
            tracing::warn!(status = status.as_u16(), error = %err, "Stripe request failed");
            return Err(err);
        }

        response.json::<T>().await.map_err(|e| StripeError::Decode(e.to_string()))
    }

    /// Charge `amount` minor units.
    ///
    /// Stripe replays the first response for a repeated `idempotency_key`,
    /// so a resubmitted payment is charged once.
    ///
    /// # Errors
    ///
    /// Returns a classified `StripeError` if the charge fails.
    #[instrument(skip(self, source), fields(currency = self.currency.as_str()))]
    pub async fn create_charge(
        &self,
        amount: i64,
        source: ChargeSource<'_>,
        description: &str,
        idempotency_key: &str,
    ) -> Result<Charge, StripeError> {
        let mut form = vec![
            ("amount", amount.to_string()),
            ("currency", self.currency.as_str().to_owned()),
            ("description", description.to_owned()),
        ];
        form.extend(source.form_fields());

        let url = self.endpoint("/v1/charges")?;
        let request = self
            .client
            .post(url)
            .header("Idempotency-Key", idempotency_key)
            .form(&form);
        let charge: Charge = self.send(request).await?;

        tracing::info!(charge_id = %charge.id, amount, "Stripe charge created");
        Ok(charge)
    }

    /// Refund a charge in full.
    ///
    /// # Errors
    ///
    /// Returns a classified `StripeError` if the refund fails.
    #[instrument(skip(self))]
    pub async fn refund_charge(&self, charge_id: &str) -> Result<ChargeRefund, StripeError> {
        let form = [("charge", charge_id)];
        let url = self.endpoint("/v1/refunds")?;
        let request = self
            .client
            .post(url)
            .header("Idempotency-Key", format!("refund-{charge_id}"))
            .form(&form);
        let refund: ChargeRefund = self.send(request).await?;

        tracing::info!(charge_id, refund_id = %refund.id, "Stripe charge refunded");
        Ok(refund)
    }

    /// Create a customer with a first card.
    ///
    /// # Errors
    ///
    /// Returns a classified `StripeError` if the request fails.
    #[instrument(skip(self, email, token))]
    pub async fn create_customer(&self, email: &str, token: &str) -> Result<Customer, StripeError> {
        let form = [("email", email), ("source", token)];
        let url = self.endpoint("/v1/customers")?;
        let customer: Customer = self.send(self.client.post(url).form(&form)).await?;

        tracing::info!(customer_id = %customer.id, "Stripe customer created");
        Ok(customer)
    }

    /// Attach a card token to an existing customer.
    ///
    /// # Errors
    ///
    /// Returns a classified `StripeError` if the request fails.
    #[instrument(skip(self, token))]
    pub async fn add_card(&self, customer_id: &str, token: &str) -> Result<Card, StripeError> {
        let form = [("source", token)];
        let url = self.endpoint(&format!("/v1/customers/{customer_id}/sources"))?;
        self.send(self.client.post(url).form(&form)).await
    }

    /// Cards saved on a customer.
    ///
    /// # Errors
    ///
    /// Returns a classified `StripeError` if the request fails.
    #[instrument(skip(self))]
    pub async fn list_cards(&self, customer_id: &str) -> Result<Vec<Card>, StripeError> {
        let mut url = self.endpoint(&format!("/v1/customers/{customer_id}/sources"))?;
        url.query_pairs_mut()
            .append_pair("object", "card")
            .append_pair("limit", "3");
        let list: ListResponse<Card> = self.send(self.client.get(url)).await?;
        Ok(list.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_card_error_keeps_gateway_message() {
        let body = r#"{"error":{"type":"card_error","code":"card_declined","message":"Your card was declined."}}"#;
        let err = classify(StatusCode::PAYMENT_REQUIRED, body);
        assert!(matches!(err, StripeError::Card { ref code, .. } if code.as_deref() == Some("card_declined")));
        assert_eq!(err.user_message(), "Your card was declined.");
        assert!(!err.is_internal());
    }

    #[test]
    fn test_classify_status_codes() {
        assert!(matches!(
            classify(StatusCode::TOO_MANY_REQUESTS, ""),
            StripeError::RateLimit
        ));
        assert!(matches!(
            classify(StatusCode::UNAUTHORIZED, "{}"),
            StripeError::Authentication
        ));
    }

    #[test]
    fn test_classify_invalid_request() {
        let body = r#"{"error":{"type":"invalid_request_error","message":"No such token"}}"#;
        let err = classify(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.user_message(), "Invalid parameters.");
        assert!(err.is_internal());
    }

    #[test]
    fn test_classify_other_api_error() {
        let body = r#"{"error":{"type":"api_error","message":"Internal"}}"#;
        let err = classify(StatusCode::INTERNAL_SERVER_ERROR, body);
        assert!(matches!(err, StripeError::Api { status: 500, .. }));
        assert_eq!(
            err.user_message(),
            "Something went wrong. You were not charged. Please try again."
        );

        let err = classify(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(err, StripeError::Api { status: 502, .. }));
    }

    #[test]
    fn test_messages_for_remaining_errors() {
        assert_eq!(StripeError::RateLimit.user_message(), "Rate limit error.");
        assert_eq!(StripeError::Authentication.user_message(), "Not authenticated.");
        assert_eq!(
            StripeError::Decode("eof".to_owned()).user_message(),
            "A serious error occurred. We have been notified."
        );
    }

    #[test]
    fn test_charge_source_fields() {
        assert_eq!(
            ChargeSource::Token("tok_visa").form_fields(),
            vec![("source", "tok_visa".to_owned())]
        );
        assert_eq!(
            ChargeSource::CustomerCard {
                customer: "cus_1",
                card: "card_1"
            }
            .form_fields(),
            vec![
                ("customer", "cus_1".to_owned()),
                ("source", "card_1".to_owned())
            ]
        );
    }

    #[test]
    fn test_charge_source_id() {
        assert_eq!(ChargeSource::Token("tok_visa").source_id(), "tok_visa");
        assert_eq!(ChargeSource::Customer("cus_1").source_id(), "cus_1");
        assert_eq!(
            ChargeSource::CustomerCard {
                customer: "cus_1",
                card: "card_1"
            }
            .source_id(),
            "card_1"
        );
    }

    #[test]
    fn test_card_label() {
        let card = Card {
            id: "card_1".to_owned(),
            brand: Some("Visa".to_owned()),
            last4: Some("4242".to_owned()),
            exp_month: Some(4),
            exp_year: Some(2030),
        };
        assert_eq!(card.label(), "Visa •••• 4242 (04/2030)");
    }
}
