//! HTTP payment gateway implementation.
//!
//! Talks to a Razorpay-compatible Orders API: `POST {base}/v1/orders` with
//! basic auth (key id / key secret). Credentials are injected; they are
//! never logged and never appear in errors.

use crate::{GatewayOrder, OrderNotes, PaymentGateway};
use async_trait::async_trait;
use gatepass_core::{CheckoutError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.razorpay.com";

/// Gateway calls are short-lived; anything slower than this is treated as
/// a gateway failure rather than left hanging.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Razorpay-style HTTP [`PaymentGateway`].
#[derive(Clone)]
pub struct HttpPaymentGateway {
    client: Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    notes: &'a OrderNotes,
}

#[derive(Deserialize)]
struct CreateOrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

impl HttpPaymentGateway {
    /// Create a gateway client with injected credentials.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Gateway`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(key_id: String, key_secret: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CheckoutError::Gateway(format!("failed to build client: {e}")))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            key_id,
            key_secret,
        })
    }

    /// Override the API base URL (for tests or sandbox environments).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
        notes: OrderNotes,
    ) -> Result<GatewayOrder> {
        let body = CreateOrderBody {
            amount: amount_minor,
            currency,
            receipt,
            notes: &notes,
        };

        let response = self
            .client
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CheckoutError::Gateway("order creation timed out".into())
                } else {
                    CheckoutError::Gateway(format!("order creation request failed: {e}"))
                }
            })?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                let order: CreateOrderResponse = response.json().await.map_err(|e| {
                    CheckoutError::Gateway(format!("malformed order response: {e}"))
                })?;

                tracing::info!(
                    order_id = %order.id,
                    amount_minor = order.amount,
                    currency = %order.currency,
                    receipt = %receipt,
                    "Gateway order created"
                );

                Ok(GatewayOrder {
                    order_id: order.id,
                    amount_minor: order.amount,
                    currency: order.currency,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(CheckoutError::Gateway(
                "gateway rejected credentials".into(),
            )),
            status => {
                tracing::warn!(status = %status, receipt = %receipt, "Gateway order creation failed");
                Err(CheckoutError::Gateway(format!(
                    "gateway returned status {status}"
                )))
            }
        }
    }
}
