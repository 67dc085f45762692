//! Hosted-checkout payment gateway client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use std::time::Duration;

use crate::config::{PaymentConfig, PAYMENT_REQUEST_TIMEOUT_SECONDS, PAYMENT_TRANSACTIONS_PATH};
use crate::domain::{PaymentNotification, PaymentRequest, PaymentSession};
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

/// Third-party payment provider.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a checkout session for an order.
    async fn create_transaction(&self, request: PaymentRequest) -> AppResult<PaymentSession>;

    /// Check that a notification was signed with our server key.
    fn verify_notification(&self, notification: &PaymentNotification) -> AppResult<()>;
}

#[derive(Debug, Serialize)]
struct TransactionBody<'a> {
    transaction_details: TransactionDetails,
    item_details: Vec<ItemDetail<'a>>,
    customer_details: CustomerDetails<'a>,
    callbacks: Callbacks<'a>,
}

#[derive(Debug, Serialize)]
struct TransactionDetails {
    order_id: String,
    gross_amount: i64,
}

#[derive(Debug, Serialize)]
struct ItemDetail<'a> {
    id: &'a str,
    name: &'a str,
    price: i64,
    quantity: i32,
}

#[derive(Debug, Serialize)]
struct CustomerDetails<'a> {
    first_name: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Callbacks<'a> {
    finish: &'a str,
}

#[derive(Debug, Deserialize)]
struct TransactionResponse {
    token: String,
    redirect_url: String,
}

/// Compute the notification signature: hex(sha512(order_id + status_code + gross_amount + server_key)).
pub fn notification_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Gateway client speaking the provider's JSON API over HTTPS
pub struct HttpPaymentGateway {
    config: PaymentConfig,
    client: reqwest::Client,
}

impl HttpPaymentGateway {
    pub fn new(config: PaymentConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PAYMENT_REQUEST_TIMEOUT_SECONDS))
            .build()?;
        Ok(Self { config, client })
    }

    fn transactions_url(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            PAYMENT_TRANSACTIONS_PATH
        )
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_transaction(&self, request: PaymentRequest) -> AppResult<PaymentSession> {
        if self.config.server_key().is_empty() {
            return Err(AppError::gateway("payment server key is not configured"));
        }

        let body = TransactionBody {
            transaction_details: TransactionDetails {
                order_id: request.order_id.to_string(),
                gross_amount: request.gross_amount,
            },
            item_details: request
                .items
                .iter()
                .map(|item| ItemDetail {
                    id: &item.id,
                    name: &item.name,
                    price: item.price,
                    quantity: item.quantity,
                })
                .collect(),
            customer_details: CustomerDetails {
                first_name: &request.customer.name,
                email: &request.customer.email,
                phone: request.customer.phone.as_deref(),
            },
            callbacks: Callbacks {
                finish: &self.config.finish_url,
            },
        };

        let response = self
            .client
            .post(self.transactions_url())
            .basic_auth(self.config.server_key(), Some(""))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::gateway(format!(
                "transaction request for order {} rejected with {}: {}",
                request.order_id, status, text
            )));
        }

        let created: TransactionResponse = response.json().await?;
        tracing::info!(order_id = %request.order_id, "Payment session created");

        Ok(PaymentSession {
            token: created.token,
            redirect_url: created.redirect_url,
        })
    }

    fn verify_notification(&self, notification: &PaymentNotification) -> AppResult<()> {
        let expected = notification_signature(
            &notification.order_id,
            &notification.status_code,
            &notification.gross_amount,
            self.config.server_key(),
        );

        if self.config.server_key().is_empty()
            || !expected.eq_ignore_ascii_case(&notification.signature_key)
        {
            tracing::warn!(order_id = %notification.order_id, "Rejected payment notification with bad signature");
            return Err(AppError::InvalidSignature);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::domain::payment::{PaymentCustomer, PaymentItem};

    const SERVER_KEY: &str = "SB-server-key-test";

    fn gateway(base_url: &str, server_key: &str) -> HttpPaymentGateway {
        HttpPaymentGateway::new(PaymentConfig::new(base_url, server_key, "http://shop/orders")).unwrap()
    }

    fn request() -> PaymentRequest {
        PaymentRequest {
            order_id: Uuid::new_v4(),
            gross_amount: 30_000,
            items: vec![PaymentItem {
                id: "p-1".to_string(),
                name: "60 Diamonds".to_string(),
                price: 15_000,
                quantity: 2,
            }],
            customer: PaymentCustomer {
                name: "Player".to_string(),
                email: "player@example.com".to_string(),
                phone: None,
            },
        }
    }

    fn notification(signature: String) -> PaymentNotification {
        PaymentNotification {
            order_id: "order-1".to_string(),
            status_code: "200".to_string(),
            gross_amount: "30000.00".to_string(),
            transaction_status: "settlement".to_string(),
            fraud_status: None,
            signature_key: signature,
            transaction_id: None,
            payment_type: None,
        }
    }

    #[tokio::test]
    async fn test_create_transaction_success() {
        let server = MockServer::start();
        let req = request();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/snap/v1/transactions")
                .header_exists("authorization")
                .body_contains(req.order_id.to_string())
                .body_contains("\"gross_amount\":30000");
            then.status(201).json_body(json!({
                "token": "snap-token",
                "redirect_url": "https://pay.example/v2/vtweb/snap-token"
            }));
        });

        let session = gateway(&server.base_url(), SERVER_KEY)
            .create_transaction(req)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(session.token, "snap-token");
        assert_eq!(session.redirect_url, "https://pay.example/v2/vtweb/snap-token");
    }

    #[tokio::test]
    async fn test_create_transaction_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/snap/v1/transactions");
            then.status(401).body("unauthorized");
        });

        let err = gateway(&server.base_url(), SERVER_KEY)
            .create_transaction(request())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Gateway(_)));
    }

    #[tokio::test]
    async fn test_create_transaction_without_server_key() {
        let err = gateway("http://127.0.0.1:9", "")
            .create_transaction(request())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Gateway(_)));
    }

    #[test]
    fn test_notification_signature_is_sha512_hex() {
        let signature = notification_signature("order-1", "200", "30000.00", SERVER_KEY);
        assert_eq!(signature.len(), 128);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(
            signature,
            notification_signature("order-1", "200", "30000.01", SERVER_KEY)
        );
    }

    #[test]
    fn test_verify_notification() {
        let gw = gateway("http://unused", SERVER_KEY);
        let good = notification_signature("order-1", "200", "30000.00", SERVER_KEY);

        assert!(gw.verify_notification(&notification(good.clone())).is_ok());
        assert!(gw
            .verify_notification(&notification(good.to_uppercase()))
            .is_ok());
        assert!(matches!(
            gw.verify_notification(&notification("00".repeat(64))),
            Err(AppError::InvalidSignature)
        ));
    }
}
