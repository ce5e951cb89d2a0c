//! Simulated gateway.

use super::{PaymentError, PaymentGateway, PaymentOutcome, PaymentRequest};
use crate::config::PaymentSettings;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::{info, instrument, warn};

const TRANSACTION_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    delay: Duration,
    success_rate: f64,
}

impl SimulatedGateway {
    pub fn new(settings: &PaymentSettings) -> Self {
        Self {
            delay: settings.delay,
            success_rate: settings.success_rate.clamp(0.0, 1.0),
        }
    }

    /// Approves every charge immediately.
    pub fn always_approve() -> Self {
        Self {
            delay: Duration::ZERO,
            success_rate: 1.0,
        }
    }

    /// Declines every charge immediately.
    pub fn always_decline() -> Self {
        Self {
            delay: Duration::ZERO,
            success_rate: 0.0,
        }
    }

    // Sync so the thread-local rng never lives across an await.
    fn decide(&self) -> PaymentOutcome {
        let mut rng = rand::rng();
        if rng.random_bool(self.success_rate) {
            let suffix: String = (0..12)
                .map(|_| char::from(TRANSACTION_CHARSET[rng.random_range(0..TRANSACTION_CHARSET.len())]))
                .collect();
            PaymentOutcome::Approved {
                transaction_id: format!("TXN-{suffix}"),
            }
        } else {
            PaymentOutcome::Declined {
                reason: "Payment declined by issuer".to_string(),
            }
        }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    #[instrument(skip(self, request), fields(order_number = %request.order_number, amount = %request.amount))]
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentOutcome, PaymentError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let outcome = self.decide();
        match &outcome {
            PaymentOutcome::Approved { transaction_id } => {
                info!(%transaction_id, method = ?request.method, "Payment approved");
            }
            PaymentOutcome::Declined { reason } => {
                warn!(%reason, method = ?request.method, "Payment declined");
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OrderNumber, PaymentMethod};
    use rust_decimal::Decimal;

    fn request() -> PaymentRequest {
        PaymentRequest {
            order_number: OrderNumber::from("ORD-20261018-AAAAAA"),
            amount: Decimal::from(878),
            method: PaymentMethod::Card,
            payer_reference: None,
        }
    }

    #[tokio::test]
    async fn approving_gateway_issues_transaction_ids() {
        let outcome = SimulatedGateway::always_approve()
            .charge(&request())
            .await
            .unwrap();
        match outcome {
            PaymentOutcome::Approved { transaction_id } => {
                assert!(transaction_id.starts_with("TXN-"));
                assert_eq!(transaction_id.len(), 16);
            }
            other => panic!("expected approval, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn declining_gateway_declines() {
        let outcome = SimulatedGateway::always_decline()
            .charge(&request())
            .await
            .unwrap();
        assert!(!outcome.is_approved());
    }

    #[tokio::test]
    async fn configured_delay_is_applied() {
        let gateway = SimulatedGateway::new(&PaymentSettings {
            delay: Duration::from_millis(30),
            success_rate: 1.0,
        });
        let started = tokio::time::Instant::now();
        gateway.charge(&request()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(30));
    }
}
