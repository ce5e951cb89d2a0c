//! [`ActorEntity`] implementation for [`Order`]: creation-time validation and the status and
//! payment state machines.

use super::actions::OrderAction;
use super::error::OrderError;
use crate::identity::{Principal, Role};
use crate::model::{
    Order, OrderCreate, OrderNumber, OrderStatus, PaymentMethod, PaymentStatus, StatusChange,
    Tracking,
};
use crate::payment::PaymentOutcome;
use crate::pricing::PricedLine;
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

fn require_staff(by: &Principal, what: &str) -> Result<(), OrderError> {
    if by.role.is_staff() {
        Ok(())
    } else {
        Err(OrderError::Forbidden(format!("{what} requires a staff role")))
    }
}

impl Order {
    fn invalid(&self, to: impl ToString) -> OrderError {
        OrderError::InvalidTransition {
            from: self.status,
            to: to.to_string(),
        }
    }

    fn advance(
        &mut self,
        to: OrderStatus,
        by: Principal,
        note: Option<String>,
    ) -> Result<(), OrderError> {
        require_staff(&by, "Changing order status")?;
        if self.status.next() != Some(to) {
            return Err(self.invalid(to));
        }
        self.set_status(to, by.role, note);
        Ok(())
    }

    fn authorize_owner(&self, by: &Principal) -> Result<(), OrderError> {
        if by.can_access(self.customer) {
            Ok(())
        } else {
            Err(OrderError::Forbidden(format!(
                "{} does not own order {}",
                by.customer, self.order_number
            )))
        }
    }

    /// Cancellation and refund would strand a charge that is still in flight.
    fn ensure_no_payment_in_flight(&self) -> Result<(), OrderError> {
        if self.payment_status == PaymentStatus::Processing {
            return Err(OrderError::PaymentInProgress(self.order_number.to_string()));
        }
        Ok(())
    }

    fn cancel(&mut self, by: Principal, reason: Option<String>) -> Result<(), OrderError> {
        self.authorize_owner(&by)?;
        if self.status.is_terminal() {
            return Err(self.invalid(OrderStatus::Cancelled));
        }
        self.ensure_no_payment_in_flight()?;
        let early = matches!(self.status, OrderStatus::Pending | OrderStatus::Confirmed);
        if !by.role.is_staff() && !early {
            return Err(OrderError::Forbidden(format!(
                "orders that are {} can only be cancelled by staff",
                self.status
            )));
        }
        self.cancellation_reason = reason.clone();
        self.set_status(OrderStatus::Cancelled, by.role, reason);
        Ok(())
    }

    fn refund(&mut self, by: Principal, reason: Option<String>) -> Result<(), OrderError> {
        require_staff(&by, "Refunding")?;
        if self.status.is_terminal() {
            return Err(self.invalid(OrderStatus::Refunded));
        }
        self.ensure_no_payment_in_flight()?;
        if self.payment_status == PaymentStatus::Paid {
            self.payment_status = PaymentStatus::Refunded;
        }
        self.set_status(OrderStatus::Refunded, by.role, reason);
        Ok(())
    }

    fn begin_payment(&mut self, by: Principal) -> Result<(), OrderError> {
        self.authorize_owner(&by)?;
        self.ensure_payable()?;
        self.payment_status = PaymentStatus::Processing;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn ensure_payment_started(&self) -> Result<(), OrderError> {
        if self.payment_status == PaymentStatus::Processing {
            Ok(())
        } else {
            Err(OrderError::PaymentNotStarted(self.order_number.to_string()))
        }
    }

    fn abort_payment(&mut self, by: Principal) -> Result<(), OrderError> {
        self.authorize_owner(&by)?;
        self.ensure_payment_started()?;
        self.payment_status = PaymentStatus::Failed;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn record_payment(
        &mut self,
        by: Principal,
        method: PaymentMethod,
        outcome: PaymentOutcome,
    ) -> Result<(), OrderError> {
        self.authorize_owner(&by)?;
        self.ensure_payment_started()?;
        match outcome {
            PaymentOutcome::Approved { transaction_id } => {
                self.payment_status = PaymentStatus::Paid;
                self.payment_method = method;
                self.transaction_id = Some(transaction_id);
                if self.status == OrderStatus::Pending {
                    self.set_status(
                        OrderStatus::Confirmed,
                        by.role,
                        Some("Payment received".to_string()),
                    );
                } else {
                    self.updated_at = Utc::now();
                }
            }
            PaymentOutcome::Declined { .. } => {
                // The order stays where it is and awaits a retry or a cancellation.
                self.payment_status = PaymentStatus::Failed;
                self.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    /// Whether a payment attempt may be made right now.
    pub fn ensure_payable(&self) -> Result<(), OrderError> {
        match (self.status, self.payment_status) {
            (OrderStatus::Cancelled | OrderStatus::Refunded, _) => {
                Err(self.invalid("paid"))
            }
            (_, PaymentStatus::Paid | PaymentStatus::Refunded) => {
                Err(OrderError::AlreadyPaid(self.order_number.to_string()))
            }
            (_, PaymentStatus::Processing) => {
                Err(OrderError::PaymentInProgress(self.order_number.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn update_tracking(&mut self, by: Principal, tracking: Tracking) -> Result<(), OrderError> {
        require_staff(&by, "Updating tracking")?;
        if !matches!(self.status, OrderStatus::Packed | OrderStatus::Shipped) {
            return Err(OrderError::Validation(format!(
                "tracking can only be set on packed or shipped orders, not {}",
                self.status
            )));
        }
        if tracking.carrier.is_some() {
            self.tracking.carrier = tracking.carrier;
        }
        if tracking.tracking_number.is_some() {
            self.tracking.tracking_number = tracking.tracking_number;
        }
        if tracking.estimated_delivery.is_some() {
            self.tracking.estimated_delivery = tracking.estimated_delivery;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn validate(params: &OrderCreate) -> Result<(), OrderError> {
    if params.items.is_empty() {
        return Err(OrderError::Validation("an order needs at least one item".into()));
    }
    let missing = params.shipping_address.missing_fields();
    if !missing.is_empty() {
        return Err(OrderError::Validation(format!(
            "shipping address is missing {}",
            missing.join(", ")
        )));
    }
    let missing = params.billing_address.missing_fields();
    if !missing.is_empty() {
        return Err(OrderError::Validation(format!(
            "billing address is missing {}",
            missing.join(", ")
        )));
    }
    for item in &params.items {
        if item.quantity == 0 {
            return Err(OrderError::Validation(format!(
                "{} has quantity 0",
                item.snapshot.name
            )));
        }
        if item.line_total != PricedLine::new(item.unit_price, item.quantity).total() {
            return Err(OrderError::Validation(format!(
                "line total of {} does not match its price",
                item.snapshot.name
            )));
        }
    }
    let lines: Decimal = params.items.iter().map(|item| item.line_total).sum();
    if lines != params.totals.subtotal || !params.totals.reconciles() {
        return Err(OrderError::Validation("order totals do not reconcile".into()));
    }
    Ok(())
}

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderNumber;
    type Create = OrderCreate;
    /// Orders change only through actions.
    type Update = ();
    type Action = OrderAction;
    type ActionResult = Order;
    type Context = ();
    type Error = OrderError;

    fn assign_id(_sequence: u64, params: &OrderCreate) -> OrderNumber {
        params.order_number.clone()
    }

    fn id(&self) -> OrderNumber {
        self.order_number.clone()
    }

    /// Cash-on-delivery orders need no online confirmation and start `confirmed`.
    fn from_create_params(order_number: OrderNumber, params: OrderCreate) -> Result<Self, OrderError> {
        validate(&params)?;

        let now = Utc::now();
        let status = if params.payment_method.is_online() {
            OrderStatus::Pending
        } else {
            OrderStatus::Confirmed
        };

        Ok(Self {
            order_number,
            customer: params.customer,
            items: params.items,
            coupon: params.coupon,
            totals: params.totals,
            status,
            payment_status: PaymentStatus::Pending,
            payment_method: params.payment_method,
            shipping_address: params.shipping_address,
            billing_address: params.billing_address,
            notes: params.notes,
            transaction_id: None,
            tracking: Tracking::default(),
            cancellation_reason: None,
            history: vec![StatusChange {
                status,
                at: now,
                by: Role::Customer,
                note: Some("Order placed".to_string()),
            }],
            created_at: now,
            updated_at: now,
        })
    }

    async fn on_update(&mut self, _update: (), _ctx: &()) -> Result<(), OrderError> {
        Ok(())
    }

    async fn handle_action(&mut self, action: OrderAction, _ctx: &()) -> Result<Order, OrderError> {
        let before = self.status;
        match action {
            OrderAction::Advance { to, by, note } => self.advance(to, by, note)?,
            OrderAction::Cancel { by, reason } => self.cancel(by, reason)?,
            OrderAction::Refund { by, reason } => self.refund(by, reason)?,
            OrderAction::BeginPayment { by } => self.begin_payment(by)?,
            OrderAction::RecordPayment {
                by,
                method,
                outcome,
            } => self.record_payment(by, method, outcome)?,
            OrderAction::AbortPayment { by, reason } => {
                self.abort_payment(by)?;
                warn!(order_number = %self.order_number, %reason, "Payment attempt aborted");
            }
            OrderAction::UpdateTracking { by, tracking } => self.update_tracking(by, tracking)?,
        }
        if before != self.status {
            info!(order_number = %self.order_number, from = %before, to = %self.status, "Status changed");
        }
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Address, CustomerId, OrderItem, PaymentMethod, ProductId, ProductSnapshot,
    };
    use crate::pricing::PricingPolicy;

    fn address() -> Address {
        Address {
            full_name: "Asha Rao".into(),
            line1: "12 MG Road".into(),
            line2: None,
            city: "Pune".into(),
            state: "MH".into(),
            postal_code: "411001".into(),
            country: "IN".into(),
            phone: None,
        }
    }

    fn params(method: PaymentMethod) -> OrderCreate {
        let unit_price = Decimal::from(100);
        let totals = PricingPolicy::default()
            .quote(&[PricedLine::new(unit_price, 2)], None)
            .unwrap();
        OrderCreate {
            order_number: OrderNumber::from("ORD-20261018-TEST01"),
            customer: CustomerId(1),
            items: vec![OrderItem {
                product_id: ProductId(1),
                quantity: 2,
                unit_price,
                line_total: Decimal::from(200),
                snapshot: ProductSnapshot {
                    name: "Teapot".into(),
                    color: None,
                    brand: None,
                    thumbnail: None,
                },
            }],
            coupon: None,
            totals,
            payment_method: method,
            shipping_address: address(),
            billing_address: address(),
            notes: None,
        }
    }

    fn order(method: PaymentMethod) -> Order {
        Order::from_create_params(OrderNumber::from("ORD-20261018-TEST01"), params(method)).unwrap()
    }

    fn staff() -> Principal {
        Principal::staff(CustomerId(99))
    }

    #[test]
    fn cash_on_delivery_starts_confirmed() {
        let cod = order(PaymentMethod::CashOnDelivery);
        assert_eq!(cod.status, OrderStatus::Confirmed);
        assert_eq!(cod.payment_status, PaymentStatus::Pending);

        let card = order(PaymentMethod::Card);
        assert_eq!(card.status, OrderStatus::Pending);
    }

    #[test]
    fn totals_that_do_not_reconcile_are_rejected() {
        let mut bad = params(PaymentMethod::Card);
        bad.totals.tax += Decimal::ONE;
        let result = Order::from_create_params(bad.order_number.clone(), bad);
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[tokio::test]
    async fn forward_steps_cannot_be_skipped() {
        let mut order = order(PaymentMethod::CashOnDelivery);
        let result = order
            .handle_action(
                OrderAction::Advance {
                    to: OrderStatus::Shipped,
                    by: staff(),
                    note: None,
                },
                &(),
            )
            .await;
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));

        let processing = order
            .handle_action(
                OrderAction::Advance {
                    to: OrderStatus::Processing,
                    by: staff(),
                    note: None,
                },
                &(),
            )
            .await
            .unwrap();
        assert_eq!(processing.status, OrderStatus::Processing);
        assert_eq!(processing.history.len(), 2);
    }

    #[tokio::test]
    async fn customers_cannot_advance_orders() {
        let mut order = order(PaymentMethod::CashOnDelivery);
        let result = order
            .handle_action(
                OrderAction::Advance {
                    to: OrderStatus::Processing,
                    by: Principal::customer(CustomerId(1)),
                    note: None,
                },
                &(),
            )
            .await;
        assert!(matches!(result, Err(OrderError::Forbidden(_))));
    }

    #[tokio::test]
    async fn declined_payment_can_be_retried_and_paid_once() {
        let owner = Principal::customer(CustomerId(1));
        let mut order = order(PaymentMethod::Upi);

        order
            .handle_action(OrderAction::BeginPayment { by: owner }, &())
            .await
            .unwrap();
        let declined = order
            .handle_action(
                OrderAction::RecordPayment {
                    by: owner,
                    method: PaymentMethod::Upi,
                    outcome: PaymentOutcome::Declined {
                        reason: "insufficient funds".into(),
                    },
                },
                &(),
            )
            .await
            .unwrap();
        assert_eq!(declined.payment_status, PaymentStatus::Failed);
        assert_eq!(declined.status, OrderStatus::Pending);

        order
            .handle_action(OrderAction::BeginPayment { by: owner }, &())
            .await
            .unwrap();
        let paid = order
            .handle_action(
                OrderAction::RecordPayment {
                    by: owner,
                    method: PaymentMethod::Upi,
                    outcome: PaymentOutcome::Approved {
                        transaction_id: "TXN-1".into(),
                    },
                },
                &(),
            )
            .await
            .unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
        assert_eq!(paid.status, OrderStatus::Confirmed);

        let again = order.ensure_payable();
        assert_eq!(again, Err(OrderError::AlreadyPaid("ORD-20261018-TEST01".into())));
    }

    #[tokio::test]
    async fn payment_claim_admits_one_charge_at_a_time() {
        let owner = Principal::customer(CustomerId(1));
        let mut order = order(PaymentMethod::Card);

        let claimed = order
            .handle_action(OrderAction::BeginPayment { by: owner }, &())
            .await
            .unwrap();
        assert_eq!(claimed.payment_status, PaymentStatus::Processing);

        let second = order
            .handle_action(OrderAction::BeginPayment { by: owner }, &())
            .await;
        assert_eq!(
            second,
            Err(OrderError::PaymentInProgress("ORD-20261018-TEST01".into()))
        );

        let cancel = order
            .handle_action(OrderAction::Cancel { by: staff(), reason: None }, &())
            .await;
        assert!(matches!(cancel, Err(OrderError::PaymentInProgress(_))));

        let aborted = order
            .handle_action(
                OrderAction::AbortPayment {
                    by: owner,
                    reason: "gateway unreachable".into(),
                },
                &(),
            )
            .await
            .unwrap();
        assert_eq!(aborted.payment_status, PaymentStatus::Failed);
        assert_eq!(aborted.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn outcome_without_claim_is_rejected() {
        let owner = Principal::customer(CustomerId(1));
        let mut order = order(PaymentMethod::Card);

        let result = order
            .handle_action(
                OrderAction::RecordPayment {
                    by: owner,
                    method: PaymentMethod::Card,
                    outcome: PaymentOutcome::Approved {
                        transaction_id: "TXN-2".into(),
                    },
                },
                &(),
            )
            .await;

        assert_eq!(
            result,
            Err(OrderError::PaymentNotStarted("ORD-20261018-TEST01".into()))
        );
        assert_eq!(order.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn customer_cancellation_window() {
        let owner = Principal::customer(CustomerId(1));
        let stranger = Principal::customer(CustomerId(2));

        let mut confirmed = order(PaymentMethod::CashOnDelivery);
        let result = confirmed
            .handle_action(OrderAction::Cancel { by: stranger, reason: None }, &())
            .await;
        assert!(matches!(result, Err(OrderError::Forbidden(_))));

        let cancelled = confirmed
            .handle_action(
                OrderAction::Cancel {
                    by: owner,
                    reason: Some("changed my mind".into()),
                },
                &(),
            )
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("changed my mind"));

        let mut processing = order(PaymentMethod::CashOnDelivery);
        processing.status = OrderStatus::Processing;
        let result = processing
            .handle_action(OrderAction::Cancel { by: owner, reason: None }, &())
            .await;
        assert!(matches!(result, Err(OrderError::Forbidden(_))));
    }

    #[tokio::test]
    async fn refund_moves_paid_payment_to_refunded() {
        let mut order = order(PaymentMethod::Card);
        order.payment_status = PaymentStatus::Paid;
        order.status = OrderStatus::Shipped;

        let refunded = order
            .handle_action(OrderAction::Refund { by: staff(), reason: None }, &())
            .await
            .unwrap();

        assert_eq!(refunded.status, OrderStatus::Refunded);
        assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
    }

    #[tokio::test]
    async fn tracking_only_while_in_transit() {
        let mut order = order(PaymentMethod::CashOnDelivery);
        let tracking = Tracking {
            carrier: Some("BlueDart".into()),
            tracking_number: Some("BD123".into()),
            estimated_delivery: None,
        };
        let early = order
            .handle_action(
                OrderAction::UpdateTracking {
                    by: staff(),
                    tracking: tracking.clone(),
                },
                &(),
            )
            .await;
        assert!(matches!(early, Err(OrderError::Validation(_))));

        order.status = OrderStatus::Packed;
        let updated = order
            .handle_action(OrderAction::UpdateTracking { by: staff(), tracking }, &())
            .await
            .unwrap();
        assert_eq!(updated.tracking.carrier.as_deref(), Some("BlueDart"));
    }
}
