//! [`ActorEntity`] implementation for [`Customer`].

use super::actions::CustomerAction;
use super::error::CustomerError;
use crate::model::{Customer, CustomerCreate, CustomerId, CustomerUpdate};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// One point per full 100 currency units.
pub fn loyalty_points_for(amount: Decimal) -> u64 {
    if amount <= Decimal::ZERO {
        return 0;
    }
    (amount / Decimal::ONE_HUNDRED).floor().to_u64().unwrap_or(0)
}

fn check_profile(name: &str, email: &str) -> Result<(), CustomerError> {
    if name.trim().is_empty() {
        return Err(CustomerError::InvalidProfile("name is blank".into()));
    }
    if !email.contains('@') {
        return Err(CustomerError::InvalidProfile(format!(
            "{email:?} is not an email address"
        )));
    }
    Ok(())
}

#[async_trait]
impl ActorEntity for Customer {
    type Id = CustomerId;
    type Create = CustomerCreate;
    type Update = CustomerUpdate;
    type Action = CustomerAction;
    type ActionResult = Customer;
    type Context = ();
    type Error = CustomerError;

    fn assign_id(sequence: u64, _params: &CustomerCreate) -> CustomerId {
        CustomerId(sequence)
    }

    fn id(&self) -> CustomerId {
        self.id
    }

    fn sequence(&self) -> Option<u64> {
        Some(self.id.0)
    }

    fn from_create_params(id: CustomerId, params: CustomerCreate) -> Result<Self, CustomerError> {
        check_profile(&params.name, &params.email)?;
        Ok(Customer::new(id, params.name, params.email, params.role))
    }

    async fn on_update(&mut self, update: CustomerUpdate, _ctx: &()) -> Result<(), CustomerError> {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        check_profile(&self.name, &self.email)
    }

    async fn handle_action(
        &mut self,
        action: CustomerAction,
        _ctx: &(),
    ) -> Result<Customer, CustomerError> {
        match action {
            CustomerAction::RecordPurchase {
                order_number,
                amount,
            } => {
                if !self.order_history.contains(&order_number) {
                    self.order_history.push(order_number);
                    self.total_spent += amount;
                    self.loyalty_points += loyalty_points_for(amount);
                }
            }
        }
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderNumber;

    #[test]
    fn loyalty_points_are_floored() {
        assert_eq!(loyalty_points_for(Decimal::from(878)), 8);
        assert_eq!(loyalty_points_for(Decimal::new(9999, 2)), 0);
        assert_eq!(loyalty_points_for(Decimal::from(100)), 1);
    }

    #[tokio::test]
    async fn recording_a_purchase_twice_counts_once() {
        let mut customer = Customer::from_create_params(
            CustomerId(1),
            CustomerCreate::shopper("Asha", "asha@example.com"),
        )
        .unwrap();
        let purchase = CustomerAction::RecordPurchase {
            order_number: OrderNumber::from("ORD-20261018-AAAAAA"),
            amount: Decimal::from(878),
        };

        customer.handle_action(purchase.clone(), &()).await.unwrap();
        let after = customer.handle_action(purchase, &()).await.unwrap();

        assert_eq!(after.order_history.len(), 1);
        assert_eq!(after.total_spent, Decimal::from(878));
        assert_eq!(after.loyalty_points, 8);
    }

    #[test]
    fn email_must_look_like_one() {
        let result = Customer::from_create_params(
            CustomerId(1),
            CustomerCreate::shopper("Asha", "asha.example.com"),
        );
        assert!(matches!(result, Err(CustomerError::InvalidProfile(_))));
    }
}
