//! Who is asking. The identity provider authenticates; this crate only trusts the
//! [`Principal`] it is handed.

use crate::model::CustomerId;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Staff,
    Admin,
}

impl Role {
    /// Where a freshly signed-in user of this role lands.
    pub fn landing_path(self) -> &'static str {
        match self {
            Self::Customer => "/shop",
            Self::Staff => "/staff/orders",
            Self::Admin => "/admin/dashboard",
        }
    }

    pub fn is_staff(self) -> bool {
        matches!(self, Self::Staff | Self::Admin)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Customer => "customer",
            Self::Staff => "staff",
            Self::Admin => "admin",
        };
        f.write_str(name)
    }
}

/// An authenticated customer identifier and role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub customer: CustomerId,
    pub role: Role,
}

impl Principal {
    pub fn customer(customer: CustomerId) -> Self {
        Self {
            customer,
            role: Role::Customer,
        }
    }

    pub fn staff(customer: CustomerId) -> Self {
        Self {
            customer,
            role: Role::Staff,
        }
    }

    pub fn admin(customer: CustomerId) -> Self {
        Self {
            customer,
            role: Role::Admin,
        }
    }

    /// Staff see everything; customers see only what they own.
    pub fn can_access(&self, owner: CustomerId) -> bool {
        self.role.is_staff() || self.customer == owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_has_a_landing_path() {
        assert_eq!(Role::Customer.landing_path(), "/shop");
        assert_eq!(Role::Staff.landing_path(), "/staff/orders");
        assert_eq!(Role::Admin.landing_path(), "/admin/dashboard");
    }

    #[test]
    fn ownership_rules() {
        let alice = CustomerId(1);
        let bob = CustomerId(2);
        assert!(Principal::customer(alice).can_access(alice));
        assert!(!Principal::customer(bob).can_access(alice));
        assert!(Principal::staff(bob).can_access(alice));
    }
}
