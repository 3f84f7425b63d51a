use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "account_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Visitor,
    Customer,
    Vip,
    Chef,
    DeliveryPerson,
    Manager,
}

impl Role {
    /// Customer-tier accounts, i.e. those that can order and be promoted.
    pub fn is_customer(&self) -> bool {
        matches!(self, Role::Customer | Role::Vip)
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Chef | Role::DeliveryPerson | Role::Manager)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "bid_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "review_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

/// A manager's verdict on a complaint or compliment. Stored on the record as
/// text alongside the terminal `ReviewStatus`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl ReviewDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewDecision::Approved => "APPROVED",
            ReviewDecision::Rejected => "REJECTED",
        }
    }

    pub fn status(&self) -> ReviewStatus {
        match self {
            ReviewDecision::Approved => ReviewStatus::Approved,
            ReviewDecision::Rejected => ReviewStatus::Rejected,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "answer_source", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnswerSource {
    Local,
    Llm,
}

/// Statuses an order may be moved to through the update endpoint.
/// Cancellation is excluded; nothing sets it through this path.
pub fn is_settable_status(status: OrderStatus) -> bool {
    !matches!(status, OrderStatus::Cancelled)
}

/// Whether `role` may change an order's status right now. Managers may set
/// anything; chefs only act while the kitchen still owns the order; couriers
/// only touch orders assigned to them.
pub fn can_update_status(role: Role, current: OrderStatus, is_assigned_courier: bool) -> bool {
    match role {
        Role::Manager => true,
        Role::Chef => matches!(current, OrderStatus::Pending | OrderStatus::Preparing),
        Role::DeliveryPerson => is_assigned_courier,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_tiers() {
        assert!(Role::Customer.is_customer());
        assert!(Role::Vip.is_customer());
        assert!(!Role::Chef.is_customer());
        assert!(!Role::Visitor.is_customer());
        assert!(Role::Manager.is_staff());
    }

    #[test]
    fn manager_may_set_any_status() {
        for current in [
            OrderStatus::Pending,
            OrderStatus::Ready,
            OrderStatus::Delivered,
        ] {
            assert!(can_update_status(Role::Manager, current, false));
        }
    }

    #[test]
    fn chef_limited_to_kitchen_phases() {
        assert!(can_update_status(Role::Chef, OrderStatus::Pending, false));
        assert!(can_update_status(Role::Chef, OrderStatus::Preparing, false));
        assert!(!can_update_status(Role::Chef, OrderStatus::Ready, false));
        assert!(!can_update_status(
            Role::Chef,
            OrderStatus::OutForDelivery,
            false
        ));
    }

    #[test]
    fn courier_requires_assignment() {
        assert!(can_update_status(
            Role::DeliveryPerson,
            OrderStatus::OutForDelivery,
            true
        ));
        assert!(!can_update_status(
            Role::DeliveryPerson,
            OrderStatus::OutForDelivery,
            false
        ));
    }

    #[test]
    fn customers_never_update_status() {
        assert!(!can_update_status(Role::Customer, OrderStatus::Pending, false));
        assert!(!can_update_status(Role::Vip, OrderStatus::Pending, true));
    }

    #[test]
    fn cancelled_is_not_settable() {
        assert!(!is_settable_status(OrderStatus::Cancelled));
        assert!(is_settable_status(OrderStatus::Delivered));
    }
}
