use crate::db;
use crate::domain::models::Role;
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Spending above this (strictly) earns VIP on its own.
pub const VIP_SPEND_THRESHOLD: f64 = 100.0;

/// Delivered orders needed for the complaint-free path to VIP.
pub const VIP_ORDER_THRESHOLD: i64 = 3;

/// The promotion criteria over a customer's delivered-order history: total
/// spend above the threshold, or enough delivered orders with no approved
/// complaint attached to any of them.
pub fn qualifies_for_vip(total_spent: f64, delivered_orders: i64, approved_complaints: i64) -> bool {
    if total_spent > VIP_SPEND_THRESHOLD {
        return true;
    }
    delivered_orders >= VIP_ORDER_THRESHOLD && approved_complaints == 0
}

/// Re-evaluates an account's VIP standing and persists the promotion when
/// earned. Returns true when the account is (now or already) VIP. Staff and
/// visitors are ineligible. Runs after every successful checkout.
pub async fn evaluate_and_promote(pool: &PgPool, account_id: Uuid) -> Result<bool> {
    let Some(account) = db::find_account_by_id(pool, account_id).await? else {
        return Ok(false);
    };
    if !account.role.is_customer() {
        return Ok(false);
    }
    if account.role == Role::Vip {
        return Ok(true);
    }

    let total_spent = db::delivered_total(pool, account_id).await?;
    if total_spent > VIP_SPEND_THRESHOLD {
        db::set_account_role(pool, account_id, Role::Vip).await?;
        tracing::info!(account = %account.username, "promoted to VIP on spending");
        return Ok(true);
    }

    let delivered = db::delivered_order_ids(pool, account_id).await?;
    if delivered.len() as i64 >= VIP_ORDER_THRESHOLD {
        let approved = db::approved_complaints_for_orders(pool, &delivered).await?;
        if approved == 0 {
            db::set_account_role(pool, account_id, Role::Vip).await?;
            tracing::info!(account = %account.username, "promoted to VIP on order history");
            return Ok(true);
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_spender_qualifies() {
        assert!(qualifies_for_vip(150.0, 0, 0));
        assert!(qualifies_for_vip(100.01, 1, 5));
    }

    #[test]
    fn threshold_is_strict() {
        assert!(!qualifies_for_vip(100.0, 0, 0));
    }

    #[test]
    fn three_clean_orders_qualify() {
        assert!(qualifies_for_vip(50.0, 3, 0));
        assert!(qualifies_for_vip(0.0, 4, 0));
    }

    #[test]
    fn approved_complaint_vetoes_order_path() {
        assert!(!qualifies_for_vip(50.0, 3, 1));
    }

    #[test]
    fn too_few_orders_do_not_qualify() {
        assert!(!qualifies_for_vip(50.0, 2, 0));
    }
}
