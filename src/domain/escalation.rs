use crate::db;
use crate::domain::models::{ReviewDecision, ReviewStatus, Role};
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Warnings at which the filer is blacklisted and deactivated.
pub const BLACKLIST_THRESHOLD: i64 = 3;

/// Warnings at which a VIP filer falls back to Customer.
pub const DEMOTION_THRESHOLD: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationAction {
    None,
    Demote,
    Blacklist,
}

/// What the new all-time warning count earns the filer. Blacklisting is
/// checked first and supersedes demotion.
pub fn escalation_action(warning_count: i64, role: Role) -> EscalationAction {
    if warning_count >= BLACKLIST_THRESHOLD {
        EscalationAction::Blacklist
    } else if warning_count >= DEMOTION_THRESHOLD && role == Role::Vip {
        EscalationAction::Demote
    } else {
        EscalationAction::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Reviewed,
    NotFound,
    AlreadyReviewed,
}

/// Applies a manager's decision to a complaint. A rejected complaint earns
/// the filer a warning, and the warning count drives demotion/blacklisting.
/// A complaint is reviewed exactly once; anything past Pending is terminal.
pub async fn resolve_complaint(
    pool: &PgPool,
    complaint_id: Uuid,
    decision: ReviewDecision,
    notes: Option<&str>,
) -> Result<ReviewOutcome> {
    let Some(complaint) = db::find_complaint(pool, complaint_id).await? else {
        return Ok(ReviewOutcome::NotFound);
    };
    if complaint.status != ReviewStatus::Pending {
        return Ok(ReviewOutcome::AlreadyReviewed);
    }

    db::mark_complaint_reviewed(pool, complaint_id, decision.status(), decision.as_str(), notes)
        .await?;

    if decision == ReviewDecision::Rejected {
        let reason = format!(
            "Rejected complaint: {}",
            truncate_chars(&complaint.description, 100)
        );
        db::insert_warning(pool, complaint.filed_by, &reason, Some(complaint_id)).await?;

        let count = db::warning_count(pool, complaint.filed_by).await?;
        let Some(filer) = db::find_account_by_id(pool, complaint.filed_by).await? else {
            return Ok(ReviewOutcome::Reviewed);
        };

        match escalation_action(count, filer.role) {
            EscalationAction::Blacklist => {
                db::blacklist_account(
                    pool,
                    filer.id,
                    "3 warnings issued for rejected complaints",
                )
                .await?;
                db::set_account_active(pool, filer.id, false).await?;
                tracing::warn!(account = %filer.username, warnings = count, "account blacklisted");
            }
            EscalationAction::Demote => {
                db::set_account_role(pool, filer.id, Role::Customer).await?;
                tracing::info!(account = %filer.username, warnings = count, "VIP demoted to Customer");
            }
            EscalationAction::None => {}
        }
    }

    Ok(ReviewOutcome::Reviewed)
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_warning_does_nothing() {
        assert_eq!(escalation_action(1, Role::Customer), EscalationAction::None);
        assert_eq!(escalation_action(1, Role::Vip), EscalationAction::None);
    }

    #[test]
    fn second_warning_demotes_vip_only() {
        assert_eq!(escalation_action(2, Role::Vip), EscalationAction::Demote);
        assert_eq!(escalation_action(2, Role::Customer), EscalationAction::None);
    }

    #[test]
    fn third_warning_blacklists_everyone() {
        assert_eq!(
            escalation_action(3, Role::Customer),
            EscalationAction::Blacklist
        );
        assert_eq!(escalation_action(4, Role::Customer), EscalationAction::Blacklist);
    }

    #[test]
    fn blacklist_supersedes_demotion_for_vip() {
        assert_eq!(escalation_action(3, Role::Vip), EscalationAction::Blacklist);
    }

    #[test]
    fn reason_truncation_counts_chars() {
        let long = "x".repeat(250);
        assert_eq!(truncate_chars(&long, 100).len(), 100);
        assert_eq!(truncate_chars("short", 100), "short");

        // multi-byte input must not split a char
        let accented = "é".repeat(120);
        assert_eq!(truncate_chars(&accented, 100).chars().count(), 100);
    }
}
