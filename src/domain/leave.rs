use derive_more::Display;

use crate::model::leave::{LeaveRequest, LeaveStatus};
use crate::model::role::Role;

/// The workflow itself is role-agnostic: callers are expected to have gated
/// the actor's role before invoking a transition. `actor` is only recorded
/// on rejection so the record says which gate turned the request down.
#[derive(Debug, PartialEq, Display)]
pub enum LeaveError {
    #[display(fmt = "Cannot move a {} request to {}", from, to)]
    InvalidTransition { from: LeaveStatus, to: LeaveStatus },
    #[display(fmt = "Leave request is already finalized")]
    NotEditable,
}

/// Advances a request one gate. Legal moves:
/// `PENDING_MANAGER -> PENDING_HR -> APPROVED`, with `REJECTED` reachable
/// from either pending state. Everything else is refused, including any
/// move out of a terminal state.
pub fn advance(
    request: &mut LeaveRequest,
    target: LeaveStatus,
    comment: Option<String>,
    actor: Role,
) -> Result<(), LeaveError> {
    let comment = comment.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());

    match (request.status, target) {
        (LeaveStatus::PendingManager, LeaveStatus::PendingHr) => {
            request.manager_comment = comment;
        }
        (LeaveStatus::PendingHr, LeaveStatus::Approved) => {
            request.hr_comment = comment;
        }
        (LeaveStatus::PendingManager | LeaveStatus::PendingHr, LeaveStatus::Rejected) => {
            request.rejected_by = Some(actor);
            request.rejection_comment = comment;
        }
        (from, to) => return Err(LeaveError::InvalidTransition { from, to }),
    }

    request.status = target;
    Ok(())
}

/// Owner edits are allowed only while the request is still in the pipeline.
/// An edit does not reset the request to `PENDING_MANAGER`.
pub fn ensure_editable(request: &LeaveRequest) -> Result<(), LeaveError> {
    if request.status.is_terminal() {
        return Err(LeaveError::NotEditable);
    }
    Ok(())
}

/// Notification text for a fresh submission. Urgency only decorates the
/// message, it never affects routing.
pub fn submission_message(recipients: &str, is_urgent: bool) -> String {
    let prefix = if is_urgent { "[URGENT] " } else { "" };
    format!("{prefix}Leave request sent. Notified: {recipients}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn request(status: LeaveStatus) -> LeaveRequest {
        LeaveRequest {
            id: 1,
            user_id: 1,
            user_name: "Alice Employee".into(),
            leave_type: "Annual Leave".into(),
            start_date: "2026-06-10".parse().unwrap(),
            end_date: "2026-06-15".parse().unwrap(),
            reason: "Family vacation".into(),
            status,
            manager_comment: None,
            hr_comment: None,
            rejected_by: None,
            rejection_comment: None,
            created_at: Utc::now(),
            is_urgent: false,
            notify_user_ids: Vec::new(),
            attachment_url: None,
        }
    }

    #[test]
    fn happy_path_walks_both_gates() {
        let mut req = request(LeaveStatus::PendingManager);

        advance(
            &mut req,
            LeaveStatus::PendingHr,
            Some("ok".into()),
            Role::Manager,
        )
        .unwrap();
        assert_eq!(req.status, LeaveStatus::PendingHr);
        assert_eq!(req.manager_comment.as_deref(), Some("ok"));

        advance(
            &mut req,
            LeaveStatus::Approved,
            Some("approved".into()),
            Role::Hr,
        )
        .unwrap();
        assert_eq!(req.status, LeaveStatus::Approved);
        assert_eq!(req.hr_comment.as_deref(), Some("approved"));
    }

    #[test]
    fn rejection_records_the_gate_that_refused() {
        let mut req = request(LeaveStatus::PendingManager);
        advance(
            &mut req,
            LeaveStatus::Rejected,
            Some("short staffed".into()),
            Role::Manager,
        )
        .unwrap();
        assert_eq!(req.rejected_by, Some(Role::Manager));
        assert_eq!(req.rejection_comment.as_deref(), Some("short staffed"));
        assert_eq!(req.manager_comment, None);

        let mut req = request(LeaveStatus::PendingHr);
        advance(&mut req, LeaveStatus::Rejected, None, Role::Hr).unwrap();
        assert_eq!(req.rejected_by, Some(Role::Hr));
        assert_eq!(req.hr_comment, None);
    }

    #[test]
    fn pipeline_never_reenters_pending_manager() {
        let mut req = request(LeaveStatus::PendingHr);
        let result = advance(&mut req, LeaveStatus::PendingManager, None, Role::Manager);
        assert_eq!(
            result,
            Err(LeaveError::InvalidTransition {
                from: LeaveStatus::PendingHr,
                to: LeaveStatus::PendingManager,
            })
        );
        assert_eq!(req.status, LeaveStatus::PendingHr);
    }

    #[test]
    fn manager_gate_cannot_skip_to_approved() {
        let mut req = request(LeaveStatus::PendingManager);
        let result = advance(&mut req, LeaveStatus::Approved, None, Role::Hr);
        assert!(result.is_err());
    }

    #[test]
    fn terminal_states_are_final() {
        for terminal in [LeaveStatus::Approved, LeaveStatus::Rejected] {
            let mut req = request(terminal);
            for target in [
                LeaveStatus::PendingManager,
                LeaveStatus::PendingHr,
                LeaveStatus::Approved,
                LeaveStatus::Rejected,
            ] {
                assert!(advance(&mut req, target, None, Role::Hr).is_err());
            }
            assert_eq!(req.status, terminal);
        }
    }

    #[test]
    fn edits_allowed_only_while_pending() {
        assert!(ensure_editable(&request(LeaveStatus::PendingManager)).is_ok());
        assert!(ensure_editable(&request(LeaveStatus::PendingHr)).is_ok());
        assert!(ensure_editable(&request(LeaveStatus::Approved)).is_err());
        assert!(ensure_editable(&request(LeaveStatus::Rejected)).is_err());
    }

    #[test]
    fn urgency_only_prefixes_the_message() {
        assert_eq!(
            submission_message("Manager", false),
            "Leave request sent. Notified: Manager"
        );
        assert_eq!(
            submission_message("Bob Manager, Eve Exec", true),
            "[URGENT] Leave request sent. Notified: Bob Manager, Eve Exec"
        );
    }
}
