// letter-rendering-service/src/workflow.rs

use crate::error::{LetterError, Result};
use crate::models::{Request, RequestStatus};
use crate::numbering::LetterNumberGenerator;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Host-side toast/notification surface.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn notify(&self, notice: Notice);
}

/// Host-side confirmation dialog. Returns `true` when the reviewer agrees.
#[async_trait]
pub trait ConfirmationPort: Send + Sync {
    async fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Inputs for the number assigned at approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberingContext {
    pub pattern: String,
    pub sequence: u32,
    pub code: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    Submit,
    Verify,
    Approve(NumberingContext),
    Reject { reason: String },
    RequestRevision { note: String },
}

impl ReviewAction {
    pub fn name(&self) -> &'static str {
        match self {
            ReviewAction::Submit => "submit",
            ReviewAction::Verify => "verify",
            ReviewAction::Approve(_) => "approve",
            ReviewAction::Reject { .. } => "reject",
            ReviewAction::RequestRevision { .. } => "request revision for",
        }
    }

    /// Indonesian verb shown in the confirmation dialog.
    fn verb(&self) -> &'static str {
        match self {
            ReviewAction::Submit => "mengajukan",
            ReviewAction::Verify => "memverifikasi",
            ReviewAction::Approve(_) => "menyetujui",
            ReviewAction::Reject { .. } => "menolak",
            ReviewAction::RequestRevision { .. } => "meminta revisi",
        }
    }

    fn needs_confirmation(&self) -> bool {
        matches!(self, ReviewAction::Approve(_) | ReviewAction::Reject { .. })
    }
}

impl RequestStatus {
    /// Status reached by applying `action`, if the transition is allowed.
    pub fn next(self, action: &ReviewAction) -> Result<RequestStatus> {
        use RequestStatus::*;
        let next = match (self, action) {
            (Draft | RevisionRequested, ReviewAction::Submit) => PendingVerification,
            (PendingVerification, ReviewAction::Verify) => Verified,
            (Verified, ReviewAction::Approve(_)) => Approved,
            (PendingVerification | Verified, ReviewAction::Reject { .. }) => Rejected,
            (PendingVerification | Verified, ReviewAction::RequestRevision { .. }) => RevisionRequested,
            (from, action) => {
                return Err(LetterError::InvalidTransition {
                    from,
                    action: action.name(),
                })
            }
        };
        Ok(next)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied(RequestStatus),
    /// The reviewer declined the confirmation; nothing changed.
    Cancelled,
}

/// Verifier/admin actions on a request, with UI effects behind ports.
pub struct ReviewWorkflow<N, C> {
    notifier: N,
    confirmer: C,
    numbers: LetterNumberGenerator,
}

impl<N, C> ReviewWorkflow<N, C>
where
    N: NotificationPort,
    C: ConfirmationPort,
{
    pub fn new(notifier: N, confirmer: C, numbers: LetterNumberGenerator) -> Self {
        Self {
            notifier,
            confirmer,
            numbers,
        }
    }

    pub async fn perform(&self, request: &mut Request, action: ReviewAction) -> Result<ActionOutcome> {
        let next = match self.validate(request, &action) {
            Ok(next) => next,
            Err(e) => {
                warn!(request_id = %request.id, error = %e, "Rejected review action");
                self.notifier
                    .notify(Notice {
                        level: NoticeLevel::Error,
                        message: e.to_string(),
                    })
                    .await;
                return Err(e);
            }
        };

        if action.needs_confirmation() {
            let message = format!("Yakin ingin {} permohonan {}?", action.verb(), request.id);
            if !self.confirmer.confirm("Konfirmasi", &message).await {
                info!(request_id = %request.id, action = action.name(), "Review action cancelled");
                return Ok(ActionOutcome::Cancelled);
            }
        }

        match &action {
            ReviewAction::Approve(ctx) => {
                let number =
                    self.numbers
                        .number_for(request, &ctx.pattern, ctx.sequence, &ctx.code, ctx.date);
                request.assigned_number = Some(number);
                request.letter_date.get_or_insert(ctx.date);
                request.review_note = None;
            }
            ReviewAction::Reject { reason } => request.review_note = Some(reason.trim().to_string()),
            ReviewAction::RequestRevision { note } => request.review_note = Some(note.trim().to_string()),
            ReviewAction::Submit | ReviewAction::Verify => {}
        }

        let previous = request.status;
        request.status = next;

        info!(
            request_id = %request.id,
            from = %previous,
            to = %next,
            number = request.assigned_number.as_deref().unwrap_or(""),
            "Request status changed"
        );

        let message = match next {
            RequestStatus::Approved => format!(
                "Permohonan disetujui dengan nomor {}",
                request.assigned_number.as_deref().unwrap_or_default()
            ),
            other => format!("Status permohonan: {}", other),
        };
        self.notifier
            .notify(Notice {
                level: NoticeLevel::Success,
                message,
            })
            .await;

        Ok(ActionOutcome::Applied(next))
    }

    fn validate(&self, request: &Request, action: &ReviewAction) -> Result<RequestStatus> {
        match action {
            ReviewAction::Reject { reason } if reason.trim().is_empty() => {
                return Err(LetterError::MissingField("reason".to_string()))
            }
            ReviewAction::RequestRevision { note } if note.trim().is_empty() => {
                return Err(LetterError::MissingField("note".to_string()))
            }
            _ => {}
        }
        request.status.next(action)
    }
}
