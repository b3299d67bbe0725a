//! Document status lifecycle.
//!
//! The state machine is an explicit value constructed from a transition
//! table; it is injected where transitions are processed instead of living
//! in ambient global state. Guards and capability actions are registered at
//! construction time, keyed by target status.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{EngineError, ValidationErrors};
use crate::models::{Document, DocumentKind, DocumentStatus, StatusRecord};
use crate::services::cache::refresh_totals;

/// Acting user on whose behalf a transition is requested.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: Uuid,
    pub label: String,
}

/// Capability action names, `{domain}.{resource}:{action}` style.
pub mod capabilities {
    /// Submit an estimation for validation.
    pub const ESTIMATION_SUBMIT: &str = "sales.estimation:submit";
    /// Validate an estimation.
    pub const ESTIMATION_VALIDATE: &str = "sales.estimation:validate";
    /// Reject an estimation.
    pub const ESTIMATION_REJECT: &str = "sales.estimation:reject";
    /// Send an estimation back to draft.
    pub const ESTIMATION_REOPEN: &str = "sales.estimation:reopen";

    /// Submit an invoice for validation.
    pub const INVOICE_SUBMIT: &str = "sales.invoice:submit";
    /// Validate an invoice.
    pub const INVOICE_VALIDATE: &str = "sales.invoice:validate";
    /// Reject an invoice.
    pub const INVOICE_REJECT: &str = "sales.invoice:reject";
    /// Send an invoice back to draft.
    pub const INVOICE_REOPEN: &str = "sales.invoice:reopen";

    /// Submit a credit note for validation.
    pub const CREDIT_NOTE_SUBMIT: &str = "sales.credit_note:submit";
    /// Validate a credit note.
    pub const CREDIT_NOTE_VALIDATE: &str = "sales.credit_note:validate";
    /// Reject a credit note.
    pub const CREDIT_NOTE_REJECT: &str = "sales.credit_note:reject";
    /// Send a credit note back to draft.
    pub const CREDIT_NOTE_REOPEN: &str = "sales.credit_note:reopen";
}

/// Capability action guarding a transition, resolved per document kind.
pub fn transition_action(kind: DocumentKind, target: DocumentStatus) -> &'static str {
    use capabilities::*;
    match (kind, target) {
        (DocumentKind::Estimation, DocumentStatus::Wait) => ESTIMATION_SUBMIT,
        (DocumentKind::Estimation, DocumentStatus::Valid) => ESTIMATION_VALIDATE,
        (DocumentKind::Estimation, DocumentStatus::Invalid) => ESTIMATION_REJECT,
        (DocumentKind::Estimation, DocumentStatus::Draft) => ESTIMATION_REOPEN,
        (DocumentKind::Invoice, DocumentStatus::Wait) => INVOICE_SUBMIT,
        (DocumentKind::Invoice, DocumentStatus::Valid) => INVOICE_VALIDATE,
        (DocumentKind::Invoice, DocumentStatus::Invalid) => INVOICE_REJECT,
        (DocumentKind::Invoice, DocumentStatus::Draft) => INVOICE_REOPEN,
        (DocumentKind::CreditNote, DocumentStatus::Wait) => CREDIT_NOTE_SUBMIT,
        (DocumentKind::CreditNote, DocumentStatus::Valid) => CREDIT_NOTE_VALIDATE,
        (DocumentKind::CreditNote, DocumentStatus::Invalid) => CREDIT_NOTE_REJECT,
        (DocumentKind::CreditNote, DocumentStatus::Draft) => CREDIT_NOTE_REOPEN,
    }
}

/// Boolean capability check supplied by the host application. The machine
/// fails closed: a `false` answer rejects the transition.
pub trait CapabilityCheck: Send + Sync {
    fn may(&self, actor: &Actor, action: &str, document: &Document) -> bool;
}

/// Capability check that allows everything. For tests and trusted embeds.
#[derive(Debug, Default)]
pub struct AllowAll;

impl CapabilityCheck for AllowAll {
    fn may(&self, _actor: &Actor, _action: &str, _document: &Document) -> bool {
        true
    }
}

/// Event describing a completed status change.
#[derive(Debug, Clone)]
pub struct StatusChanged {
    pub document_id: Uuid,
    pub kind: DocumentKind,
    pub old_status: DocumentStatus,
    pub new_status: DocumentStatus,
    pub actor_id: Uuid,
    pub occurred_at: chrono::DateTime<Utc>,
}

/// Fire-and-forget observer for status changes; delivery semantics belong
/// to the host application.
pub trait StatusObserver: Send + Sync {
    fn status_changed(&self, event: &StatusChanged);
}

/// Observer that drops every event.
#[derive(Debug, Default)]
pub struct NullObserver;

impl StatusObserver for NullObserver {
    fn status_changed(&self, _event: &StatusChanged) {}
}

/// Request for a status transition.
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub target: DocumentStatus,
    pub comment: Option<String>,
}

type Guard = fn(&Document) -> Result<(), ValidationErrors>;

/// One entry of the transition table.
struct TransitionRule {
    target: DocumentStatus,
    from: &'static [DocumentStatus],
    guard: Option<Guard>,
}

/// Explicit state machine over document statuses.
pub struct StateMachine {
    rules: Vec<TransitionRule>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Machine with the standard table: draft → wait/valid,
    /// wait → valid/invalid/draft, invalid → draft/wait, valid terminal.
    pub fn new() -> Self {
        use DocumentStatus::*;
        StateMachine {
            rules: vec![
                TransitionRule {
                    target: Wait,
                    from: &[Draft, Invalid],
                    guard: Some(well_formed),
                },
                TransitionRule {
                    target: Valid,
                    from: &[Draft, Wait],
                    guard: Some(well_formed),
                },
                TransitionRule {
                    target: Invalid,
                    from: &[Wait],
                    guard: None,
                },
                TransitionRule {
                    target: Draft,
                    from: &[Wait, Invalid],
                    guard: None,
                },
            ],
        }
    }

    /// Target statuses reachable from `from`.
    pub fn allowed_from(&self, from: DocumentStatus) -> Vec<DocumentStatus> {
        self.rules
            .iter()
            .filter(|rule| rule.from.contains(&from))
            .map(|rule| rule.target)
            .collect()
    }

    /// Check reachability without applying anything.
    pub fn check_allowed(
        &self,
        document: &Document,
        target: DocumentStatus,
    ) -> Result<(), EngineError> {
        let from = document.status();
        if target == from {
            return Ok(());
        }
        let reachable = self
            .rules
            .iter()
            .any(|rule| rule.target == target && rule.from.contains(&from));
        if reachable {
            Ok(())
        } else {
            Err(EngineError::IllegalTransition {
                from,
                requested: target,
                allowed: self.allowed_from(from),
            })
        }
    }

    /// Process a transition request: reachability, capability gate, guard,
    /// then status update + history record + totals refresh, and finally
    /// the observer notification.
    ///
    /// A same-state request is a no-op: `Ok(None)`, no history record, no
    /// notification.
    #[instrument(
        skip(self, document, capabilities, observer),
        fields(document_id = %document.document_id, kind = document.kind.as_str())
    )]
    pub fn process(
        &self,
        document: &mut Document,
        request: TransitionRequest,
        actor: &Actor,
        capabilities: &dyn CapabilityCheck,
        observer: &dyn StatusObserver,
    ) -> Result<Option<StatusChanged>, EngineError> {
        let old_status = document.status();
        if request.target == old_status {
            return Ok(None);
        }

        self.check_allowed(document, request.target)?;

        let action = transition_action(document.kind, request.target);
        if !capabilities.may(actor, action, document) {
            return Err(EngineError::Forbidden {
                actor: actor.user_id,
                action: action.to_string(),
            });
        }

        if let Some(guard) = self
            .rules
            .iter()
            .find(|rule| rule.target == request.target)
            .and_then(|rule| rule.guard)
        {
            guard(document)?;
        }

        let occurred_at = Utc::now();
        document.apply_status(StatusRecord {
            status: request.target,
            actor_id: actor.user_id,
            occurred_at,
            comment: request.comment,
        });
        refresh_totals(document);

        let event = StatusChanged {
            document_id: document.document_id,
            kind: document.kind,
            old_status,
            new_status: request.target,
            actor_id: actor.user_id,
            occurred_at,
        };
        observer.status_changed(&event);

        info!(
            old_status = old_status.as_str(),
            new_status = request.target.as_str(),
            actor = %actor.user_id,
            "Document status changed"
        );

        Ok(Some(event))
    }
}

/// Well-formedness guard for submission and validation: the document needs
/// at least one line somewhere and its required free-text fields filled in.
fn well_formed(document: &Document) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if document.active_groups().next().is_none() {
        errors.push("line_groups", "at least one line is required");
    }
    if document.description.trim().is_empty() {
        errors.push("description", "this field is required");
    }
    if document.address.trim().is_empty() {
        errors.push("address", "this field is required");
    }
    if document.payment_conditions.trim().is_empty() {
        errors.push("payment_conditions", "this field is required");
    }
    errors.into_result()
}
