//! Document engine: mutation wrapping over the repository.
//!
//! Every operation follows the same shape: load the aggregate, apply the
//! change, refresh the cached totals, save. The caller supplies the
//! transaction boundary; from its perspective the engine never persists a
//! document whose cache disagrees with its lines.

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::compute::document_totals;
use crate::error::{EngineError, ValidationErrors};
use crate::models::{
    Amount, CreateDiscount, CreateLine, Document, DocumentStatus, NewDocument, RoundingMode,
    UpdateDocument, UpdateLine,
};
use crate::services::cache::refresh_totals;
use crate::services::lifecycle::{
    Actor, CapabilityCheck, StateMachine, StatusObserver, TransitionRequest,
};
use crate::services::numbering::{build_internal_number, SequenceStore};
use crate::services::repository::DocumentRepository;

/// Engine facade over one repository and its collaborators.
pub struct DocumentEngine<R> {
    repository: R,
    sequences: Arc<dyn SequenceStore>,
    machine: StateMachine,
    capabilities: Arc<dyn CapabilityCheck>,
    observer: Arc<dyn StatusObserver>,
}

impl<R: DocumentRepository> DocumentEngine<R> {
    pub fn new(
        repository: R,
        sequences: Arc<dyn SequenceStore>,
        capabilities: Arc<dyn CapabilityCheck>,
        observer: Arc<dyn StatusObserver>,
    ) -> Self {
        DocumentEngine {
            repository,
            sequences,
            machine: StateMachine::new(),
            capabilities,
            observer,
        }
    }

    /// Replace the default transition table.
    pub fn with_machine(mut self, machine: StateMachine) -> Self {
        self.machine = machine;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Create a numbered draft document with its default line group and
    /// persist it.
    #[instrument(skip(self, input, actor), fields(kind = input.kind.as_str(), actor = %actor.user_id))]
    pub fn create(&self, input: NewDocument<'_>, actor: &Actor) -> Result<Document, EngineError> {
        let company_index = self.sequences.next_company_index(input.company.company_id)?;
        let project_index = self.sequences.next_project_index(input.project.project_id)?;

        // Resolve the date once so the stored date and the one embedded in
        // the internal number cannot disagree.
        let date = input.date.unwrap_or_else(|| chrono::Utc::now().date_naive());
        let input = NewDocument {
            date: Some(date),
            ..input
        };
        let internal_number = build_internal_number(
            input.kind,
            &input.company.code,
            &input.customer.code,
            project_index,
            date,
        );

        let mut document = Document::new(
            input,
            actor.user_id,
            company_index,
            project_index,
            internal_number,
        )?;
        refresh_totals(&mut document);
        self.repository.save(&document)?;

        info!(
            document_id = %document.document_id,
            internal_number = document.internal_number(),
            company_index = company_index,
            project_index = project_index,
            "Document created"
        );

        Ok(document)
    }

    pub fn get(&self, document_id: Uuid) -> Result<Document, EngineError> {
        self.repository
            .load(document_id)?
            .ok_or(EngineError::NotFound(document_id))
    }

    /// Delete the aggregate; owned children go with it.
    #[instrument(skip(self))]
    pub fn delete(&self, document_id: Uuid) -> Result<bool, EngineError> {
        let deleted = self.repository.delete(document_id)?;
        if deleted {
            info!(document_id = %document_id, "Document deleted");
        }
        Ok(deleted)
    }

    // -------------------------------------------------------------------
    // Structural mutations (lines, groups, discounts, amounts)
    // -------------------------------------------------------------------

    pub fn add_group(
        &self,
        document_id: Uuid,
        title: &str,
        description: &str,
    ) -> Result<Uuid, EngineError> {
        self.mutate(document_id, |document| {
            Ok(document.add_group(title, description))
        })
    }

    pub fn remove_group(&self, document_id: Uuid, group_id: Uuid) -> Result<bool, EngineError> {
        self.mutate(document_id, |document| document.remove_group(group_id))
    }

    pub fn add_line(
        &self,
        document_id: Uuid,
        group_id: Uuid,
        input: CreateLine,
    ) -> Result<Uuid, EngineError> {
        self.mutate(document_id, |document| document.add_line(group_id, input))
    }

    pub fn update_line(
        &self,
        document_id: Uuid,
        line_id: Uuid,
        input: UpdateLine,
    ) -> Result<bool, EngineError> {
        self.mutate(document_id, |document| document.update_line(line_id, input))
    }

    pub fn remove_line(&self, document_id: Uuid, line_id: Uuid) -> Result<bool, EngineError> {
        self.mutate(document_id, |document| Ok(document.remove_line(line_id)))
    }

    pub fn add_discount(
        &self,
        document_id: Uuid,
        input: CreateDiscount,
    ) -> Result<Uuid, EngineError> {
        self.mutate(document_id, |document| Ok(document.add_discount(input)))
    }

    pub fn remove_discount(
        &self,
        document_id: Uuid,
        discount_id: Uuid,
    ) -> Result<bool, EngineError> {
        self.mutate(document_id, |document| {
            Ok(document.remove_discount(discount_id))
        })
    }

    pub fn set_expenses(
        &self,
        document_id: Uuid,
        expenses_before_tax: Amount,
    ) -> Result<(), EngineError> {
        self.mutate(document_id, |document| {
            document.expenses_before_tax = expenses_before_tax;
            Ok(())
        })
    }

    pub fn set_rounding_mode(
        &self,
        document_id: Uuid,
        mode: RoundingMode,
    ) -> Result<(), EngineError> {
        self.mutate(document_id, |document| {
            document.rounding_mode = mode;
            Ok(())
        })
    }

    pub fn update_details(
        &self,
        document_id: Uuid,
        input: UpdateDocument,
    ) -> Result<Document, EngineError> {
        self.mutate(document_id, |document| {
            document.update_details(input);
            Ok(document.clone())
        })
    }

    /// Duplicate an existing line in place (same group, appended at the
    /// end), optionally negating its cost for a cancellation entry.
    pub fn duplicate_line(
        &self,
        document_id: Uuid,
        line_id: Uuid,
        negate: bool,
    ) -> Result<Uuid, EngineError> {
        self.mutate(document_id, |document| {
            let Some((group_id, line)) = document.groups().iter().find_map(|group| {
                group
                    .line(line_id)
                    .map(|line| (group.group_id, line.clone()))
            }) else {
                return Err(ValidationErrors::single("line_id", "unknown line").into());
            };
            let copy = if negate {
                line.credit_copy()
            } else {
                line.duplicate()
            };
            document.add_line(
                group_id,
                CreateLine {
                    description: copy.description,
                    cost: copy.cost,
                    quantity: copy.quantity,
                    tax_rate: copy.tax_rate,
                    unit: copy.unit,
                    product_id: copy.product_id,
                },
            )
        })
    }

    // -------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------

    /// Request a status transition through the state machine.
    #[instrument(skip(self, actor, comment), fields(actor = %actor.user_id, target = target.as_str()))]
    pub fn set_status(
        &self,
        document_id: Uuid,
        target: DocumentStatus,
        actor: &Actor,
        comment: Option<String>,
    ) -> Result<Document, EngineError> {
        let mut document = self.get(document_id)?;
        let changed = self.machine.process(
            &mut document,
            TransitionRequest { target, comment },
            actor,
            self.capabilities.as_ref(),
            self.observer.as_ref(),
        )?;
        if changed.is_some() {
            document.touch();
            self.repository.save(&document)?;
        }
        Ok(document)
    }

    /// Totals straight from the line data, bypassing the cache. Mostly
    /// useful to assert cache consistency from the outside.
    pub fn computed_totals(&self, document_id: Uuid) -> Result<crate::compute::Totals, EngineError> {
        Ok(document_totals(&self.get(document_id)?))
    }

    /// Load, apply, refresh cached totals, save.
    fn mutate<T>(
        &self,
        document_id: Uuid,
        apply: impl FnOnce(&mut Document) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let mut document = self.get(document_id)?;
        ensure_editable(&document)?;
        let output = apply(&mut document)?;
        refresh_totals(&mut document);
        document.touch();
        self.repository.save(&document)?;
        Ok(output)
    }
}

/// Structural edits are only accepted while the document is still being
/// worked on; submitted or validated documents are frozen.
fn ensure_editable(document: &Document) -> Result<(), EngineError> {
    match document.status() {
        DocumentStatus::Draft | DocumentStatus::Invalid => Ok(()),
        status => Err(ValidationErrors::single(
            "status",
            &format!("a '{}' document can no longer be edited", status),
        )
        .into()),
    }
}
