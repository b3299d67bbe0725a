//! Document root aggregate: an estimate, invoice or credit note with its
//! status history, owned line groups and discounts, and cached totals.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::compute::Totals;
use crate::error::{EngineError, ValidationErrors};
use crate::models::amount::{Amount, RoundingMode};
use crate::models::discount::{CreateDiscount, DiscountLine};
use crate::models::group::{CreateLine, LineGroup, UpdateLine};

/// Document kind discriminant.
///
/// Kind-specific behavior (numbering tag, capability actions) is resolved
/// through explicit tables keyed on this value, not through subtyping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Estimation,
    Invoice,
    CreditNote,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Estimation => "estimation",
            DocumentKind::Invoice => "invoice",
            DocumentKind::CreditNote => "credit_note",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Estimation => "Estimation",
            DocumentKind::Invoice => "Invoice",
            DocumentKind::CreditNote => "Credit note",
        }
    }

    /// Single-letter tag embedded in the internal document number.
    pub fn number_tag(&self) -> &'static str {
        match self {
            DocumentKind::Estimation => "E",
            DocumentKind::Invoice => "I",
            DocumentKind::CreditNote => "C",
        }
    }
}

/// Document status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Wait,
    Valid,
    Invalid,
}

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 4] = [
        DocumentStatus::Draft,
        DocumentStatus::Wait,
        DocumentStatus::Valid,
        DocumentStatus::Invalid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Wait => "wait",
            DocumentStatus::Valid => "valid",
            DocumentStatus::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(DocumentStatus::Draft),
            "wait" => Ok(DocumentStatus::Wait),
            "valid" => Ok(DocumentStatus::Valid),
            "invalid" => Ok(DocumentStatus::Invalid),
            other => Err(EngineError::UnknownStatus {
                requested: other.to_string(),
            }),
        }
    }
}

/// Immutable record of one status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: DocumentStatus,
    pub actor_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub comment: Option<String>,
}

/// Company the document is emitted by.
#[derive(Debug, Clone)]
pub struct CompanyRef {
    pub company_id: Uuid,
    pub code: String,
}

/// Customer the document is addressed to.
#[derive(Debug, Clone)]
pub struct CustomerRef {
    pub customer_id: Uuid,
    pub code: String,
    pub full_address: String,
}

/// Project the document belongs to.
#[derive(Debug, Clone)]
pub struct ProjectRef {
    pub project_id: Uuid,
    pub code: String,
}

/// Organizational bucket within a project.
#[derive(Debug, Clone)]
pub struct PhaseRef {
    pub phase_id: Uuid,
    pub name: String,
}

/// Input for the document factory.
#[derive(Debug, Clone)]
pub struct NewDocument<'a> {
    pub kind: DocumentKind,
    pub company: &'a CompanyRef,
    pub customer: &'a CustomerRef,
    pub project: &'a ProjectRef,
    pub phase: &'a PhaseRef,
    /// Document date; today when absent.
    pub date: Option<NaiveDate>,
}

/// Input for updating document free-text fields. `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateDocument {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub workplace: Option<String>,
    pub payment_conditions: Option<String>,
    pub display_units: Option<bool>,
}

/// Root aggregate for an estimate, invoice or credit note.
///
/// Owns its groups, lines, discounts and status history exclusively; the
/// whole tree lives and dies together. The status field is private so that
/// transitions only happen through the state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub document_id: Uuid,
    pub kind: DocumentKind,
    status: DocumentStatus,
    statuses: Vec<StatusRecord>,
    pub name: String,
    pub date: NaiveDate,
    pub owner_id: Uuid,
    pub company_id: Uuid,
    pub customer_id: Uuid,
    pub project_id: Uuid,
    pub phase_id: Uuid,
    /// Last user who changed the status.
    pub status_actor_id: Uuid,
    pub status_date: DateTime<Utc>,
    company_index: i32,
    project_index: i32,
    internal_number: String,
    /// Externally assigned by the finance workflow, never by the engine.
    pub official_number: Option<String>,
    pub description: String,
    pub address: String,
    pub workplace: String,
    pub payment_conditions: String,
    pub display_units: bool,
    /// Flat before-tax addition outside the line groups.
    pub expenses_before_tax: Amount,
    pub rounding_mode: RoundingMode,
    cached: Totals,
    groups: Vec<LineGroup>,
    discounts: Vec<DiscountLine>,
    pub attachments: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Document factory. Indices come from the numbering service and must
    /// already be assigned; the internal number is stored once here and
    /// never recomputed.
    pub fn new(
        input: NewDocument<'_>,
        actor_id: Uuid,
        company_index: i32,
        project_index: i32,
        internal_number: String,
    ) -> Result<Document, EngineError> {
        if company_index < 1 || project_index < 1 {
            return Err(EngineError::Invariant(format!(
                "document indices must be assigned at creation (company: {}, project: {})",
                company_index, project_index
            )));
        }
        if internal_number.is_empty() {
            return Err(EngineError::Invariant(
                "internal number must be built at creation".to_string(),
            ));
        }

        let now = Utc::now();
        let mut document = Document {
            document_id: Uuid::new_v4(),
            kind: input.kind,
            status: DocumentStatus::Draft,
            statuses: Vec::new(),
            name: format!("{} {}", input.kind.label(), project_index),
            date: input.date.unwrap_or_else(|| now.date_naive()),
            owner_id: actor_id,
            company_id: input.company.company_id,
            customer_id: input.customer.customer_id,
            project_id: input.project.project_id,
            phase_id: input.phase.phase_id,
            status_actor_id: actor_id,
            status_date: now,
            company_index,
            project_index,
            internal_number,
            official_number: None,
            description: String::new(),
            address: input.customer.full_address.clone(),
            workplace: String::new(),
            payment_conditions: String::new(),
            display_units: false,
            expenses_before_tax: Amount::ZERO,
            rounding_mode: RoundingMode::Standard,
            cached: Totals::default(),
            groups: Vec::new(),
            discounts: Vec::new(),
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        // Every document starts with a default line group.
        document.groups.push(LineGroup::new(0));
        Ok(document)
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    /// Status history in append order (oldest first).
    pub fn history(&self) -> &[StatusRecord] {
        &self.statuses
    }

    pub fn company_index(&self) -> i32 {
        self.company_index
    }

    pub fn project_index(&self) -> i32 {
        self.project_index
    }

    pub fn internal_number(&self) -> &str {
        &self.internal_number
    }

    /// Cached totals, refreshed on every mutation before persistence.
    pub fn cached_totals(&self) -> Totals {
        self.cached
    }

    pub(crate) fn set_cached_totals(&mut self, totals: Totals) {
        self.cached = totals;
    }

    /// Apply a status change. Crate-internal: only the state machine calls
    /// this, and every call leaves a history record.
    pub(crate) fn apply_status(&mut self, record: StatusRecord) {
        self.status = record.status;
        self.status_actor_id = record.actor_id;
        self.status_date = record.occurred_at;
        self.statuses.push(record);
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // -------------------------------------------------------------------
    // Groups and lines
    // -------------------------------------------------------------------

    pub fn groups(&self) -> &[LineGroup] {
        &self.groups
    }

    /// Groups that actually hold lines; empty groups are skipped by
    /// aggregation and listings.
    pub fn active_groups(&self) -> impl Iterator<Item = &LineGroup> {
        self.groups.iter().filter(|group| !group.is_empty())
    }

    /// The group created at construction time.
    pub fn default_group(&self) -> &LineGroup {
        // A document always holds at least one group.
        &self.groups[0]
    }

    pub fn group(&self, group_id: Uuid) -> Option<&LineGroup> {
        self.groups.iter().find(|group| group.group_id == group_id)
    }

    /// All lines across all groups, in display order.
    pub fn all_lines(&self) -> impl Iterator<Item = &crate::models::group::Line> {
        self.groups.iter().flat_map(|group| group.lines().iter())
    }

    pub fn add_group(&mut self, title: &str, description: &str) -> Uuid {
        let mut group = LineGroup::new(self.groups.len() as i32);
        group.title = title.to_string();
        group.description = description.to_string();
        let group_id = group.group_id;
        self.groups.push(group);
        group_id
    }

    /// Remove a group and all its lines. A document keeps at least one
    /// group at all times.
    pub fn remove_group(&mut self, group_id: Uuid) -> Result<bool, EngineError> {
        if self.groups.len() == 1 && self.groups[0].group_id == group_id {
            return Err(ValidationErrors::single(
                "line_groups",
                "a document keeps at least one line group",
            )
            .into());
        }
        let before = self.groups.len();
        self.groups.retain(|group| group.group_id != group_id);
        if self.groups.len() == before {
            return Ok(false);
        }
        for (index, group) in self.groups.iter_mut().enumerate() {
            group.order = index as i32;
        }
        Ok(true)
    }

    pub fn add_line(&mut self, group_id: Uuid, input: CreateLine) -> Result<Uuid, EngineError> {
        let Some(group) = self
            .groups
            .iter_mut()
            .find(|group| group.group_id == group_id)
        else {
            return Err(ValidationErrors::single("group_id", "unknown line group").into());
        };
        group.add_line(input)
    }

    /// Patch a line wherever it lives.
    pub fn update_line(&mut self, line_id: Uuid, input: UpdateLine) -> Result<bool, EngineError> {
        for group in &mut self.groups {
            if group.line(line_id).is_some() {
                return group.update_line(line_id, input);
            }
        }
        Ok(false)
    }

    pub fn remove_line(&mut self, line_id: Uuid) -> bool {
        self.groups.iter_mut().any(|group| group.remove_line(line_id))
    }

    // -------------------------------------------------------------------
    // Discounts
    // -------------------------------------------------------------------

    pub fn discounts(&self) -> &[DiscountLine] {
        &self.discounts
    }

    pub fn add_discount(&mut self, input: CreateDiscount) -> Uuid {
        let discount = DiscountLine {
            discount_id: Uuid::new_v4(),
            description: input.description,
            amount: input.amount,
            tax_rate: input.tax_rate,
        };
        let discount_id = discount.discount_id;
        self.discounts.push(discount);
        // Discounts are kept grouped by rate for the tax breakdown.
        self.discounts.sort_by_key(|discount| discount.tax_rate);
        discount_id
    }

    pub fn remove_discount(&mut self, discount_id: Uuid) -> bool {
        let before = self.discounts.len();
        self.discounts
            .retain(|discount| discount.discount_id != discount_id);
        self.discounts.len() != before
    }

    // -------------------------------------------------------------------
    // Free-text fields
    // -------------------------------------------------------------------

    pub fn update_details(&mut self, input: UpdateDocument) {
        if let Some(date) = input.date {
            self.date = date;
        }
        if let Some(description) = input.description {
            self.description = description;
        }
        if let Some(address) = input.address {
            self.address = address;
        }
        if let Some(workplace) = input.workplace {
            self.workplace = workplace;
        }
        if let Some(payment_conditions) = input.payment_conditions {
            self.payment_conditions = payment_conditions;
        }
        if let Some(display_units) = input.display_units {
            self.display_units = display_units;
        }
    }
}
