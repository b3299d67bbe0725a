//! Serialization contract toward the UI/API layer.
//!
//! Every amount crossing this boundary is converted from the internal
//! scaled integer to a decimal with the field's declared precision (5
//! fractional digits for amounts, 2 for tax rates). Raw scaled integers
//! never leave the engine.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::compute::tax_by_rate;
use crate::models::{
    DiscountLine, Document, DocumentKind, DocumentStatus, Line, LineGroup, RoundingMode,
    StatusRecord,
};

/// One status history entry.
#[derive(Debug, Clone, Serialize)]
pub struct StatusRecordDto {
    pub status: DocumentStatus,
    pub actor_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub comment: Option<String>,
}

impl From<&StatusRecord> for StatusRecordDto {
    fn from(record: &StatusRecord) -> Self {
        StatusRecordDto {
            status: record.status,
            actor_id: record.actor_id,
            occurred_at: record.occurred_at,
            comment: record.comment.clone(),
        }
    }
}

/// One line, amounts as decimals.
#[derive(Debug, Clone, Serialize)]
pub struct LineDto {
    pub line_id: Uuid,
    pub order: i32,
    pub description: String,
    pub cost: Decimal,
    pub quantity: Decimal,
    pub tax_rate: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<Uuid>,
}

impl From<&Line> for LineDto {
    fn from(line: &Line) -> Self {
        LineDto {
            line_id: line.line_id,
            order: line.order,
            description: line.description.clone(),
            cost: line.cost.to_decimal(),
            quantity: line.quantity,
            tax_rate: line.tax_rate.to_decimal(),
            unit: line.unit.clone(),
            product_id: line.product_id,
        }
    }
}

/// One line group with its nested lines.
#[derive(Debug, Clone, Serialize)]
pub struct LineGroupDto {
    pub group_id: Uuid,
    pub order: i32,
    pub title: String,
    pub description: String,
    pub lines: Vec<LineDto>,
}

impl From<&LineGroup> for LineGroupDto {
    fn from(group: &LineGroup) -> Self {
        LineGroupDto {
            group_id: group.group_id,
            order: group.order,
            title: group.title.clone(),
            description: group.description.clone(),
            lines: group.lines().iter().map(LineDto::from).collect(),
        }
    }
}

/// One document-level discount.
#[derive(Debug, Clone, Serialize)]
pub struct DiscountDto {
    pub discount_id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub tax_rate: Decimal,
}

impl From<&DiscountLine> for DiscountDto {
    fn from(discount: &DiscountLine) -> Self {
        DiscountDto {
            discount_id: discount.discount_id,
            description: discount.description.clone(),
            amount: discount.amount.to_decimal(),
            tax_rate: discount.tax_rate.to_decimal(),
        }
    }
}

/// Tax owed at one rate.
#[derive(Debug, Clone, Serialize)]
pub struct TaxSummaryDto {
    pub tax_rate: Decimal,
    pub tax: Decimal,
}

/// Flat document representation for the UI/API layer.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentDto {
    pub document_id: Uuid,
    pub kind: DocumentKind,
    pub name: String,
    pub status: DocumentStatus,
    /// Newest first.
    pub status_history: Vec<StatusRecordDto>,
    pub date: NaiveDate,
    pub owner_id: Uuid,
    pub company_id: Uuid,
    pub customer_id: Uuid,
    pub project_id: Uuid,
    pub phase_id: Uuid,
    pub company_index: i32,
    pub project_index: i32,
    pub internal_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official_number: Option<String>,
    pub description: String,
    pub address: String,
    pub workplace: String,
    pub payment_conditions: String,
    pub display_units: bool,
    pub rounding_mode: RoundingMode,
    pub expenses_before_tax: Decimal,
    pub before_tax: Decimal,
    pub tax: Decimal,
    pub after_tax: Decimal,
    pub tax_summary: Vec<TaxSummaryDto>,
    pub line_groups: Vec<LineGroupDto>,
    pub discounts: Vec<DiscountDto>,
    pub attachments: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentDto {
    pub fn from_document(document: &Document) -> Self {
        let totals = document.cached_totals();
        DocumentDto {
            document_id: document.document_id,
            kind: document.kind,
            name: document.name.clone(),
            status: document.status(),
            status_history: document.history().iter().rev().map(StatusRecordDto::from).collect(),
            date: document.date,
            owner_id: document.owner_id,
            company_id: document.company_id,
            customer_id: document.customer_id,
            project_id: document.project_id,
            phase_id: document.phase_id,
            company_index: document.company_index(),
            project_index: document.project_index(),
            internal_number: document.internal_number().to_string(),
            official_number: document.official_number.clone(),
            description: document.description.clone(),
            address: document.address.clone(),
            workplace: document.workplace.clone(),
            payment_conditions: document.payment_conditions.clone(),
            display_units: document.display_units,
            rounding_mode: document.rounding_mode,
            expenses_before_tax: document.expenses_before_tax.to_decimal(),
            before_tax: totals.before_tax.to_decimal(),
            tax: totals.tax.to_decimal(),
            after_tax: totals.after_tax.to_decimal(),
            tax_summary: tax_by_rate(document)
                .into_iter()
                .map(|(rate, tax)| TaxSummaryDto {
                    tax_rate: rate.to_decimal(),
                    tax: tax.to_decimal(),
                })
                .collect(),
            line_groups: document.groups().iter().map(LineGroupDto::from).collect(),
            discounts: document.discounts().iter().map(DiscountDto::from).collect(),
            attachments: document.attachments.clone(),
            created_at: document.created_at,
            updated_at: document.updated_at,
        }
    }
}
