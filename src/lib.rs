//! Commercial document engine.
//!
//! Embeds inside a management application and owns the hard part of its
//! billing domain: sequential document numbering, the draft → submitted →
//! validated/rejected lifecycle, and document totals kept bit-for-bit
//! consistent with the underlying line items via fixed-point arithmetic.
//!
//! Persistence, authorization and notification are collaborators supplied
//! by the host through the [`services::DocumentRepository`],
//! [`services::CapabilityCheck`] and [`services::StatusObserver`] traits;
//! in-memory implementations ship for tests and embedded use.

pub mod compute;
pub mod dtos;
pub mod error;
pub mod models;
pub mod services;

pub use compute::Totals;
pub use error::{EngineError, FieldError, ValidationErrors};
pub use models::{
    Amount, CompanyRef, CreateDiscount, CreateLine, CustomerRef, DiscountLine, Document,
    DocumentKind, DocumentStatus, Line, LineGroup, NewDocument, PhaseRef, ProjectRef,
    RoundingMode, StatusRecord, TaxRate, UpdateDocument, UpdateLine,
};
pub use services::{Actor, DocumentEngine, StatusChanged};
