//! Domain model: fixed-point amounts, documents, line groups, discounts.

pub mod amount;
pub mod discount;
pub mod document;
pub mod group;

pub use amount::{Amount, RoundingMode, TaxRate, AMOUNT_PRECISION, RATE_PRECISION};
pub use discount::{CreateDiscount, DiscountLine};
pub use document::{
    CompanyRef, CustomerRef, Document, DocumentKind, DocumentStatus, NewDocument, PhaseRef,
    ProjectRef, StatusRecord, UpdateDocument,
};
pub use group::{CreateLine, Line, LineGroup, UpdateLine};
