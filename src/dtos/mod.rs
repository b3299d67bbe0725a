//! Flat representations of the aggregate for UI and API layers.

pub mod document;

pub use document::{
    DiscountDto, DocumentDto, LineDto, LineGroupDto, StatusRecordDto, TaxSummaryDto,
};
