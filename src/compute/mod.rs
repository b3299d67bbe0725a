//! Pure totals computation.
//!
//! Every function here is a deterministic function of already-loaded state:
//! no I/O, no side effects. Per-line rounding always happens before any
//! aggregation so cached totals match historical data bit-for-bit.

pub mod document;
pub mod group;
pub mod line;

pub use document::{
    document_after_tax, document_before_tax, document_tax, document_totals, tax_by_rate,
};
pub use group::{group_after_tax, group_before_tax, group_tax};
pub use line::{line_after_tax, line_before_tax, line_tax};

use serde::{Deserialize, Serialize};

use crate::models::Amount;

/// Document-level totals triple. `after_tax == before_tax + tax` holds by
/// construction for every rounding mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub before_tax: Amount,
    pub tax: Amount,
    pub after_tax: Amount,
}
