//! Cached totals synchronization.
//!
//! The three cached totals exist for query efficiency; they are recomputed
//! and overwritten here, in the call graph, before every persisted
//! mutation, never through implicit storage hooks.

use tracing::debug;

use crate::compute::document_totals;
use crate::models::Document;

/// Recompute the document totals and overwrite the cached fields.
/// Idempotent: recomputing unchanged data yields identical values.
pub fn refresh_totals(document: &mut Document) {
    let totals = document_totals(document);
    document.set_cached_totals(totals);
    debug!(
        document_id = %document.document_id,
        before_tax = %totals.before_tax,
        tax = %totals.tax,
        after_tax = %totals.after_tax,
        "Cached totals refreshed"
    );
}
