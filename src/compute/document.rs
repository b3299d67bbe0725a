//! Document-level totals and the per-rate tax breakdown.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::compute::group::group_before_tax;
use crate::compute::line::line_before_tax;
use crate::compute::Totals;
use crate::models::{Amount, Document, TaxRate};

/// Document before-tax total: group subtotals plus flat expenses, minus
/// discounts.
pub fn document_before_tax(document: &Document) -> Amount {
    let mode = document.rounding_mode;
    let groups: Amount = document
        .active_groups()
        .map(|group| group_before_tax(group, mode))
        .sum();
    let discounts: Amount = document
        .discounts()
        .iter()
        .map(|discount| discount.amount)
        .sum();
    groups + document.expenses_before_tax - discounts
}

/// Per-rate tax breakdown. For each distinct rate across lines and
/// discounts, the base is the sum of rounded line before-tax values at that
/// rate minus discount amounts at that rate; the tax is computed on the
/// aggregated base. Multiple rates may coexist on one document.
pub fn tax_by_rate(document: &Document) -> BTreeMap<TaxRate, Amount> {
    let mode = document.rounding_mode;
    let mut bases: BTreeMap<TaxRate, Amount> = BTreeMap::new();
    for line in document.all_lines() {
        *bases.entry(line.tax_rate).or_insert(Amount::ZERO) += line_before_tax(line, mode);
    }
    for discount in document.discounts() {
        *bases.entry(discount.tax_rate).or_insert(Amount::ZERO) -= discount.amount;
    }
    bases
        .into_iter()
        .map(|(rate, base)| {
            let tax = Amount::from_decimal(
                base.to_decimal() * rate.to_decimal() / Decimal::ONE_HUNDRED,
                mode,
            );
            (rate, tax)
        })
        .collect()
}

/// Document tax total: the per-rate taxes summed.
pub fn document_tax(document: &Document) -> Amount {
    tax_by_rate(document).into_values().sum()
}

/// Document after-tax total.
pub fn document_after_tax(document: &Document) -> Amount {
    document_before_tax(document) + document_tax(document)
}

/// The full totals triple in one pass.
pub fn document_totals(document: &Document) -> Totals {
    let before_tax = document_before_tax(document);
    let tax = document_tax(document);
    Totals {
        before_tax,
        tax,
        after_tax: before_tax + tax,
    }
}
