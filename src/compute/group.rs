//! Group subtotals.

use crate::compute::line::{line_after_tax, line_before_tax, line_tax};
use crate::models::{Amount, LineGroup, RoundingMode};

/// Before-tax subtotal over the group's lines. An empty group contributes
/// zero.
pub fn group_before_tax(group: &LineGroup, mode: RoundingMode) -> Amount {
    group
        .lines()
        .iter()
        .map(|line| line_before_tax(line, mode))
        .sum()
}

/// Tax subtotal over the group's lines.
pub fn group_tax(group: &LineGroup, mode: RoundingMode) -> Amount {
    group.lines().iter().map(|line| line_tax(line, mode)).sum()
}

/// After-tax subtotal over the group's lines.
pub fn group_after_tax(group: &LineGroup, mode: RoundingMode) -> Amount {
    group
        .lines()
        .iter()
        .map(|line| line_after_tax(line, mode))
        .sum()
}
