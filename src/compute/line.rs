//! Single-line contributions.

use rust_decimal::Decimal;

use crate::models::{Amount, Line, RoundingMode};

/// Before-tax contribution: cost × quantity, rounded per the document's
/// rounding policy.
pub fn line_before_tax(line: &Line, mode: RoundingMode) -> Amount {
    Amount::from_decimal(line.cost.to_decimal() * line.quantity, mode)
}

/// Tax contribution: before-tax × rate / 100, rounded on the already
/// rounded before-tax value.
pub fn line_tax(line: &Line, mode: RoundingMode) -> Amount {
    let base = line_before_tax(line, mode).to_decimal();
    Amount::from_decimal(base * line.tax_rate.to_decimal() / Decimal::ONE_HUNDRED, mode)
}

/// After-tax contribution: the sum of the two above.
pub fn line_after_tax(line: &Line, mode: RoundingMode) -> Amount {
    line_before_tax(line, mode) + line_tax(line, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaxRate;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use uuid::Uuid;

    fn line(cost: &str, quantity: &str, rate: &str) -> Line {
        Line {
            line_id: Uuid::new_v4(),
            order: 0,
            description: String::new(),
            cost: Amount::from_decimal(Decimal::from_str(cost).unwrap(), RoundingMode::Standard),
            quantity: Decimal::from_str(quantity).unwrap(),
            tax_rate: TaxRate::from_decimal(Decimal::from_str(rate).unwrap()),
            unit: None,
            product_id: None,
        }
    }

    #[test]
    fn test_line_contributions() {
        let line = line("100.00", "2", "20");
        assert_eq!(
            line_before_tax(&line, RoundingMode::Standard).to_decimal(),
            Decimal::from_str("200.00000").unwrap()
        );
        assert_eq!(
            line_tax(&line, RoundingMode::Standard).to_decimal(),
            Decimal::from_str("40.00000").unwrap()
        );
        assert_eq!(
            line_after_tax(&line, RoundingMode::Standard).to_decimal(),
            Decimal::from_str("240.00000").unwrap()
        );
    }

    #[test]
    fn test_fractional_quantity_rounds_per_mode() {
        // 0.33333 × 0.3 = 0.099999 exactly at 6 digits; the fifth digit
        // differs between truncation and half-away rounding.
        let line = line("0.33333", "0.3", "0");
        assert_eq!(
            line_before_tax(&line, RoundingMode::Standard).scaled(),
            10_000
        );
        assert_eq!(line_before_tax(&line, RoundingMode::Floor).scaled(), 9_999);
    }

    #[test]
    fn test_negative_cost_flows_through() {
        let original = line("45.50", "3", "10");
        let credit = original.credit_copy();
        assert_eq!(
            line_before_tax(&credit, RoundingMode::Standard),
            -line_before_tax(&original, RoundingMode::Standard)
        );
        assert_eq!(
            line_tax(&credit, RoundingMode::Standard),
            -line_tax(&original, RoundingMode::Standard)
        );
        assert_eq!(
            line_after_tax(&credit, RoundingMode::Standard),
            -line_after_tax(&original, RoundingMode::Standard)
        );
    }
}
