//! Document-level discount lines.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::amount::{Amount, TaxRate};

/// A signed document-level adjustment with its own tax rate, subtracted
/// from the document totals and grouped by rate in the tax breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountLine {
    pub discount_id: Uuid,
    pub description: String,
    pub amount: Amount,
    pub tax_rate: TaxRate,
}

impl DiscountLine {
    /// Copy of this discount under a fresh identifier.
    pub fn duplicate(&self) -> DiscountLine {
        DiscountLine {
            discount_id: Uuid::new_v4(),
            description: self.description.clone(),
            amount: self.amount,
            tax_rate: self.tax_rate,
        }
    }
}

/// Input for creating a discount line.
#[derive(Debug, Clone)]
pub struct CreateDiscount {
    pub description: String,
    pub amount: Amount,
    pub tax_rate: TaxRate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_keeps_values_under_a_fresh_identifier() {
        let discount = DiscountLine {
            discount_id: Uuid::new_v4(),
            description: "Loyalty".to_string(),
            amount: Amount::from_scaled(1_000_000),
            tax_rate: TaxRate::from_scaled(2000),
        };

        let copy = discount.duplicate();
        assert_ne!(copy.discount_id, discount.discount_id);
        assert_eq!(copy.description, discount.description);
        assert_eq!(copy.amount, discount.amount);
        assert_eq!(copy.tax_rate, discount.tax_rate);
    }
}
