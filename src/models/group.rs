//! Line groups and the lines they own.
//!
//! A group exclusively owns its lines: dropping the group drops the lines
//! with it, there is no way to keep an orphaned line around.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::amount::{Amount, TaxRate};

/// A priced, taxed, quantified item within a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub line_id: Uuid,
    /// Position within the owning group, unique there.
    pub order: i32,
    pub description: String,
    pub cost: Amount,
    /// May be fractional (hours, square meters, ...). Never negative.
    pub quantity: Decimal,
    pub tax_rate: TaxRate,
    pub unit: Option<String>,
    pub product_id: Option<Uuid>,
}

impl Line {
    /// Copy of this line under a fresh identifier.
    pub fn duplicate(&self) -> Line {
        Line {
            line_id: Uuid::new_v4(),
            order: self.order,
            description: self.description.clone(),
            cost: self.cost,
            quantity: self.quantity,
            tax_rate: self.tax_rate,
            unit: self.unit.clone(),
            product_id: self.product_id,
        }
    }

    /// Duplicate with the cost negated, for cancellation documents.
    pub fn credit_copy(&self) -> Line {
        let mut line = self.duplicate();
        line.cost = -line.cost;
        line
    }
}

/// Input for creating a line.
#[derive(Debug, Clone)]
pub struct CreateLine {
    pub description: String,
    pub cost: Amount,
    pub quantity: Decimal,
    pub tax_rate: TaxRate,
    pub unit: Option<String>,
    pub product_id: Option<Uuid>,
}

/// Input for updating a line. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateLine {
    pub description: Option<String>,
    pub cost: Option<Amount>,
    pub quantity: Option<Decimal>,
    pub tax_rate: Option<TaxRate>,
    pub unit: Option<String>,
    pub product_id: Option<Uuid>,
}

/// Ordered bucket of lines within a document, used for display and
/// subtotaling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineGroup {
    pub group_id: Uuid,
    /// Position within the owning document, unique there.
    pub order: i32,
    pub title: String,
    pub description: String,
    lines: Vec<Line>,
}

impl LineGroup {
    pub fn new(order: i32) -> Self {
        LineGroup {
            group_id: Uuid::new_v4(),
            order,
            title: String::new(),
            description: String::new(),
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, line_id: Uuid) -> Option<&Line> {
        self.lines.iter().find(|line| line.line_id == line_id)
    }

    /// Append a line at the end of the group. Rejects negative quantities:
    /// cancellation semantics negate the cost, never the quantity.
    pub fn add_line(&mut self, input: CreateLine) -> Result<Uuid, EngineError> {
        if input.quantity.is_sign_negative() {
            return Err(EngineError::Invariant(format!(
                "negative quantity {} on a new line",
                input.quantity
            )));
        }
        let line = Line {
            line_id: Uuid::new_v4(),
            order: self.lines.len() as i32,
            description: input.description,
            cost: input.cost,
            quantity: input.quantity,
            tax_rate: input.tax_rate,
            unit: input.unit,
            product_id: input.product_id,
        };
        let line_id = line.line_id;
        self.lines.push(line);
        Ok(line_id)
    }

    /// Patch an existing line in place.
    pub fn update_line(&mut self, line_id: Uuid, input: UpdateLine) -> Result<bool, EngineError> {
        if let Some(quantity) = input.quantity {
            if quantity.is_sign_negative() {
                return Err(EngineError::Invariant(format!(
                    "negative quantity {} on line {}",
                    quantity, line_id
                )));
            }
        }
        let Some(line) = self.lines.iter_mut().find(|line| line.line_id == line_id) else {
            return Ok(false);
        };
        if let Some(description) = input.description {
            line.description = description;
        }
        if let Some(cost) = input.cost {
            line.cost = cost;
        }
        if let Some(quantity) = input.quantity {
            line.quantity = quantity;
        }
        if let Some(tax_rate) = input.tax_rate {
            line.tax_rate = tax_rate;
        }
        if let Some(unit) = input.unit {
            line.unit = Some(unit);
        }
        if let Some(product_id) = input.product_id {
            line.product_id = Some(product_id);
        }
        Ok(true)
    }

    /// Remove a line and close the order gap it leaves.
    pub fn remove_line(&mut self, line_id: Uuid) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.line_id != line_id);
        if self.lines.len() == before {
            return false;
        }
        self.renumber();
        true
    }

    /// Copy of this group and all its lines under fresh identifiers.
    pub fn duplicate(&self) -> LineGroup {
        LineGroup {
            group_id: Uuid::new_v4(),
            order: self.order,
            title: self.title.clone(),
            description: self.description.clone(),
            lines: self.lines.iter().map(Line::duplicate).collect(),
        }
    }

    /// Duplicate with every line cost negated, for cancellation documents.
    pub fn credit_copy(&self) -> LineGroup {
        LineGroup {
            group_id: Uuid::new_v4(),
            order: self.order,
            title: self.title.clone(),
            description: self.description.clone(),
            lines: self.lines.iter().map(Line::credit_copy).collect(),
        }
    }

    fn renumber(&mut self) {
        for (index, line) in self.lines.iter_mut().enumerate() {
            line.order = index as i32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn input(cost: i64) -> CreateLine {
        CreateLine {
            description: "item".to_string(),
            cost: Amount::from_scaled(cost),
            quantity: Decimal::ONE,
            tax_rate: TaxRate::from_scaled(2000),
            unit: None,
            product_id: None,
        }
    }

    #[test]
    fn test_removing_a_line_closes_the_order_gap() {
        let mut group = LineGroup::new(0);
        let first = group.add_line(input(1)).unwrap();
        group.add_line(input(2)).unwrap();
        group.add_line(input(3)).unwrap();

        assert!(group.remove_line(first));
        let orders: Vec<i32> = group.lines().iter().map(|line| line.order).collect();
        assert_eq!(orders, vec![0, 1]);
    }

    #[test]
    fn test_group_duplicate_gets_fresh_identifiers() {
        let mut group = LineGroup::new(2);
        group.title = "Options".to_string();
        group.add_line(input(10_000)).unwrap();

        let copy = group.duplicate();
        assert_ne!(copy.group_id, group.group_id);
        assert_eq!(copy.title, group.title);
        assert_eq!(copy.lines().len(), 1);
        assert_ne!(copy.lines()[0].line_id, group.lines()[0].line_id);
        assert_eq!(copy.lines()[0].cost, group.lines()[0].cost);
    }

    #[test]
    fn test_group_credit_copy_negates_every_cost() {
        let mut group = LineGroup::new(0);
        group.add_line(input(10_000)).unwrap();
        group.add_line(input(25_500)).unwrap();

        let credit = group.credit_copy();
        for (copy, original) in credit.lines().iter().zip(group.lines()) {
            assert_eq!(copy.cost, -original.cost);
            assert_eq!(copy.quantity, original.quantity);
        }
    }
}
