//! Physical description of what is being shipped.

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::types::address::check_len;

pub const MAX_ITEM_DESCRIPTION: usize = 45;

/// A parcel. Weight in kilograms; length is the largest dimension, height the
/// smallest, all in centimetres.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parcel {
    pub weight: Decimal,
    pub length: Decimal,
    pub width: Decimal,
    pub height: Decimal,
    pub unpackaged: bool,
    /// Customs line items, needed only outside the home country.
    pub items: Vec<Item>,
}

impl Parcel {
    pub fn new(weight: Decimal) -> Self {
        Self {
            weight,
            ..Self::default()
        }
    }

    pub fn with_dimensions(mut self, length: Decimal, width: Decimal, height: Decimal) -> Self {
        self.length = length;
        self.width = width;
        self.height = height;
        self
    }

    pub fn unpackaged(mut self, unpackaged: bool) -> Self {
        self.unpackaged = unpackaged;
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    /// Dimensions are only sent when all three are positive.
    pub fn is_dimensioned(&self) -> bool {
        [self.length, self.width, self.height]
            .iter()
            .all(|d| *d > Decimal::ZERO)
    }
}

/// One customs line: `amount` units of `description`, each weighing
/// `weight` kg and worth `unit_price`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub amount: u32,
    pub description: String,
    pub weight: Decimal,
    pub unit_price: Decimal,
}

impl Item {
    pub fn new(
        amount: u32,
        description: impl Into<String>,
        weight: Decimal,
        unit_price: Decimal,
    ) -> Result<Self, ValidationError> {
        let description = description.into();
        check_len("customs description", &description, MAX_ITEM_DESCRIPTION)?;
        Ok(Self {
            amount,
            description,
            weight,
            unit_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_need_all_three_positive() {
        let parcel = Parcel::new(Decimal::ONE);
        assert!(!parcel.is_dimensioned());
        let parcel = parcel.with_dimensions(Decimal::from(30), Decimal::from(20), Decimal::ZERO);
        assert!(!parcel.is_dimensioned());
        let parcel = parcel.with_dimensions(Decimal::from(30), Decimal::from(20), Decimal::from(10));
        assert!(parcel.is_dimensioned());
    }

    #[test]
    fn item_description_is_limited() {
        assert!(Item::new(1, "d".repeat(45), Decimal::ONE, Decimal::ONE).is_ok());
        let err = Item::new(1, "d".repeat(46), Decimal::ONE, Decimal::ONE).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 45, .. }));
    }
}
