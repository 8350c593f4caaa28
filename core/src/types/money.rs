//! Prices returned by the rating service.
//!
//! # Design
//! `due` is the amount the vendor will charge. When a `Price` is parsed from
//! a response the server's `due` is kept as-is, since the vendor rounds and
//! may include charges not itemized here. `Price::new` builds a price
//! locally and computes `due` from its parts; `is_balanced` compares the two.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::xml::Element;

/// One sales tax line: amount charged and its rate in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tax {
    pub amount: Decimal,
    pub percent: Decimal,
}

impl Tax {
    pub fn new(amount: Decimal, percent: Decimal) -> Self {
        Self { amount, percent }
    }
}

/// Surcharge or discount applied to the base price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub code: String,
    pub name: String,
    pub cost: Decimal,
    pub percent: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub due: Decimal,
    pub base: Decimal,
    pub gst: Tax,
    pub pst: Tax,
    pub hst: Tax,
    pub adjustments: Vec<Adjustment>,
}

impl Price {
    pub fn new(base: Decimal, gst: Tax, pst: Tax, hst: Tax, adjustments: Vec<Adjustment>) -> Self {
        let mut price = Self {
            due: Decimal::ZERO,
            base,
            gst,
            pst,
            hst,
            adjustments,
        };
        price.due = price.computed_due();
        price
    }

    pub fn tax_total(&self) -> Decimal {
        self.gst.amount + self.pst.amount + self.hst.amount
    }

    pub fn adjustment_total(&self) -> Decimal {
        self.adjustments.iter().map(|a| a.cost).sum()
    }

    pub fn computed_due(&self) -> Decimal {
        self.base + self.tax_total() + self.adjustment_total()
    }

    pub fn is_balanced(&self) -> bool {
        self.due == self.computed_due()
    }

    /// Read a `price-details` element.
    pub(crate) fn from_xml(details: &Element) -> Result<Self, ApiError> {
        let tax = |name: &str| -> Result<Tax, ApiError> {
            match details.path(&["taxes", name]) {
                Some(el) => Ok(Tax {
                    amount: decimal_or_zero(Some(el.text.trim()))?,
                    percent: decimal_or_zero(el.attribute("percent"))?,
                }),
                None => Ok(Tax::default()),
            }
        };

        let adjustments = match details.child("adjustments") {
            Some(list) => list
                .children_named("adjustment")
                .map(Adjustment::from_xml)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            due: decimal_or_zero(details.child_text("due"))?,
            base: decimal_or_zero(details.child_text("base"))?,
            gst: tax("gst")?,
            pst: tax("pst")?,
            hst: tax("hst")?,
            adjustments,
        })
    }
}

impl Adjustment {
    fn from_xml(el: &Element) -> Result<Self, ApiError> {
        let percent = match el.path(&["qualifier", "percent"]) {
            Some(p) if !p.text.trim().is_empty() => Some(parse_decimal(p.text.trim())?),
            _ => None,
        };
        Ok(Self {
            code: el.child_text("adjustment-code").unwrap_or_default().to_string(),
            name: el.child_text("adjustment-name").unwrap_or_default().to_string(),
            cost: decimal_or_zero(el.child_text("adjustment-cost"))?,
            percent,
        })
    }
}

pub(crate) fn parse_decimal(text: &str) -> Result<Decimal, ApiError> {
    text.parse::<Decimal>()
        .map_err(|e| ApiError::DeserializationError(format!("invalid amount {text:?}: {e}")))
}

/// Missing or blank amounts count as zero.
pub(crate) fn decimal_or_zero(text: Option<&str>) -> Result<Decimal, ApiError> {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => parse_decimal(t),
        _ => Ok(Decimal::ZERO),
    }
}
