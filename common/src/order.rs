//! # Order Flow Model
//!
//! The stage machine vocabulary and the in-memory cart. Totals are always
//! derived from the lines on demand so they can never go stale.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::menu::MenuItem;

/// Sales tax applied to every order subtotal.
pub const TAX_RATE: f64 = 0.08;

/// One discrete phase of the ordering flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Browsing the catalog, waiting for an item selection.
    Menu,
    /// An item is selected, waiting for a quantity.
    QuantitySelect,
    /// Short confirmation animation after a line was added.
    AddingItem,
    /// Order finished, waiting for backend confirmation.
    Confirming,
    /// Terminal until an explicit new-order reset.
    Complete,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Menu => "menu",
            Stage::QuantitySelect => "quantity-select",
            Stage::AddingItem => "adding-item",
            Stage::Confirming => "confirming",
            Stage::Complete => "complete",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "menu" => Ok(Stage::Menu),
            "quantity-select" => Ok(Stage::QuantitySelect),
            "adding-item" => Ok(Stage::AddingItem),
            "confirming" => Ok(Stage::Confirming),
            "complete" => Ok(Stage::Complete),
            _ => Err(format!("unknown stage: {s}")),
        }
    }
}

/// A confirmed catalog entry in the cart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderLine {
    pub item: &'static MenuItem,
    pub quantity: u32,
    pub confirmed: bool,
}

impl OrderLine {
    pub fn new(item: &'static MenuItem, quantity: u32) -> Self {
        Self {
            item,
            quantity,
            confirmed: true,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.item.price * f64::from(self.quantity)
    }
}

/// Computes the pre-tax sum over a set of lines.
pub fn subtotal(lines: &[OrderLine]) -> f64 {
    lines.iter().map(OrderLine::line_total).sum()
}

pub fn tax(lines: &[OrderLine]) -> f64 {
    subtotal(lines) * TAX_RATE
}

pub fn total(lines: &[OrderLine]) -> f64 {
    let sub = subtotal(lines);
    sub + sub * TAX_RATE
}
