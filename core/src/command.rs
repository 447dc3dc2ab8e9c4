//! # Command Interpreter
//!
//! Maps a raw gesture token plus the current stage to a typed action. Pure
//! function of its two inputs; unknown tokens are not errors, they classify
//! as [`Action::Ignored`] so noisy gesture input degrades to a no-op.

use ordr_common::menu::{self, MenuItem};
use ordr_common::order::Stage;

/// Gesture token to catalog id. Single letters match the recognizer output.
const ITEM_TOKENS: &[(&str, &str)] = &[("B", "burger"), ("F", "fries"), ("D", "drink")];

/// Accepted quantity tokens.
const QUANTITY_TOKENS: &[&str] = &["1", "2", "3"];

/// Token that completes the order.
const FINISH_TOKEN: &str = "FINISH";

/// The typed outcome of interpreting one gesture token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Pick an item off the menu, requesting `quantity-select`.
    SelectItem(&'static MenuItem),
    /// Pick a quantity for the pending item, requesting `adding-item`.
    SelectQuantity(u32),
    /// Complete the order, requesting `confirming`. Callers additionally gate
    /// this on a non-empty cart.
    Finish,
    /// Token not meaningful in this stage. No transition.
    Ignored,
}

/// The gesture token that selects a given catalog item, for display.
pub fn token_for(item_id: &str) -> Option<&'static str> {
    ITEM_TOKENS
        .iter()
        .find(|(_, id)| *id == item_id)
        .map(|(token, _)| *token)
}

/// Classifies `token` against the current `stage`.
pub fn interpret(token: &str, stage: Stage) -> Action {
    if stage == Stage::Menu {
        if let Some((_, item_id)) = ITEM_TOKENS.iter().find(|(t, _)| *t == token) {
            if let Some(item) = menu::find_by_id(item_id) {
                return Action::SelectItem(item);
            }
        }
    }

    if stage == Stage::QuantitySelect && QUANTITY_TOKENS.contains(&token) {
        if let Ok(quantity) = token.parse::<u32>() {
            return Action::SelectQuantity(quantity);
        }
    }

    if token == FINISH_TOKEN {
        return Action::Finish;
    }

    Action::Ignored
}
