//! # Menu Catalog
//!
//! The fixed set of purchasable items. Defined once at compile time and never
//! mutated; everything else in the system refers to entries by `&'static`
//! reference.

use serde::Serialize;

/// One purchasable catalog entry.
#[derive(Debug, Serialize, PartialEq)]
pub struct MenuItem {
    pub id: &'static str,
    pub name: &'static str,
    pub price: f64,
    pub emoji: &'static str,
    pub image_url: &'static str,
    pub asl_sign: &'static str,
}

pub const MENU_ITEMS: &[MenuItem] = &[
    MenuItem {
        id: "burger",
        name: "Classic Burger",
        price: 5.49,
        emoji: "🍔",
        image_url: "/placeholder.svg?height=200&width=200",
        asl_sign: "Make a FIST (closed hand)",
    },
    MenuItem {
        id: "fries",
        name: "French Fries",
        price: 2.19,
        emoji: "🍟",
        image_url: "/placeholder.svg?height=200&width=200",
        asl_sign: "Show OPEN HAND (5 fingers spread)",
    },
    MenuItem {
        id: "drink",
        name: "Soft Drink",
        price: 1.29,
        emoji: "🥤",
        image_url: "/placeholder.svg?height=200&width=200",
        asl_sign: "Make a 'C' SHAPE (like holding a cup)",
    },
];

/// Looks up a catalog entry by its exact id.
pub fn find_by_id(id: &str) -> Option<&'static MenuItem> {
    MENU_ITEMS.iter().find(|item| item.id == id)
}

/// Fuzzy lookup used when decoding finalized order strings.
///
/// A catalog entry matches when its lowercase name contains the queried name
/// or vice versa. First match wins; catalog order is the tie-break.
pub fn find_fuzzy(name: &str) -> Option<&'static MenuItem> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    MENU_ITEMS.iter().find(|item| {
        let menu_name = item.name.to_lowercase();
        menu_name.contains(&needle) || needle.contains(&menu_name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_id() {
        assert_eq!(find_by_id("burger").map(|i| i.name), Some("Classic Burger"));
        assert!(find_by_id("pizza").is_none());
    }

    #[test]
    fn test_find_fuzzy_both_directions() {
        // Query is a fragment of the catalog name
        assert_eq!(find_fuzzy("fries").map(|i| i.id), Some("fries"));
        // Catalog name is a fragment of the query
        assert_eq!(
            find_fuzzy("one large soft drink please").map(|i| i.id),
            Some("drink")
        );
        // Case and surrounding whitespace are ignored
        assert_eq!(find_fuzzy("  CLASSIC BURGER ").map(|i| i.id), Some("burger"));
    }

    #[test]
    fn test_find_fuzzy_misses() {
        assert!(find_fuzzy("nonexistent").is_none());
        assert!(find_fuzzy("").is_none());
        assert!(find_fuzzy("   ").is_none());
    }
}
