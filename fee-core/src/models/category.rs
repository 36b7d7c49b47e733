//! Marketplace categories and their referral fee percentages.
//!
//! Every listing belongs to a category, and the marketplace charges a
//! referral fee that is a category-dependent percentage of the total
//! customer payment. Unknown category ids resolve to the `"default"`
//! entry, whose presence is guaranteed at table construction time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Category id every unresolved lookup falls back to.
pub const DEFAULT_CATEGORY_ID: &str = "default";

/// A marketplace category with its referral fee percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Stable lowercase identifier (e.g. `"electronics"`).
    pub id: String,

    /// Display name shown to sellers.
    pub name: String,

    /// Referral fee as a percentage of total revenue, 0–100.
    pub fee_percentage: Decimal,
}

/// Immutable lookup table of marketplace categories.
///
/// Constructed once and shared read-only. Construction guarantees a
/// `"default"` entry exists, so [`CategoryTable::resolve`] is total and
/// never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    categories: Vec<Category>,
    default_index: usize,
}

impl CategoryTable {
    /// The marketplace's published referral fee schedule.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use fee_core::models::CategoryTable;
    ///
    /// let table = CategoryTable::built_in();
    /// assert_eq!(table.resolve("electronics").fee_percentage, dec!(6));
    /// assert_eq!(table.resolve("no-such-category").id, "default");
    /// ```
    pub fn built_in() -> Self {
        let categories = vec![
            entry("appliances", "Appliances", 7),
            entry("books", "Books & Magazines", 9),
            entry("business", "Business, Office & Industrial", 8),
            entry("cameras", "Cameras & Optics", 6),
            entry("automotive", "Cars & Automotive", 8),
            entry("clothing", "Clothing, Shoes & Accessories", 9),
            entry("computers", "Computers & Software", 6),
            entry("electronics", "Electronics & Technology", 6),
            entry("furniture", "Furniture & Home", 9),
            entry("health", "Health & Beauty", 9),
            entry("jewellery", "Jewellery & Watches", 8),
            entry("pets", "Pet Supplies", 9),
            entry("sports", "Sports & Outdoors", 9),
            entry("toys", "Toys & Games", 9),
            entry(DEFAULT_CATEGORY_ID, "Other (Default)", 9),
        ];
        Self::from_categories(categories)
    }

    /// Builds a table from an arbitrary category list.
    ///
    /// If the list carries no `"default"` entry, the built-in default
    /// (`Other (Default)`, 9%) is appended so the fallback invariant
    /// holds for every table, not just the built-in one.
    pub fn from_categories(mut categories: Vec<Category>) -> Self {
        let default_index = match categories.iter().position(|c| c.id == DEFAULT_CATEGORY_ID) {
            Some(index) => index,
            None => {
                categories.push(entry(DEFAULT_CATEGORY_ID, "Other (Default)", 9));
                categories.len() - 1
            }
        };
        Self {
            categories,
            default_index,
        }
    }

    /// Looks up a category by id, falling back to the default entry.
    ///
    /// The fallback is silent as far as callers are concerned; an unknown
    /// id is not an error anywhere in the system.
    pub fn resolve(&self, id: &str) -> &Category {
        match self.categories.iter().find(|c| c.id == id) {
            Some(category) => category,
            None => {
                debug!(category_id = id, "unknown category id; using default fee");
                &self.categories[self.default_index]
            }
        }
    }

    /// The default category itself.
    pub fn default_category(&self) -> &Category {
        &self.categories[self.default_index]
    }

    /// All categories, in schedule order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
}

fn entry(
    id: &str,
    name: &str,
    fee_percentage: u32,
) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        fee_percentage: Decimal::from(fee_percentage),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn built_in_table_resolves_known_category() {
        let table = CategoryTable::built_in();

        let category = table.resolve("cameras");

        assert_eq!(category.name, "Cameras & Optics");
        assert_eq!(category.fee_percentage, dec!(6));
    }

    #[test]
    fn unknown_id_falls_back_to_default() {
        let table = CategoryTable::built_in();

        let category = table.resolve("vintage-typewriters");

        assert_eq!(category.id, DEFAULT_CATEGORY_ID);
        assert_eq!(category.fee_percentage, dec!(9));
    }

    #[test]
    fn empty_id_falls_back_to_default() {
        let table = CategoryTable::built_in();

        assert_eq!(table.resolve("").id, DEFAULT_CATEGORY_ID);
    }

    #[test]
    fn custom_table_without_default_gains_one() {
        let table = CategoryTable::from_categories(vec![entry("vinyl", "Vinyl Records", 12)]);

        assert_eq!(table.resolve("vinyl").fee_percentage, dec!(12));
        assert_eq!(table.resolve("anything-else").id, DEFAULT_CATEGORY_ID);
        assert_eq!(table.categories().len(), 2);
    }

    #[test]
    fn custom_table_keeps_its_own_default() {
        let table = CategoryTable::from_categories(vec![
            entry("vinyl", "Vinyl Records", 12),
            entry(DEFAULT_CATEGORY_ID, "Everything Else", 5),
        ]);

        assert_eq!(table.default_category().fee_percentage, dec!(5));
        assert_eq!(table.categories().len(), 2);
    }
}
