use serde::{Deserialize, Serialize};

/// Raw user input for a single listing calculation.
///
/// All numeric fields are kept as the strings the user typed: an empty
/// string is valid and treated as zero by the calculation engine, while
/// malformed values are surfaced by the validator, never by the engine.
///
/// `sale_price` is mode-dependent: it is the VAT-inclusive price when
/// `price_includes_vat` is set and the VAT-exclusive price otherwise —
/// never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingInputs {
    /// Free-text item name, optional.
    pub item_name: String,

    /// Item sale price; interpretation depends on `price_includes_vat`.
    pub sale_price: String,

    /// What the seller paid for the item.
    pub item_cost: String,

    /// Shipping amount charged to the customer.
    pub shipping_charge: String,

    /// What shipping actually costs the seller.
    pub shipping_cost: String,

    /// VAT rate as a percentage, 0–100.
    pub vat_percentage: String,

    /// Marketplace category id; unknown ids resolve to `"default"`.
    pub category_id: String,

    /// Whether `sale_price` already includes VAT.
    pub price_includes_vat: bool,
}

impl Default for ListingInputs {
    /// The blank form: empty money fields, UK-standard 20% VAT,
    /// default category, ex-VAT price entry.
    fn default() -> Self {
        Self {
            item_name: String::new(),
            sale_price: String::new(),
            item_cost: String::new(),
            shipping_charge: String::new(),
            shipping_cost: String::new(),
            vat_percentage: "20".to_string(),
            category_id: "default".to_string(),
            price_includes_vat: false,
        }
    }
}
