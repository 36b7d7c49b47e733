//! Per-field and cross-field validation of listing inputs.
//!
//! Validation never throws and never blocks calculation; it produces a
//! map of field → message that callers render inline and use to gate the
//! save operation. Two entry points share one rule set so they can never
//! disagree:
//!
//! - [`apply_change`] — incremental, run on every edit against the
//!   *candidate* next input state (the edit being made right now, not
//!   yet-committed state);
//! - [`validate_all`] — the authoritative full pass run immediately
//!   before a save, re-deriving every field from scratch.
//!
//! # Rules
//!
//! Per field, evaluated on the raw string before numeric parsing: an
//! empty string is always valid; `item_name` and `category_id` never
//! produce a numeric error; anything unparseable is "Must be a number";
//! negative values are "Cannot be negative"; a VAT rate above 100 is
//! "Cannot exceed 100%".
//!
//! Cross-field: when both sale price and item cost are present and
//! parseable, and the VAT-normalized ex-VAT sale price is below the item
//! cost, the sale price field gets "Net Sale Price is lower than Item
//! Cost". Per-field errors take precedence on that slot, and clearing the
//! cross-field message never disturbs an unrelated error.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::calculations::common::{parse_decimal_field, parse_or_zero};
use crate::calculations::vat_normalized;
use crate::models::ListingInputs;

const MSG_NOT_A_NUMBER: &str = "Must be a number";
const MSG_NEGATIVE: &str = "Cannot be negative";
const MSG_VAT_OVER_100: &str = "Cannot exceed 100%";
const MSG_PRICE_BELOW_COST: &str = "Net Sale Price is lower than Item Cost";

/// The input fields validation knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    ItemName,
    SalePrice,
    ItemCost,
    ShippingCharge,
    ShippingCost,
    VatPercentage,
    CategoryId,
}

impl Field {
    /// Every field, in form order. Used by the full validation pass.
    pub const ALL: [Field; 7] = [
        Field::ItemName,
        Field::SalePrice,
        Field::ItemCost,
        Field::ShippingCharge,
        Field::ShippingCost,
        Field::VatPercentage,
        Field::CategoryId,
    ];

    /// Stable name matching the input record's field names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::ItemName => "item_name",
            Field::SalePrice => "sale_price",
            Field::ItemCost => "item_cost",
            Field::ShippingCharge => "shipping_charge",
            Field::ShippingCost => "shipping_cost",
            Field::VatPercentage => "vat_percentage",
            Field::CategoryId => "category_id",
        }
    }

    /// The raw string this field holds in the input record.
    fn raw_value<'a>(
        &self,
        inputs: &'a ListingInputs,
    ) -> &'a str {
        match self {
            Field::ItemName => &inputs.item_name,
            Field::SalePrice => &inputs.sale_price,
            Field::ItemCost => &inputs.item_cost,
            Field::ShippingCharge => &inputs.shipping_charge,
            Field::ShippingCost => &inputs.shipping_cost,
            Field::VatPercentage => &inputs.vat_percentage,
            Field::CategoryId => &inputs.category_id,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field → single human-readable message. Absence of a key means the
/// field is currently valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, &'static str>,
}

impl ValidationErrors {
    /// True when every field is valid (saving is allowed).
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields currently in error.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The message for a field, if any.
    pub fn get(
        &self,
        field: Field,
    ) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    /// All current errors in field order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.errors.iter().map(|(field, msg)| (*field, *msg))
    }

    fn set(
        &mut self,
        field: Field,
        message: &'static str,
    ) {
        self.errors.insert(field, message);
    }

    fn clear(
        &mut self,
        field: Field,
    ) {
        self.errors.remove(&field);
    }
}

/// Validates a single field's raw string value.
///
/// Returns the error message, or `None` when the value is acceptable.
/// Evaluated on the raw string before numeric parsing; an empty string is
/// always valid because the engine treats it as zero.
///
/// # Example
///
/// ```
/// use fee_core::validation::{Field, validate_field};
///
/// assert_eq!(validate_field(Field::SalePrice, ""), None);
/// assert_eq!(validate_field(Field::SalePrice, "-5"), Some("Cannot be negative"));
/// assert_eq!(validate_field(Field::VatPercentage, "150"), Some("Cannot exceed 100%"));
/// ```
pub fn validate_field(
    field: Field,
    raw: &str,
) -> Option<&'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if matches!(field, Field::ItemName | Field::CategoryId) {
        return None;
    }

    let Some(value) = parse_decimal_field(raw) else {
        return Some(MSG_NOT_A_NUMBER);
    };
    if value < Decimal::ZERO {
        return Some(MSG_NEGATIVE);
    }
    if field == Field::VatPercentage && value > Decimal::ONE_HUNDRED {
        return Some(MSG_VAT_OVER_100);
    }

    None
}

/// Applies one edit to the error map, incrementally.
///
/// `next` is the candidate input state with the edit already applied, and
/// `changed` names the edited field. The edited field is re-validated and
/// the cross-field rule re-runs against the whole candidate state, since
/// an edit to the item cost or VAT rate can create or resolve a sale
/// price conflict.
pub fn apply_change(
    errors: &mut ValidationErrors,
    next: &ListingInputs,
    changed: Field,
) {
    match validate_field(changed, changed.raw_value(next)) {
        Some(message) => errors.set(changed, message),
        None => errors.clear(changed),
    }

    apply_cross_field(errors, next);
}

/// Applies a VAT-mode toggle to the error map.
///
/// The toggle has no per-field rule of its own, but it changes what the
/// ex-VAT sale price means, so the cross-field rule must re-run.
pub fn apply_vat_mode_change(
    errors: &mut ValidationErrors,
    next: &ListingInputs,
) {
    apply_cross_field(errors, next);
}

/// The authoritative full pass, run immediately before a save.
///
/// Re-derives every field's error from scratch, independently of any
/// incremental state, so a save is blocked whenever the inputs are
/// invalid even if a displayed error map has gone stale.
///
/// # Example
///
/// ```
/// use fee_core::models::ListingInputs;
/// use fee_core::validation::validate_all;
///
/// let inputs = ListingInputs {
///     sale_price: "100".to_string(),
///     ..ListingInputs::default()
/// };
/// assert!(validate_all(&inputs).is_empty());
/// ```
pub fn validate_all(inputs: &ListingInputs) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    for field in Field::ALL {
        if let Some(message) = validate_field(field, field.raw_value(inputs)) {
            errors.set(field, message);
        }
    }

    apply_cross_field(&mut errors, inputs);
    errors
}

/// The sale-price-below-cost rule, shared by both entry points.
///
/// Sets the conflict message on the sale price slot only when no
/// per-field error already occupies it, and clears only its own message
/// when the conflict lapses.
fn apply_cross_field(
    errors: &mut ValidationErrors,
    inputs: &ListingInputs,
) {
    if price_below_cost(inputs) {
        if errors.get(Field::SalePrice).is_none() {
            errors.set(Field::SalePrice, MSG_PRICE_BELOW_COST);
        }
    } else if errors.get(Field::SalePrice) == Some(MSG_PRICE_BELOW_COST) {
        errors.clear(Field::SalePrice);
    }
}

/// True when both price and cost are present and parseable and the
/// ex-VAT sale price is below the item cost.
fn price_below_cost(inputs: &ListingInputs) -> bool {
    let sale_raw = inputs.sale_price.trim();
    let cost_raw = inputs.item_cost.trim();
    if sale_raw.is_empty() || cost_raw.is_empty() {
        return false;
    }

    let (Some(sale_price), Some(item_cost)) =
        (parse_decimal_field(sale_raw), parse_decimal_field(cost_raw))
    else {
        return false;
    };

    let vat_rate = parse_or_zero(&inputs.vat_percentage);
    let price = vat_normalized(sale_price, vat_rate, inputs.price_includes_vat);

    price.ex_vat < item_cost
}
