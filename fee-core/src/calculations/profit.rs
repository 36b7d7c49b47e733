//! Profit worksheet for a single marketplace listing.
//!
//! This module implements the seller profit/loss calculation: given raw
//! listing inputs and the category fee table, it derives what the customer
//! pays, what the marketplace takes, and what the seller keeps.
//!
//! # Worksheet Structure
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Parse the four money fields and the VAT rate (empty/invalid → 0) |
//! | 2    | Resolve the category (unknown ids → `"default"`) |
//! | 3    | Normalize the sale price to both VAT bases (ex-VAT and inc-VAT) |
//! | 4    | Total revenue = inc-VAT price + shipping charge |
//! | 5    | Referral fee = total revenue × category fee %; processing fee = 0 |
//! | 6    | Total costs = item cost + shipping cost + marketplace fees |
//! | 7    | Net revenue = ex-VAT price + shipping charge (VAT is never seller income) |
//! | 8    | Net profit = net revenue − total costs |
//! | 9    | Profit margin = net profit ÷ net revenue × 100 (0 when revenue is 0) |
//! | 10   | ROI = net profit ÷ (item cost + shipping cost) × 100 (0 when cost is 0) |
//!
//! The worksheet is pure, total, and deterministic. It never fails:
//! malformed numeric strings compute as zero (surfacing them is the
//! validator's job), and both divisions are zero-guarded.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use fee_core::calculations::ProfitWorksheet;
//! use fee_core::models::{CategoryTable, ListingInputs};
//!
//! let categories = CategoryTable::built_in();
//! let inputs = ListingInputs {
//!     sale_price: "100".to_string(),      // ex VAT
//!     item_cost: "40".to_string(),
//!     shipping_charge: "5".to_string(),
//!     shipping_cost: "3".to_string(),
//!     vat_percentage: "20".to_string(),
//!     category_id: "books".to_string(),   // 9% referral fee
//!     ..ListingInputs::default()
//! };
//!
//! let breakdown = ProfitWorksheet::new(&categories).calculate(&inputs);
//!
//! assert_eq!(breakdown.total_revenue, dec!(125.00));
//! assert_eq!(breakdown.vat_amount, dec!(20.00));
//! assert_eq!(breakdown.referral_fee, dec!(11.25));
//! assert_eq!(breakdown.net_profit, dec!(50.75));
//! assert_eq!(breakdown.profit_margin, dec!(48.33));
//! assert_eq!(breakdown.roi, dec!(118.02));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{parse_or_zero, round_half_up};
use crate::models::{CategoryTable, ListingInputs, ProfitBreakdown};

/// A sale price expressed on both VAT bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VatPrice {
    /// Price before VAT is added.
    pub ex_vat: Decimal,

    /// Price the customer actually pays for the item.
    pub inc_vat: Decimal,
}

/// Normalizes a sale price to both VAT bases (Step 3).
///
/// Exactly one direction is derived, depending on which semantics the
/// entered price carries. The validator and display layers use this same
/// helper, so "ex-VAT sale price" means the same number everywhere.
///
/// A VAT rate of −100 would zero the divisor; the guard keeps the
/// computation total for un-validated input instead of panicking.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use fee_core::calculations::vat_normalized;
///
/// let from_ex = vat_normalized(dec!(100), dec!(20), false);
/// let from_inc = vat_normalized(dec!(120), dec!(20), true);
///
/// assert_eq!(from_ex.inc_vat, dec!(120.00));
/// assert_eq!(from_inc.ex_vat, dec!(100.00));
/// ```
pub fn vat_normalized(
    sale_price: Decimal,
    vat_rate: Decimal,
    price_includes_vat: bool,
) -> VatPrice {
    let multiplier = Decimal::ONE + vat_rate / Decimal::ONE_HUNDRED;

    if price_includes_vat {
        let ex_vat = sale_price
            .checked_div(multiplier)
            .map(round_half_up)
            .unwrap_or(Decimal::ZERO);
        VatPrice {
            ex_vat,
            inc_vat: round_half_up(sale_price),
        }
    } else {
        VatPrice {
            ex_vat: round_half_up(sale_price),
            inc_vat: round_half_up(sale_price * multiplier),
        }
    }
}

/// Calculator for the listing profit worksheet.
///
/// Borrows the category table; one worksheet can price any number of
/// listings against the same fee schedule.
#[derive(Debug, Clone)]
pub struct ProfitWorksheet<'a> {
    categories: &'a CategoryTable,
}

impl<'a> ProfitWorksheet<'a> {
    /// Creates a worksheet over the given category fee table.
    pub fn new(categories: &'a CategoryTable) -> Self {
        Self { categories }
    }

    /// Runs the complete worksheet for one set of listing inputs.
    ///
    /// Total and infallible: every raw string has a defined numeric
    /// meaning (possibly zero) and every division is guarded, so the
    /// result is always a finite [`ProfitBreakdown`].
    pub fn calculate(
        &self,
        inputs: &ListingInputs,
    ) -> ProfitBreakdown {
        // Step 1: parse-or-zero
        let sale_price = parse_or_zero(&inputs.sale_price);
        let item_cost = parse_or_zero(&inputs.item_cost);
        let shipping_charge = parse_or_zero(&inputs.shipping_charge);
        let shipping_cost = parse_or_zero(&inputs.shipping_cost);
        let vat_rate = parse_or_zero(&inputs.vat_percentage);

        // Step 2: category fee lookup with default fallback
        let category = self.categories.resolve(&inputs.category_id);

        // Step 3: both VAT bases of the sale price
        let price = vat_normalized(sale_price, vat_rate, inputs.price_includes_vat);
        let vat_amount = price.inc_vat - price.ex_vat;

        // Step 4: what the customer pays in total
        let total_revenue = round_half_up(price.inc_vat + shipping_charge);

        // Step 5: marketplace fees on the full customer payment
        let referral_fee = self.referral_fee(total_revenue, category.fee_percentage);
        let payment_processing_fee = Decimal::ZERO;
        let total_marketplace_fees = referral_fee + payment_processing_fee;

        // Step 6: everything the sale costs the seller
        let total_costs = round_half_up(item_cost + shipping_cost + total_marketplace_fees);

        // Steps 7-8: seller revenue excludes VAT, which is owed onward
        let net_revenue = round_half_up(price.ex_vat + shipping_charge);
        let net_profit = net_revenue - total_costs;

        // Steps 9-10: guarded percentages
        let profit_margin = self.profit_margin(net_profit, net_revenue);
        let roi = self.roi(net_profit, item_cost + shipping_cost);

        ProfitBreakdown {
            total_revenue,
            vat_amount,
            referral_fee,
            payment_processing_fee,
            total_marketplace_fees,
            total_costs,
            net_profit,
            profit_margin,
            roi,
        }
    }

    /// Referral fee on the total customer payment (Step 5).
    fn referral_fee(
        &self,
        total_revenue: Decimal,
        fee_percentage: Decimal,
    ) -> Decimal {
        round_half_up(total_revenue * fee_percentage / Decimal::ONE_HUNDRED)
    }

    /// Profit margin percentage (Step 9). Zero revenue is defined as a
    /// 0% margin, not an error.
    fn profit_margin(
        &self,
        net_profit: Decimal,
        net_revenue: Decimal,
    ) -> Decimal {
        if net_revenue <= Decimal::ZERO {
            debug!(%net_revenue, "net revenue not positive; margin defined as 0%");
            return Decimal::ZERO;
        }

        round_half_up(net_profit / net_revenue * Decimal::ONE_HUNDRED)
    }

    /// Return on investment percentage (Step 10). Zero acquisition cost
    /// is defined as 0% ROI, not an error.
    fn roi(
        &self,
        net_profit: Decimal,
        acquisition_cost: Decimal,
    ) -> Decimal {
        if acquisition_cost <= Decimal::ZERO {
            debug!(%acquisition_cost, "acquisition cost not positive; ROI defined as 0%");
            return Decimal::ZERO;
        }

        round_half_up(net_profit / acquisition_cost * Decimal::ONE_HUNDRED)
    }
}
