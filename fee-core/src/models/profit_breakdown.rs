use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Derived financial result for one listing.
///
/// Recomputed from scratch on every input change and never mutated in
/// place. All values are finite decimals rounded to two places;
/// `net_profit`, `profit_margin`, and `roi` may be negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitBreakdown {
    /// What the customer pays in total: VAT-inclusive price + shipping charge.
    pub total_revenue: Decimal,

    /// VAT portion of the item price (inc-VAT minus ex-VAT price).
    pub vat_amount: Decimal,

    /// Marketplace commission: category fee percentage of total revenue.
    pub referral_fee: Decimal,

    /// Always zero today; kept as an explicit field so a future payment
    /// fee schedule slots in without changing the record shape.
    pub payment_processing_fee: Decimal,

    /// Referral fee + payment processing fee.
    pub total_marketplace_fees: Decimal,

    /// Item cost + shipping cost + marketplace fees.
    pub total_costs: Decimal,

    /// Seller profit on the VAT-exclusive revenue basis.
    pub net_profit: Decimal,

    /// Net profit over net revenue, as a percentage; 0 when revenue is 0.
    pub profit_margin: Decimal,

    /// Net profit over acquisition cost (item + shipping cost), as a
    /// percentage; 0 when acquisition cost is 0.
    pub roi: Decimal,
}
