//! Profit and fee calculations for marketplace listings.
//!
//! The heart of this module is [`ProfitWorksheet`], a pure and total
//! calculator that turns raw listing inputs into a [`ProfitBreakdown`].
//! Shared helpers (rounding, parse-or-zero, VAT normalization) live in
//! [`common`] so the validator and display layers derive the same numbers
//! the engine does.
//!
//! [`ProfitBreakdown`]: crate::models::ProfitBreakdown

pub mod common;
pub mod profit;

pub use profit::{ProfitWorksheet, VatPrice, vat_normalized};
