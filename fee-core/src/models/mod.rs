mod category;
mod history_entry;
mod listing_inputs;
mod profit_breakdown;

pub use category::{Category, CategoryTable, DEFAULT_CATEGORY_ID};
pub use history_entry::{HistoryEntry, NewHistoryEntry};
pub use listing_inputs::ListingInputs;
pub use profit_breakdown::ProfitBreakdown;
