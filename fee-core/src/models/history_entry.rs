use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ListingInputs, ProfitBreakdown};

/// One saved calculation: the input snapshot and the result derived from
/// it, frozen at save time.
///
/// Entries are immutable once created. They are only ever removed, either
/// individually or all at once; there is no edit operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub inputs: ListingInputs,
    pub results: ProfitBreakdown,
}

/// A calculation about to be saved (no id or timestamp yet; storage
/// assigns both).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub inputs: ListingInputs,
    pub results: ProfitBreakdown,
}
