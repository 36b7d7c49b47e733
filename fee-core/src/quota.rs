//! Quota-gated saving: a limited number of free saves, then a reward
//! unlock.
//!
//! Sellers get [`MAX_FREE_SAVES`] free history saves. Once the quota is
//! spent, the next save request is parked inside the state machine and a
//! reward prompt is surfaced; confirming the reward runs the external
//! grant step, resets the quota, and replays the parked save exactly
//! once. Cancelling discards the parked save and leaves the quota spent.
//!
//! The pending save is data (a [`NewHistoryEntry`]) held inside the
//! [`QuotaState::AwaitingReward`] variant, not a stored callback:
//! releasing it moves it out of the state, so running it twice is
//! unrepresentable.
//!
//! The persisted save counter is injected at construction and read back
//! after every mutation; the controller itself never touches storage.
//!
//! # Example
//!
//! ```
//! use fee_core::models::{CategoryTable, ListingInputs, NewHistoryEntry};
//! use fee_core::calculations::ProfitWorksheet;
//! use fee_core::quota::{MAX_FREE_SAVES, SaveDecision, SaveQuota};
//!
//! let categories = CategoryTable::built_in();
//! let inputs = ListingInputs::default();
//! let results = ProfitWorksheet::new(&categories).calculate(&inputs);
//! let entry = NewHistoryEntry { inputs, results };
//!
//! let mut quota = SaveQuota::new(MAX_FREE_SAVES, 0);
//! match quota.request_save(entry) {
//!     SaveDecision::Persist(entry) => { /* hand to the repository */ }
//!     SaveDecision::RewardRequired => { /* surface the reward prompt */ }
//! }
//! assert_eq!(quota.save_count(), 1);
//! ```

use async_trait::async_trait;
use tracing::{debug, info};

use crate::models::NewHistoryEntry;

/// Free saves granted before the reward gate engages, and granted again
/// by each confirmed reward.
pub const MAX_FREE_SAVES: u32 = 3;

/// Where the controller is in the save/reward workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
enum QuotaState {
    /// Saves flow normally (or are gated on request, if the quota is spent).
    Idle,

    /// The quota is spent and one save is parked, waiting on the reward.
    AwaitingReward { pending: NewHistoryEntry },
}

/// What a save request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveDecision {
    /// Quota available: persist this entry now. The counter has already
    /// been charged; write it back after persisting.
    Persist(NewHistoryEntry),

    /// Quota spent: the entry is parked until [`SaveQuota::confirm_reward`]
    /// or [`SaveQuota::cancel_reward`].
    RewardRequired,
}

/// The external reward step — the single suspension point in the save
/// workflow. Under the current policy a requested reward always
/// eventually resolves as granted; there is no failure or timeout path.
#[async_trait]
pub trait RewardProvider: Send + Sync {
    async fn grant(&self);
}

/// A [`RewardProvider`] that grants instantly. Used by the CLI and in
/// tests, standing in for a real ad-view flow.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateReward;

#[async_trait]
impl RewardProvider for ImmediateReward {
    async fn grant(&self) {}
}

/// State machine governing when a computed result may be persisted.
///
/// Single-writer by construction: it takes `&mut self` for every
/// transition, so an owner task serializes all access to the counter and
/// the pending slot.
#[derive(Debug)]
pub struct SaveQuota {
    free_limit: u32,
    save_count: u32,
    state: QuotaState,
}

impl SaveQuota {
    /// Creates a controller with the given limit and the persisted
    /// counter loaded by the caller at startup.
    pub fn new(
        free_limit: u32,
        save_count: u32,
    ) -> Self {
        Self {
            free_limit,
            save_count,
            state: QuotaState::Idle,
        }
    }

    /// Saves consumed so far. Persist this after every mutation.
    pub fn save_count(&self) -> u32 {
        self.save_count
    }

    /// Free saves left before the reward gate engages.
    pub fn remaining_free_saves(&self) -> u32 {
        self.free_limit.saturating_sub(self.save_count)
    }

    /// True while a parked save is waiting on a reward decision.
    pub fn is_awaiting_reward(&self) -> bool {
        matches!(self.state, QuotaState::AwaitingReward { .. })
    }

    /// Requests persistence of a validated entry.
    ///
    /// Callers must run the full validation pass first; an invalid form
    /// never reaches the controller. Under the limit the entry is
    /// released immediately and the counter charged; otherwise it is
    /// parked and the caller should surface the reward prompt. A repeat
    /// request while already awaiting replaces the parked entry, so at
    /// most one save is ever pending.
    pub fn request_save(
        &mut self,
        entry: NewHistoryEntry,
    ) -> SaveDecision {
        if self.save_count < self.free_limit {
            self.save_count += 1;
            debug!(
                save_count = self.save_count,
                remaining = self.remaining_free_saves(),
                "free save consumed"
            );
            SaveDecision::Persist(entry)
        } else {
            if self.is_awaiting_reward() {
                debug!("replacing parked save with a newer request");
            }
            self.state = QuotaState::AwaitingReward { pending: entry };
            SaveDecision::RewardRequired
        }
    }

    /// Confirms the reward prompt: awaits the external grant, resets the
    /// quota, and releases the parked entry for persistence.
    ///
    /// The released save consumes one unit of the fresh quota, so the
    /// counter reads 1 afterwards. A no-op returning `None` when nothing
    /// is parked.
    pub async fn confirm_reward(
        &mut self,
        provider: &dyn RewardProvider,
    ) -> Option<NewHistoryEntry> {
        if !self.is_awaiting_reward() {
            return None;
        }

        provider.grant().await;

        match std::mem::replace(&mut self.state, QuotaState::Idle) {
            QuotaState::AwaitingReward { pending } => {
                // Reset, then the replayed save is charged against the
                // fresh quota.
                self.save_count = 1;
                info!(free_limit = self.free_limit, "reward granted; quota reset");
                Some(pending)
            }
            QuotaState::Idle => None,
        }
    }

    /// Dismisses the reward prompt, discarding the parked entry. The
    /// quota stays spent.
    pub fn cancel_reward(&mut self) {
        if self.is_awaiting_reward() {
            debug!("reward prompt cancelled; parked save discarded");
        }
        self.state = QuotaState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::ProfitWorksheet;
    use crate::models::{CategoryTable, ListingInputs};

    fn entry(item_name: &str) -> NewHistoryEntry {
        let categories = CategoryTable::built_in();
        let inputs = ListingInputs {
            item_name: item_name.to_string(),
            sale_price: "100".to_string(),
            item_cost: "40".to_string(),
            ..ListingInputs::default()
        };
        let results = ProfitWorksheet::new(&categories).calculate(&inputs);
        NewHistoryEntry { inputs, results }
    }

    fn persisted(decision: SaveDecision) -> NewHistoryEntry {
        match decision {
            SaveDecision::Persist(entry) => entry,
            SaveDecision::RewardRequired => panic!("expected an immediate persist"),
        }
    }

    // =========================================================================
    // free quota tests
    // =========================================================================

    #[test]
    fn free_saves_persist_immediately() {
        let mut quota = SaveQuota::new(3, 0);

        for n in 1..=3 {
            let decision = quota.request_save(entry(&format!("item {n}")));
            assert!(matches!(decision, SaveDecision::Persist(_)));
            assert_eq!(quota.save_count(), n);
            assert!(!quota.is_awaiting_reward());
        }

        assert_eq!(quota.remaining_free_saves(), 0);
    }

    #[test]
    fn fourth_save_is_gated() {
        let mut quota = SaveQuota::new(3, 0);
        for n in 1..=3 {
            persisted(quota.request_save(entry(&format!("item {n}"))));
        }

        let decision = quota.request_save(entry("item 4"));

        assert_eq!(decision, SaveDecision::RewardRequired);
        assert!(quota.is_awaiting_reward());
        assert_eq!(quota.save_count(), 3); // gating charges nothing
    }

    #[test]
    fn loaded_counter_is_respected() {
        // Counter persisted from an earlier session: already spent.
        let mut quota = SaveQuota::new(3, 3);

        let decision = quota.request_save(entry("first of this session"));

        assert_eq!(decision, SaveDecision::RewardRequired);
    }

    #[test]
    fn remaining_free_saves_never_underflows() {
        let quota = SaveQuota::new(3, 7);

        assert_eq!(quota.remaining_free_saves(), 0);
    }

    // =========================================================================
    // reward flow tests
    // =========================================================================

    #[tokio::test]
    async fn confirm_reward_replays_the_parked_save_once() {
        let mut quota = SaveQuota::new(3, 3);
        quota.request_save(entry("parked"));

        let released = quota.confirm_reward(&ImmediateReward).await;

        assert_eq!(released.unwrap().inputs.item_name, "parked");
        assert!(!quota.is_awaiting_reward());
        // Reset to 0, then the replayed save consumed one.
        assert_eq!(quota.save_count(), 1);

        // Nothing left to replay.
        assert_eq!(quota.confirm_reward(&ImmediateReward).await, None);
    }

    #[tokio::test]
    async fn quota_runs_fresh_after_a_reward() {
        let mut quota = SaveQuota::new(3, 3);
        quota.request_save(entry("parked"));
        quota.confirm_reward(&ImmediateReward).await.unwrap();

        // Two more free saves before the gate re-engages.
        persisted(quota.request_save(entry("fifth")));
        persisted(quota.request_save(entry("sixth")));
        assert_eq!(quota.request_save(entry("seventh")), SaveDecision::RewardRequired);
    }

    #[tokio::test]
    async fn confirm_in_idle_is_a_no_op() {
        let mut quota = SaveQuota::new(3, 0);

        assert_eq!(quota.confirm_reward(&ImmediateReward).await, None);
        assert_eq!(quota.save_count(), 0);
    }

    #[test]
    fn cancel_discards_the_parked_save_and_keeps_the_quota_spent() {
        let mut quota = SaveQuota::new(3, 3);
        quota.request_save(entry("parked"));

        quota.cancel_reward();

        assert!(!quota.is_awaiting_reward());
        assert_eq!(quota.save_count(), 3);
        // Still gated.
        assert_eq!(quota.request_save(entry("again")), SaveDecision::RewardRequired);
    }

    #[tokio::test]
    async fn repeat_request_replaces_the_parked_save() {
        let mut quota = SaveQuota::new(3, 3);
        quota.request_save(entry("older"));
        quota.request_save(entry("newer"));

        let released = quota.confirm_reward(&ImmediateReward).await;

        // At most one pending; the latest request wins.
        assert_eq!(released.unwrap().inputs.item_name, "newer");
        assert_eq!(quota.confirm_reward(&ImmediateReward).await, None);
    }

    #[test]
    fn cancel_in_idle_changes_nothing() {
        let mut quota = SaveQuota::new(3, 1);

        quota.cancel_reward();

        assert_eq!(quota.save_count(), 1);
        assert!(!quota.is_awaiting_reward());
    }
}
