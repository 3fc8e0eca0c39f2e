//! Schedule feed trait.

use async_trait::async_trait;
use log::debug;

use crate::error::ProgrammeResult;
use crate::models::{Schedule, TalkDetail, TalkDetailCache, TalkId};

/// Source of the schedule snapshot and of per-talk details.
///
/// Both lookups are one-shot: implementations do not retry, and a failed schedule
/// fetch aborts the render.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so one feed can be shared by the HTTP handlers.
#[async_trait]
pub trait ScheduleFeed: Send + Sync {
    /// Fetch and parse the whole schedule.
    ///
    /// # Returns
    /// * `Ok(Schedule)` - The parsed snapshot
    /// * `Err(ProgrammeError::Feed)` - If the feed is unreachable
    /// * `Err(ProgrammeError::Parse)` - If the payload is malformed
    async fn fetch_schedule(&self) -> ProgrammeResult<Schedule>;

    /// Fetch the detail of one talk.
    ///
    /// # Returns
    /// * `Ok(Some(detail))` - Detail found
    /// * `Ok(None)` - The feed has no detail for this talk
    async fn fetch_detail(&self, id: &TalkId) -> ProgrammeResult<Option<TalkDetail>>;

    /// Fetch the details of every listed talk.
    ///
    /// The default implementation performs one lookup per identifier; feeds with a
    /// bulk endpoint override it.
    async fn fetch_all_details(&self, ids: &[TalkId]) -> ProgrammeResult<TalkDetailCache> {
        let mut cache = TalkDetailCache::new();
        for id in ids {
            match self.fetch_detail(id).await? {
                Some(detail) => cache.insert(detail),
                None => debug!("No detail for talk {}", id),
            }
        }
        Ok(cache)
    }
}
