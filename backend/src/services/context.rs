//! Render context.
//!
//! Everything one render pass needs, loaded once: the configuration, the schedule
//! snapshot, its index and the talk details. The context is immutable after
//! construction; refreshing the data means building a new one.

use log::info;
use std::sync::Arc;

use super::index::ScheduleIndex;
use super::layout::{GridLayoutEngine, LayoutOptions};
use crate::config::ProgrammeConfig;
use crate::error::ProgrammeResult;
use crate::feed::ScheduleFeed;
use crate::models::{Schedule, TalkDetail, TalkDetailCache, TalkId};

#[derive(Debug, Clone)]
pub struct RenderContext {
    pub config: ProgrammeConfig,
    pub schedule: Arc<Schedule>,
    pub index: ScheduleIndex,
    pub details: TalkDetailCache,
}

impl RenderContext {
    /// Build a context from data already in memory.
    pub fn new(config: ProgrammeConfig, schedule: Schedule, details: TalkDetailCache) -> Self {
        let schedule = Arc::new(schedule);
        let index = ScheduleIndex::build(schedule.clone(), config.layout.overflow_room.clone());
        Self {
            config,
            schedule,
            index,
            details,
        }
    }

    /// Fetch the schedule and every talk detail from `feed`.
    ///
    /// A failed schedule fetch aborts; talks without details are only left out of
    /// the detail pages later.
    pub async fn load(feed: &dyn ScheduleFeed, config: ProgrammeConfig) -> ProgrammeResult<Self> {
        let schedule = feed.fetch_schedule().await?;

        let mut ids: Vec<TalkId> = Vec::with_capacity(schedule.talk_count());
        for talk in schedule.talks() {
            if !ids.contains(&talk.id) {
                ids.push(talk.id.clone());
            }
        }
        let details = feed.fetch_all_details(&ids).await?;

        info!(
            "Render context ready: {} days, {} talks, {} details",
            schedule.days.len(),
            ids.len(),
            details.len()
        );
        Ok(Self::new(config, schedule, details))
    }

    pub fn detail(&self, id: &TalkId) -> Option<&TalkDetail> {
        self.details.get(id)
    }

    pub fn layout_engine(&self, options: LayoutOptions) -> GridLayoutEngine<'_> {
        GridLayoutEngine::new(&self.index, options)
    }
}
