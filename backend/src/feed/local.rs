//! In-memory schedule feed for tests and offline rendering.

use async_trait::async_trait;
use log::info;
use std::fs;
use std::path::Path;

use super::source::ScheduleFeed;
use crate::error::{ProgrammeError, ProgrammeResult};
use crate::models::{
    parse_schedule_json_str, parse_talk_details_json_str, Schedule, TalkDetail, TalkDetailCache,
    TalkId,
};

/// Feed serving a fixed schedule snapshot and detail set.
#[derive(Debug, Clone)]
pub struct LocalFeed {
    schedule: Schedule,
    details: TalkDetailCache,
}

impl LocalFeed {
    pub fn new(schedule: Schedule, details: TalkDetailCache) -> Self {
        Self { schedule, details }
    }

    /// Load a schedule file and an optional bulk detail file.
    pub fn from_files<P: AsRef<Path>>(schedule_path: P, detail_path: Option<P>) -> ProgrammeResult<Self> {
        let schedule_path = schedule_path.as_ref();
        let json = fs::read_to_string(schedule_path).map_err(|e| {
            ProgrammeError::Feed(format!(
                "Failed to read schedule file {}: {}",
                schedule_path.display(),
                e
            ))
        })?;
        let schedule = parse_schedule_json_str(&json)?;

        let details = match detail_path {
            Some(path) => {
                let path = path.as_ref();
                let json = fs::read_to_string(path).map_err(|e| {
                    ProgrammeError::Feed(format!(
                        "Failed to read detail file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                parse_talk_details_json_str(&json)?.into_iter().collect()
            }
            None => TalkDetailCache::new(),
        };

        info!(
            "Loaded {} talks and {} details from {}",
            schedule.talk_count(),
            details.len(),
            schedule_path.display()
        );
        Ok(Self::new(schedule, details))
    }
}

#[async_trait]
impl ScheduleFeed for LocalFeed {
    async fn fetch_schedule(&self) -> ProgrammeResult<Schedule> {
        Ok(self.schedule.clone())
    }

    async fn fetch_detail(&self, id: &TalkId) -> ProgrammeResult<Option<TalkDetail>> {
        Ok(self.details.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEDULE: &str = r#"{"jours": [{"date": "10/06/2015", "tracks": [{"type": "track1", "talks": [
        {"id": "1", "title": "A", "room": "Amphi A", "start": "09:00", "end": "10:00"},
        {"id": "2", "title": "B", "room": "Amphi B", "start": "09:00", "end": "10:00"}
    ]}]}]}"#;

    #[tokio::test]
    async fn test_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let schedule_path = dir.path().join("programme.json");
        let detail_path = dir.path().join("talks.json");
        fs::write(&schedule_path, SCHEDULE).unwrap();
        fs::write(&detail_path, r#"[{"id": "1", "title": "A", "description": "**hi**"}]"#).unwrap();

        let feed = LocalFeed::from_files(&schedule_path, Some(&detail_path)).unwrap();
        let schedule = feed.fetch_schedule().await.unwrap();
        assert_eq!(schedule.talk_count(), 2);

        let ids: Vec<TalkId> = schedule.talks().map(|t| t.id.clone()).collect();
        let details = feed.fetch_all_details(&ids).await.unwrap();
        assert_eq!(details.len(), 1);
        assert!(feed.fetch_detail(&TalkId::new("2")).await.unwrap().is_none());
    }

    #[test]
    fn test_missing_schedule_file() {
        let result = LocalFeed::from_files(Path::new("/nonexistent/programme.json"), None);
        assert!(matches!(result, Err(ProgrammeError::Feed(_))));
    }
}
