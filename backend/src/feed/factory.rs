//! Feed factory.
//!
//! Picks the feed implementation from the `[feed]` settings: a configured schedule
//! file selects the local feed, anything else reads the HTTP feed.

use std::str::FromStr;
use std::sync::Arc;

use super::http::HttpFeed;
use super::local::LocalFeed;
use super::source::ScheduleFeed;
use crate::config::FeedSettings;
use crate::error::{ProgrammeError, ProgrammeResult};

/// Feed implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedType {
    /// Remote JSON feed
    Http,
    /// Schedule and details read from local files
    Local,
}

impl FromStr for FeedType {
    type Err = String;

    /// Parse feed type from string ("http", "local").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" | "https" | "remote" => Ok(Self::Http),
            "local" | "file" => Ok(Self::Local),
            _ => Err(format!("Unknown feed type: {}", s)),
        }
    }
}

impl FeedType {
    pub fn from_settings(settings: &FeedSettings) -> Self {
        if settings.schedule_file.is_some() {
            Self::Local
        } else {
            Self::Http
        }
    }
}

/// Create the feed described by `settings`.
///
/// # Returns
/// * `Ok(Arc<dyn ScheduleFeed>)` - Shared feed instance
/// * `Err(ProgrammeError)` - If local files cannot be read or the HTTP client cannot be built
pub fn create_feed(settings: &FeedSettings) -> ProgrammeResult<Arc<dyn ScheduleFeed>> {
    create_feed_of_type(FeedType::from_settings(settings), settings)
}

pub fn create_feed_of_type(
    feed_type: FeedType,
    settings: &FeedSettings,
) -> ProgrammeResult<Arc<dyn ScheduleFeed>> {
    match feed_type {
        FeedType::Http => Ok(Arc::new(HttpFeed::new(settings)?)),
        FeedType::Local => {
            let path = settings.schedule_file.as_ref().ok_or_else(|| {
                ProgrammeError::Configuration(
                    "Local feed requires feed.schedule_file".to_string(),
                )
            })?;
            let feed = LocalFeed::from_files(path, settings.detail_file.as_ref())?;
            Ok(Arc::new(feed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_feed_type_from_str() {
        assert_eq!("HTTP".parse::<FeedType>().unwrap(), FeedType::Http);
        assert_eq!("file".parse::<FeedType>().unwrap(), FeedType::Local);
        assert!("ftp".parse::<FeedType>().is_err());
    }

    #[test]
    fn test_feed_type_from_settings() {
        let mut settings = FeedSettings::default();
        assert_eq!(FeedType::from_settings(&settings), FeedType::Http);
        settings.schedule_file = Some(PathBuf::from("programme.json"));
        assert_eq!(FeedType::from_settings(&settings), FeedType::Local);
    }

    #[test]
    fn test_local_feed_without_file_is_a_configuration_error() {
        let result = create_feed_of_type(FeedType::Local, &FeedSettings::default());
        assert!(matches!(result, Err(ProgrammeError::Configuration(_))));
    }
}
