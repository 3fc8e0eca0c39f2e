//! Programme configuration.
//!
//! Configuration is read from a TOML file and can be overridden through
//! environment variables. Every field has a default, so an empty file (or no file
//! at all) yields a working configuration for the 2015 edition.
//!
//! ```toml
//! [feed]
//! schedule_url = "http://cfp.breizhcamp.org/programme"
//! detail_url_template = "http://cfp.breizhcamp.org/accepted/talk/{id}"
//!
//! [layout]
//! overflow_room = "Hall"
//! break_at = "14:00"
//! conflict_policy = "fail"
//!
//! [edition]
//! title = "BreizhCamp 2015"
//! dates = "10, 11 et 12 juin"
//!
//! [[tracks]]
//! id = "track1"
//! label = "Architecture, Performance & Securité"
//! color = "#FF69BB"
//! opacity = 50
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ProgrammeError, ProgrammeResult};
use crate::models::TimeOfDay;
use crate::render::color::Rgb;

/// What to do when the feed places two talks in the same room at overlapping times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Abort the render with a consistency error
    #[default]
    Fail,
    /// Log a warning and keep the talk listed last in the feed
    KeepLast,
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail" | "strict" => Ok(Self::Fail),
            "keep_last" | "keep-last" | "last" => Ok(Self::KeepLast),
            _ => Err(format!("Unknown conflict policy: {}", s)),
        }
    }
}

/// Full programme configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgrammeConfig {
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub edition: EditionSettings,
    #[serde(default = "default_tracks")]
    pub tracks: Vec<TrackStyle>,
}

/// Where the schedule and talk details come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSettings {
    #[serde(default = "default_schedule_url")]
    pub schedule_url: String,
    /// Per-talk detail URL; `{id}` is replaced with the talk identifier
    #[serde(default = "default_detail_url_template")]
    pub detail_url_template: String,
    /// Single URL returning every talk detail at once, preferred when set
    #[serde(default)]
    pub bulk_detail_url: Option<String>,
    /// Read the schedule from a local file instead of the network
    #[serde(default)]
    pub schedule_file: Option<PathBuf>,
    /// Bulk detail file used together with `schedule_file`
    #[serde(default)]
    pub detail_file: Option<PathBuf>,
}

/// Grid layout parameters shared by every document kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutSettings {
    /// Room tracked for conflicts but not drawn as a grid column
    #[serde(default)]
    pub overflow_room: Option<String>,
    /// Draw the overflow room as a column anyway
    #[serde(default)]
    pub show_overflow: bool,
    /// Start a new page at the first slot at or after `break_at`
    #[serde(default = "default_true")]
    pub split_day: bool,
    #[serde(default = "default_break_at")]
    pub break_at: TimeOfDay,
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
    #[serde(default = "default_true")]
    pub show_legend: bool,
    /// Shorter room labels for the pocket programmes
    #[serde(default)]
    pub short_room_names: HashMap<String, String>,
}

/// Edition-specific texts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditionSettings {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_dates")]
    pub dates: String,
    /// Large line on the cover page
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
    /// Footer printed on every page but the cover
    #[serde(default = "default_footer")]
    pub footer: Option<String>,
}

/// Colour and display name of a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackStyle {
    pub id: String,
    pub label: String,
    pub color: Rgb,
    /// Alpha (0-255) used to blend the colour over the white page
    #[serde(default = "default_opacity")]
    pub opacity: u8,
}

impl TrackStyle {
    fn new(id: &str, label: &str, hex: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            color: Rgb::from_hex(hex).unwrap_or(Rgb::WHITE),
            opacity: 50,
        }
    }

    /// Background colour as printed.
    pub fn fill(&self) -> Rgb {
        self.color.over_white(self.opacity)
    }
}

fn default_true() -> bool {
    true
}

fn default_schedule_url() -> String {
    "http://cfp.breizhcamp.org/programme".to_string()
}

fn default_detail_url_template() -> String {
    "http://cfp.breizhcamp.org/accepted/talk/{id}".to_string()
}

fn default_break_at() -> TimeOfDay {
    TimeOfDay::from_hm(14, 0).unwrap_or(TimeOfDay::MIDNIGHT)
}

fn default_title() -> String {
    "BreizhCamp 2015".to_string()
}

fn default_dates() -> String {
    "10, 11 et 12 juin".to_string()
}

fn default_subtitle() -> String {
    "Programme 2015".to_string()
}

fn default_footer() -> Option<String> {
    Some("BreizhCamp 2015".to_string())
}

fn default_opacity() -> u8 {
    255
}

fn default_tracks() -> Vec<TrackStyle> {
    vec![
        TrackStyle::new("keynote", "Keynote", "#93D2C5"),
        TrackStyle::new("track1", "Architecture, Performance & Securité", "#FF69BB"),
        TrackStyle::new("track2", "Agilité, Méthodologie & Tests", "#8ADAFF"),
        TrackStyle::new("track3", "Java, JVM, Javas SE/EE", "#EDFF75"),
        TrackStyle::new("track4", "Cloud, DevOps, Outils", "#FFDF6C"),
        TrackStyle::new("track5", "BigData et Analytics", "#C3B6FA"),
        TrackStyle::new("track6", "Objects connectés, IoT, Robotique", "#FFA5FF"),
        TrackStyle::new("track7", "Languages", "#FFFF66"),
        TrackStyle::new("track8", "Web, Mobile & UX", "#66FFFF"),
        TrackStyle::new("track9", "Web, Mobile & UX", "#66FFFF"),
    ]
}

impl Default for ProgrammeConfig {
    fn default() -> Self {
        Self {
            feed: FeedSettings::default(),
            layout: LayoutSettings::default(),
            edition: EditionSettings::default(),
            tracks: default_tracks(),
        }
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            schedule_url: default_schedule_url(),
            detail_url_template: default_detail_url_template(),
            bulk_detail_url: None,
            schedule_file: None,
            detail_file: None,
        }
    }
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            overflow_room: None,
            show_overflow: false,
            split_day: true,
            break_at: default_break_at(),
            conflict_policy: ConflictPolicy::default(),
            show_legend: true,
            short_room_names: HashMap::new(),
        }
    }
}

impl LayoutSettings {
    /// Page break threshold, if the day is split at all.
    pub fn page_break(&self) -> Option<TimeOfDay> {
        self.split_day.then_some(self.break_at)
    }

    /// Label used for `room` where space is short.
    pub fn short_room_name<'a>(&'a self, room: &'a str) -> &'a str {
        self.short_room_names
            .get(room)
            .map(String::as_str)
            .unwrap_or(room)
    }
}

impl Default for EditionSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            dates: default_dates(),
            subtitle: default_subtitle(),
            footer: default_footer(),
        }
    }
}

impl ProgrammeConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(ProgrammeConfig)` if successful
    /// * `Err(ProgrammeError::Configuration)` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> ProgrammeResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ProgrammeError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ProgrammeResult<Self> {
        toml::from_str(content).map_err(|e| {
            ProgrammeError::Configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `programme.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    ///
    /// Returns `Ok(None)` when no file exists.
    pub fn from_default_location() -> ProgrammeResult<Option<Self>> {
        let search_paths = [
            PathBuf::from("programme.toml"),
            PathBuf::from("backend/programme.toml"),
            PathBuf::from("../programme.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// Resolve the configuration for this process.
    ///
    /// # Environment Variables
    /// - `PROGPDF_CONFIG` (optional): explicit configuration file path
    /// - `SCHEDULE_URL` (optional): overrides `feed.schedule_url`
    /// - `SCHEDULE_FILE` (optional): overrides `feed.schedule_file`
    /// - `DETAIL_FILE` (optional): overrides `feed.detail_file`
    /// - `CONFLICT_POLICY` (optional): `fail` | `keep_last`
    pub fn load() -> ProgrammeResult<Self> {
        let mut config = match env::var("PROGPDF_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::from_default_location()?.unwrap_or_default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment overrides on top of file values.
    pub fn apply_env_overrides(&mut self) -> ProgrammeResult<()> {
        if let Ok(url) = env::var("SCHEDULE_URL") {
            self.feed.schedule_url = url;
        }
        if let Ok(path) = env::var("SCHEDULE_FILE") {
            self.feed.schedule_file = Some(PathBuf::from(path));
        }
        if let Ok(path) = env::var("DETAIL_FILE") {
            self.feed.detail_file = Some(PathBuf::from(path));
        }
        if let Ok(policy) = env::var("CONFLICT_POLICY") {
            self.layout.conflict_policy = policy
                .parse()
                .map_err(ProgrammeError::Configuration)?;
        }
        Ok(())
    }

    pub fn track_style(&self, track: &str) -> Option<&TrackStyle> {
        self.tracks.iter().find(|t| t.id == track)
    }

    /// Display name of a track, falling back to its identifier.
    pub fn track_label<'a>(&'a self, track: &'a str) -> &'a str {
        self.track_style(track)
            .map(|t| t.label.as_str())
            .unwrap_or(track)
    }

    /// Background colour of a track, `None` for unknown tracks.
    pub fn track_fill(&self, track: &str) -> Option<Rgb> {
        self.track_style(track).map(TrackStyle::fill)
    }
}
