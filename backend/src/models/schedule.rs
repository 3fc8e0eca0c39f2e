// ============================================================================
// Schedule model and feed parsing
// ============================================================================
//
// The feed nests talks as days -> tracks -> talks. Parsing flattens that into
// one list of talks per day, normalizes every time into `TimeOfDay` and keeps
// days in the order the feed lists them.

use log::warn;
use serde::{Deserialize, Serialize};

use super::TimeOfDay;
use crate::error::{ProgrammeError, ProgrammeResult};

crate::define_id_type!(TalkId);

/// A scheduled talk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Talk {
    pub id: TalkId,
    pub title: String,
    /// Talk format (conference, lab, quickie...), drives the format tag
    pub format: String,
    /// Track identifier, drives the legend colour
    pub track: String,
    /// Room name; talks without a room never match a grid column
    pub room: Option<String>,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl Talk {
    /// Whether a slot starting at `slot` falls within `[start, end)`.
    pub fn occupies(&self, slot: TimeOfDay) -> bool {
        self.start <= slot && slot < self.end
    }

    /// Whether the two talks share at least one minute.
    pub fn overlaps(&self, other: &Talk) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn is_in_room(&self, room: &str) -> bool {
        self.room.as_deref() == Some(room)
    }
}

/// A conference day: a date label plus the talks scheduled on it, in feed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub date: String,
    pub talks: Vec<Talk>,
}

/// Immutable schedule snapshot for one render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub days: Vec<Day>,
    /// SHA-256 of the raw feed payload, empty when built in memory
    #[serde(default)]
    pub checksum: String,
}

impl Schedule {
    /// Build a schedule from days, merging repeated dates into the first occurrence.
    pub fn new(days: Vec<Day>) -> Self {
        let mut merged: Vec<Day> = Vec::with_capacity(days.len());
        for day in days {
            match merged.iter_mut().find(|d| d.date == day.date) {
                Some(existing) => {
                    for talk in day.talks {
                        if !existing.talks.contains(&talk) {
                            existing.talks.push(talk);
                        }
                    }
                }
                None => {
                    let mut talks: Vec<Talk> = Vec::with_capacity(day.talks.len());
                    for talk in day.talks {
                        if !talks.contains(&talk) {
                            talks.push(talk);
                        }
                    }
                    merged.push(Day {
                        date: day.date,
                        talks,
                    });
                }
            }
        }

        Self {
            days: merged,
            checksum: String::new(),
        }
    }

    /// Date labels in feed order.
    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.days.iter().map(|d| d.date.as_str())
    }

    pub fn day(&self, date: &str) -> Option<&Day> {
        self.days.iter().find(|d| d.date == date)
    }

    /// All talks across all days.
    pub fn talks(&self) -> impl Iterator<Item = &Talk> {
        self.days.iter().flat_map(|d| d.talks.iter())
    }

    pub fn talk(&self, id: &TalkId) -> Option<&Talk> {
        self.talks().find(|t| &t.id == id)
    }

    pub fn talk_count(&self) -> usize {
        self.days.iter().map(|d| d.talks.len()).sum()
    }
}

#[derive(Deserialize)]
struct ProgrammeInput {
    #[serde(rename = "jours", alias = "days")]
    days: Vec<DayInput>,
}

#[derive(Deserialize)]
struct DayInput {
    date: String,
    #[serde(default)]
    tracks: Option<Vec<TrackInput>>,
}

#[derive(Deserialize)]
struct TrackInput {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    talks: Option<Vec<TalkInput>>,
}

#[derive(Deserialize)]
struct TalkInput {
    id: TalkId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    room: Option<String>,
    #[serde(default)]
    track: Option<String>,
    #[serde(alias = "time")]
    start: String,
    end: String,
}

fn validate_input_programme(value: &serde_json::Value) -> ProgrammeResult<()> {
    let has_days = value
        .as_object()
        .map(|obj| obj.contains_key("jours") || obj.contains_key("days"))
        .unwrap_or(false);
    if !has_days {
        return Err(ProgrammeError::Parse(
            "Missing required 'jours' field".to_string(),
        ));
    }
    Ok(())
}

fn normalize_talk(date: &str, track_kind: Option<&str>, input: TalkInput) -> ProgrammeResult<Talk> {
    let start: TimeOfDay = input.start.parse()?;
    let end: TimeOfDay = input.end.parse()?;
    if end < start {
        return Err(ProgrammeError::Parse(format!(
            "Talk {} on {} ends at {} before it starts at {}",
            input.id, date, end, start
        )));
    }

    let title = input.title.unwrap_or_default();
    let room = input.room.filter(|r| !r.trim().is_empty());
    if room.is_none() {
        warn!("Talk {} ({}) on {} has no room", input.id, title, date);
    }

    Ok(Talk {
        id: input.id,
        title,
        format: input.format.unwrap_or_default(),
        track: input
            .track
            .or_else(|| track_kind.map(str::to_string))
            .unwrap_or_default(),
        room,
        start,
        end,
    })
}

/// Parse the programme feed.
///
/// Accepts either the full event document `{"programme": {"jours": [...]}}` or the bare
/// programme object `{"jours": [...]}`. Talks inherit their track from the enclosing
/// track entry when they do not carry one.
///
/// # Returns
///
/// A `Schedule` with days in feed order and the checksum of the raw payload.
pub fn parse_schedule_json_str(json: &str) -> ProgrammeResult<Schedule> {
    let mut value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| ProgrammeError::Parse(format!("Invalid schedule JSON: {}", e)))?;

    let programme = if value.get("programme").is_some() {
        value["programme"].take()
    } else {
        value
    };
    validate_input_programme(&programme)?;

    let input: ProgrammeInput = serde_json::from_value(programme)
        .map_err(|e| ProgrammeError::Parse(format!("Failed to deserialize programme: {}", e)))?;

    let mut days = Vec::with_capacity(input.days.len());
    for day in input.days {
        let mut talks = Vec::new();
        for track in day.tracks.unwrap_or_default() {
            let kind = track.kind.as_deref();
            for talk in track.talks.unwrap_or_default() {
                talks.push(normalize_talk(&day.date, kind, talk)?);
            }
        }
        days.push(Day {
            date: day.date,
            talks,
        });
    }

    let mut schedule = Schedule::new(days);
    schedule.checksum = compute_schedule_checksum(json);
    Ok(schedule)
}

/// Compute a checksum for the schedule JSON
fn compute_schedule_checksum(json_str: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(json_str.as_bytes());
    hex::encode(hasher.finalize())
}
