//! Talk details: speakers, description and tags.
//!
//! Details come from a separate feed (one document per talk or one bulk
//! document) and are looked up by talk identifier. A missing detail is not an
//! error; the talk is simply left out of the detail pages.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use super::TalkId;
use crate::error::{ProgrammeError, ProgrammeResult};

crate::define_id_type!(SpeakerId);

/// Treat JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speaker {
    #[serde(default)]
    pub id: Option<SpeakerId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fullname: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalkDetail {
    pub id: TalkId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Markdown abstract
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub speakers: Vec<Speaker>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

impl TalkDetail {
    /// Speaker names in feed order, skipping blank entries.
    pub fn speaker_names(&self) -> impl Iterator<Item = &str> {
        self.speakers
            .iter()
            .map(|s| s.fullname.trim())
            .filter(|name| !name.is_empty())
    }
}

/// Details resolved for one render pass, keyed by talk identifier.
#[derive(Debug, Clone, Default)]
pub struct TalkDetailCache {
    details: HashMap<TalkId, TalkDetail>,
}

impl TalkDetailCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a detail; the first detail stored for an identifier wins.
    pub fn insert(&mut self, detail: TalkDetail) {
        self.details.entry(detail.id.clone()).or_insert(detail);
    }

    pub fn get(&self, id: &TalkId) -> Option<&TalkDetail> {
        self.details.get(id)
    }

    pub fn contains(&self, id: &TalkId) -> bool {
        self.details.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.details.len()
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }
}

impl FromIterator<TalkDetail> for TalkDetailCache {
    fn from_iter<I: IntoIterator<Item = TalkDetail>>(iter: I) -> Self {
        let mut cache = Self::new();
        for detail in iter {
            cache.insert(detail);
        }
        cache
    }
}

/// Parse a single talk detail document. An empty body or `null` means "no detail".
pub fn parse_talk_detail_json_str(json: &str) -> ProgrammeResult<Option<TalkDetail>> {
    let trimmed = json.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Option<TalkDetail>>(trimmed)
        .map_err(|e| ProgrammeError::Parse(format!("Invalid talk detail JSON: {}", e)))
}

/// Parse a bulk detail document.
///
/// Accepts a JSON array of details or an object mapping talk identifiers to details.
/// `null` entries are skipped.
pub fn parse_talk_details_json_str(json: &str) -> ProgrammeResult<Vec<TalkDetail>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BulkInput {
        List(Vec<Option<TalkDetail>>),
        Map(HashMap<String, Option<TalkDetail>>),
    }

    let input: BulkInput = serde_json::from_str(json)
        .map_err(|e| ProgrammeError::Parse(format!("Invalid bulk detail JSON: {}", e)))?;

    Ok(match input {
        BulkInput::List(list) => list.into_iter().flatten().collect(),
        BulkInput::Map(map) => map.into_values().flatten().collect(),
    })
}
