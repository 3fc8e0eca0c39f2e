#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use progpdf::models::{Day, Schedule, Speaker, Talk, TalkDetail, TalkId};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to the process
/// environment across parallel tests.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Schedule builders
// =============================================================================

pub fn talk(id: &str, track: &str, room: &str, start: &str, end: &str) -> Talk {
    Talk {
        id: TalkId::new(id),
        title: format!("Talk {}", id),
        format: "conference".to_string(),
        track: track.to_string(),
        room: Some(room.to_string()),
        start: start.parse().unwrap(),
        end: end.parse().unwrap(),
    }
}

pub fn schedule(days: Vec<(&str, Vec<Talk>)>) -> Schedule {
    Schedule::new(
        days.into_iter()
            .map(|(date, talks)| Day {
                date: date.to_string(),
                talks,
            })
            .collect(),
    )
}

pub fn detail(id: &str, speakers: &[&str]) -> TalkDetail {
    TalkDetail {
        id: TalkId::new(id),
        title: format!("Talk {}", id),
        description: format!("Abstract of talk {}", id),
        speakers: speakers
            .iter()
            .map(|name| Speaker {
                id: None,
                fullname: name.to_string(),
                avatar: None,
                description: None,
            })
            .collect(),
        tags: vec![],
    }
}

/// A conference day with a keynote, parallel sessions, a lab crossing the
/// afternoon break and a hallway talk.
pub fn conference_day() -> Vec<Talk> {
    vec![
        talk("k", "keynote", "Amphi A", "9:00", "9:45"),
        talk("a1", "track1", "Amphi A", "10:00", "10:50"),
        talk("b1", "track2", "Amphi B", "10:00", "10:50"),
        talk("lab", "track3", "Lab", "10:00", "12:00"),
        talk("a2", "track1", "Amphi A", "11:00", "11:50"),
        talk("b2", "track4", "Amphi B", "11:00", "11:50"),
        talk("q", "track8", "Hall", "13:15", "13:30"),
        talk("lab2", "track3", "Lab", "13:30", "15:30"),
        talk("a3", "track5", "Amphi A", "14:00", "14:50"),
        talk("b3", "track2", "Amphi B", "14:00", "14:50"),
        talk("a4", "track5", "Amphi A", "15:00", "15:50"),
    ]
}

/// Raw feed document in the conference API format.
pub const FEED_JSON: &str = r#"{
    "programme": {
        "jours": [
            {
                "date": "10/06/2015",
                "tracks": [
                    {
                        "type": "track1",
                        "talks": [
                            { "id": "1", "title": "Rust in production", "format": "conference",
                              "room": "Amphi A", "start": "10:00", "end": "10:50" },
                            { "id": "2", "title": "Async all the things", "format": "conference",
                              "room": "Amphi A", "start": "14:00", "end": "14:50" }
                        ]
                    },
                    {
                        "type": "track2",
                        "talks": [
                            { "id": "3", "title": "Testing at scale", "format": "quickie",
                              "room": "Amphi B", "time": "10:00", "end": "10:15" }
                        ]
                    }
                ]
            }
        ]
    }
}"#;

pub const DETAILS_JSON: &str = r#"[
    { "id": "1", "title": "Rust in production", "description": "Lessons *learned*.",
      "speakers": [ { "fullname": "Ada Lovelace" } ] },
    { "id": "3", "title": "Testing at scale", "description": null,
      "speakers": [ { "fullname": "Grace Hopper" }, { "fullname": null } ] }
]"#;
