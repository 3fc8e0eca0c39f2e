//! Schedule index.
//!
//! Derived lookups over one [`Schedule`] snapshot: dates in feed order, the sorted
//! slots and rooms of each day, and the `(date, slot, room)` cell lookup the grid
//! layout is built on. The index is computed once per snapshot and never mutated.
//!
//! Talks are referenced by position within their day, so every lookup hands out
//! borrows of the schedule the index shares.

use log::warn;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::config::ConflictPolicy;
use crate::error::{ProgrammeError, ProgrammeResult};
use crate::models::{Schedule, Talk, TimeOfDay};

#[derive(Debug, Clone)]
struct DayIndex {
    /// Position of the day in `Schedule::days`
    day: usize,
    slots: Vec<TimeOfDay>,
    rooms: Vec<String>,
    /// Positions of the talks starting in each `(slot, room)` cell, feed order
    cells: HashMap<(TimeOfDay, String), Vec<usize>>,
}

#[derive(Debug, Clone)]
pub struct ScheduleIndex {
    schedule: Arc<Schedule>,
    overflow_room: Option<String>,
    days: Vec<DayIndex>,
}

impl ScheduleIndex {
    /// Build the index for `schedule`.
    ///
    /// `overflow_room` names the room left out of grid columns when
    /// `rooms_for_date` is called with `include_overflow == false`.
    pub fn build(schedule: Arc<Schedule>, overflow_room: Option<String>) -> Self {
        let days = schedule
            .days
            .iter()
            .enumerate()
            .map(|(position, day)| {
                let mut slots = BTreeSet::new();
                let mut rooms = BTreeSet::new();
                let mut cells: HashMap<(TimeOfDay, String), Vec<usize>> = HashMap::new();

                for (i, talk) in day.talks.iter().enumerate() {
                    slots.insert(talk.start);
                    if let Some(room) = &talk.room {
                        rooms.insert(room.clone());
                        cells.entry((talk.start, room.clone())).or_default().push(i);
                    }
                }

                DayIndex {
                    day: position,
                    slots: slots.into_iter().collect(),
                    rooms: rooms.into_iter().collect(),
                    cells,
                }
            })
            .collect();

        Self {
            schedule,
            overflow_room,
            days,
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn overflow_room(&self) -> Option<&str> {
        self.overflow_room.as_deref()
    }

    fn day_index(&self, date: &str) -> ProgrammeResult<&DayIndex> {
        self.days
            .iter()
            .find(|d| self.schedule.days[d.day].date == date)
            .ok_or_else(|| ProgrammeError::UnknownDate(date.to_string()))
    }

    /// Date labels in the order the feed lists them.
    pub fn dates(&self) -> Vec<&str> {
        self.schedule.dates().collect()
    }

    /// Talks grouped by date.
    pub fn talks_by_date(&self) -> HashMap<&str, Vec<&Talk>> {
        self.schedule
            .days
            .iter()
            .map(|day| (day.date.as_str(), day.talks.iter().collect()))
            .collect()
    }

    pub fn talks_for_date(&self, date: &str) -> ProgrammeResult<&[Talk]> {
        let day = self.day_index(date)?;
        Ok(&self.schedule.days[day.day].talks)
    }

    /// Rooms used on `date`, sorted. Talks without a room contribute nothing.
    pub fn rooms_for_date(&self, date: &str, include_overflow: bool) -> ProgrammeResult<Vec<&str>> {
        let day = self.day_index(date)?;
        Ok(day
            .rooms
            .iter()
            .map(String::as_str)
            .filter(|room| include_overflow || Some(*room) != self.overflow_room.as_deref())
            .collect())
    }

    /// Distinct start times on `date`, ascending.
    pub fn slots_for_date(&self, date: &str) -> ProgrammeResult<&[TimeOfDay]> {
        Ok(&self.day_index(date)?.slots)
    }

    /// All talks starting in `(date, slot, room)`, in feed order.
    pub fn talks_in_cell(&self, date: &str, slot: TimeOfDay, room: &str) -> ProgrammeResult<Vec<&Talk>> {
        let day = self.day_index(date)?;
        let talks = &self.schedule.days[day.day].talks;
        Ok(day
            .cells
            .get(&(slot, room.to_string()))
            .map(|positions| positions.iter().map(|&i| &talks[i]).collect())
            .unwrap_or_default())
    }

    /// The talk starting in `(date, slot, room)`.
    ///
    /// More than one candidate is a scheduling conflict in the feed: with
    /// [`ConflictPolicy::Fail`] it is reported as `AmbiguousSlot`, with
    /// [`ConflictPolicy::KeepLast`] the last talk in feed order wins.
    pub fn talk_at(
        &self,
        date: &str,
        slot: TimeOfDay,
        room: &str,
        policy: ConflictPolicy,
    ) -> ProgrammeResult<Option<&Talk>> {
        let candidates = self.talks_in_cell(date, slot, room)?;
        match candidates.as_slice() {
            [] => Ok(None),
            [talk] => Ok(Some(*talk)),
            [first, second, ..] => match policy {
                ConflictPolicy::Fail => Err(ProgrammeError::AmbiguousSlot {
                    date: date.to_string(),
                    slot,
                    room: room.to_string(),
                    first: first.id.clone(),
                    second: second.id.clone(),
                }),
                ConflictPolicy::KeepLast => {
                    let kept = candidates[candidates.len() - 1];
                    warn!(
                        "Two talks for {} {} {}: {} and {}, keeping {}",
                        date, slot, room, first.id, second.id, kept.id
                    );
                    Ok(Some(kept))
                }
            },
        }
    }

    /// Earliest end among the talks drawn at `slot` in `rooms`.
    ///
    /// Each room contributes the talk [`Self::talk_at`] resolves under `policy`, so a
    /// duplicate dropped by [`ConflictPolicy::KeepLast`] never sets the end time.
    /// `None` when no talk starts there; callers must not print it as a time.
    pub fn end_of_slot(
        &self,
        date: &str,
        slot: TimeOfDay,
        rooms: &[&str],
        policy: ConflictPolicy,
    ) -> ProgrammeResult<Option<TimeOfDay>> {
        let mut end: Option<TimeOfDay> = None;
        for room in rooms {
            if let Some(talk) = self.talk_at(date, slot, room, policy)? {
                end = Some(end.map_or(talk.end, |e| e.min(talk.end)));
            }
        }
        Ok(end)
    }

    /// Number of the day's slots falling within `[talk.start, talk.end)`.
    pub fn row_span(&self, date: &str, talk: &Talk) -> ProgrammeResult<usize> {
        Ok(self
            .slots_for_date(date)?
            .iter()
            .filter(|slot| talk.occupies(**slot))
            .count())
    }

    /// Pairs of talks sharing a room (overflow room included) with different start
    /// times and overlapping durations, in feed order.
    pub fn find_overlaps(&self, date: &str) -> ProgrammeResult<Vec<(&Talk, &Talk)>> {
        let talks = self.talks_for_date(date)?;
        let mut overlaps = Vec::new();
        for (i, a) in talks.iter().enumerate() {
            let Some(room) = a.room.as_deref() else {
                continue;
            };
            for b in &talks[i + 1..] {
                if b.is_in_room(room) && a.start != b.start && a.overlaps(b) {
                    overlaps.push((a, b));
                }
            }
        }
        Ok(overlaps)
    }

    /// Check every room of `date`, overflow room included, for scheduling conflicts.
    ///
    /// With [`ConflictPolicy::Fail`] the first duplicate cell or overlap is returned as
    /// an error; with [`ConflictPolicy::KeepLast`] overlaps are only logged.
    pub fn check_conflicts(&self, date: &str, policy: ConflictPolicy) -> ProgrammeResult<()> {
        let day = self.day_index(date)?;

        if policy == ConflictPolicy::Fail {
            for &slot in &day.slots {
                for room in &day.rooms {
                    self.talk_at(date, slot, room, policy)?;
                }
            }
        }

        for (first, second) in self.find_overlaps(date)? {
            let room = first.room.clone().unwrap_or_default();
            match policy {
                ConflictPolicy::Fail => {
                    return Err(ProgrammeError::OverlappingTalks {
                        date: date.to_string(),
                        room,
                        first: first.id.clone(),
                        second: second.id.clone(),
                    })
                }
                ConflictPolicy::KeepLast => warn!(
                    "Overlapping talks in room {} on {}: {} ({}-{}) and {} ({}-{})",
                    room, date, first.id, first.start, first.end, second.id, second.start, second.end
                ),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod index_tests;
