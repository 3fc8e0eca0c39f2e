//! Grid layout laws checked over a realistic conference day.

mod support;

use std::collections::BTreeSet;
use std::sync::Arc;

use progpdf::config::ConflictPolicy;
use progpdf::models::{TalkId, TimeOfDay};
use progpdf::services::{CellContent, GridLayoutEngine, LayoutOptions, ScheduleIndex};
use progpdf::ProgrammeError;

use support::{conference_day, schedule, talk};

const DATE: &str = "10/06/2015";

fn t(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

fn conference_index() -> ScheduleIndex {
    ScheduleIndex::build(
        Arc::new(schedule(vec![(DATE, conference_day())])),
        Some("Hall".to_string()),
    )
}

fn options(break_at: Option<&str>) -> LayoutOptions {
    LayoutOptions {
        break_at: break_at.map(t),
        include_overflow: false,
        skip_empty_rows: false,
        conflict_policy: ConflictPolicy::Fail,
    }
}

#[test]
fn test_slots_are_distinct_sorted_start_times() {
    let index = conference_index();
    let expected: BTreeSet<TimeOfDay> = conference_day().iter().map(|t| t.start).collect();
    let slots = index.slots_for_date(DATE).unwrap();

    assert_eq!(slots.to_vec(), expected.into_iter().collect::<Vec<_>>());
    assert!(slots.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_talk_at_returns_each_talk_at_its_start_only() {
    let index = conference_index();
    let slots = index.slots_for_date(DATE).unwrap();
    let rooms = index.rooms_for_date(DATE, true).unwrap();

    for talk in conference_day() {
        let room = talk.room.as_deref().unwrap();
        let found = index
            .talk_at(DATE, talk.start, room, ConflictPolicy::Fail)
            .unwrap()
            .unwrap();
        assert_eq!(found.id, talk.id);

        for &slot in slots {
            for &other_room in &rooms {
                if slot == talk.start && other_room == room {
                    continue;
                }
                let other = index
                    .talk_at(DATE, slot, other_room, ConflictPolicy::Fail)
                    .unwrap();
                assert!(other.map_or(true, |o| o.id != talk.id));
            }
        }
    }
}

#[test]
fn test_row_span_law_without_page_break() {
    let index = conference_index();
    let day = GridLayoutEngine::new(&index, options(None))
        .layout_day(DATE)
        .unwrap();
    assert_eq!(day.pages.len(), 1);
    let rows = &day.pages[0].rows;
    let slots = index.slots_for_date(DATE).unwrap();

    for talk in conference_day() {
        let room = talk.room.as_deref().unwrap();
        if !day.rooms.contains(&room) {
            continue;
        }
        let covered: Vec<TimeOfDay> = slots.iter().copied().filter(|s| talk.occupies(*s)).collect();

        let starts: Vec<_> = rows
            .iter()
            .filter_map(|r| r.cell(room).map(|c| (r.slot, c.content)))
            .filter(|(_, c)| c.talk().map(|t| &t.id) == Some(&talk.id))
            .collect();
        assert_eq!(starts.len(), 1, "talk {} drawn once", talk.id);
        assert_eq!(starts[0].0, talk.start);
        assert_eq!(starts[0].1.row_span(), covered.len(), "span of {}", talk.id);

        for row in rows.iter().filter(|r| covered.contains(&r.slot) && r.slot != talk.start) {
            assert!(row.cell(room).is_none(), "{} at {} is covered", room, row.slot);
        }
    }
}

#[test]
fn test_every_page_is_rectangular() {
    let index = conference_index();
    for break_at in [None, Some("14:00"), Some("11:00")] {
        let day = GridLayoutEngine::new(&index, options(break_at))
            .layout_day(DATE)
            .unwrap();
        for page in &day.pages {
            for &room in &day.rooms {
                let covered: usize = page
                    .rows
                    .iter()
                    .filter_map(|r| r.cell(room))
                    .map(|c| c.content.row_span())
                    .sum();
                assert_eq!(covered, page.rows.len(), "room {} with break {:?}", room, break_at);
            }
        }
    }
}

#[test]
fn test_page_break_law() {
    let index = ScheduleIndex::build(
        Arc::new(schedule(vec![(
            "D",
            vec![
                talk("1", "track1", "A", "09:00", "10:00"),
                talk("2", "track1", "A", "10:00", "11:00"),
                talk("3", "track1", "A", "14:00", "15:00"),
                talk("4", "track1", "A", "15:00", "16:00"),
            ],
        )])),
        None,
    );
    let day = GridLayoutEngine::new(&index, options(Some("14:00")))
        .layout_day("D")
        .unwrap();
    assert_eq!(day.pages.len(), 2);
    assert_eq!(day.pages[0].slots(), vec![t("09:00"), t("10:00")]);
    assert_eq!(day.pages[1].slots(), vec![t("14:00"), t("15:00")]);
}

#[test]
fn test_lab_crossing_the_break_continues_on_next_page() {
    let index = conference_index();
    let day = GridLayoutEngine::new(&index, options(Some("14:00")))
        .layout_day(DATE)
        .unwrap();
    assert_eq!(day.pages.len(), 2);

    let morning = &day.pages[0];
    let lab = morning
        .rows
        .iter()
        .find_map(|r| r.cell("Lab").filter(|_| r.slot == t("13:30")))
        .unwrap();
    assert!(matches!(lab.content, CellContent::Talk { row_span: 1, .. }));

    let afternoon = &day.pages[1];
    let continued = afternoon.rows[0].cell("Lab").unwrap();
    match continued.content {
        CellContent::Continued { talk, row_span } => {
            assert_eq!(talk.id, TalkId::new("lab2"));
            assert_eq!(row_span, 2);
        }
        other => panic!("expected a continued cell, got {:?}", other),
    }
    assert!(afternoon.legend.contains(&"track3"));
}

#[test]
fn test_slot_end_ignores_overflow_room() {
    let index = conference_index();
    let day = GridLayoutEngine::new(&index, options(None))
        .layout_day(DATE)
        .unwrap();
    let rows = &day.pages[0].rows;

    let end_of = |slot: &str| rows.iter().find(|r| r.slot == t(slot)).unwrap().slot_end;
    assert_eq!(end_of("09:00"), Some(t("09:45")));
    assert_eq!(end_of("10:00"), Some(t("10:50")));
    // Only the hallway talk starts at 13:15
    assert_eq!(end_of("13:15"), None);
    assert_eq!(end_of("13:30"), Some(t("15:30")));
}

#[test]
fn test_ambiguity_law() {
    let index = ScheduleIndex::build(
        Arc::new(schedule(vec![(
            "D",
            vec![
                talk("1", "track1", "A", "10:00", "11:00"),
                talk("2", "track2", "A", "10:00", "11:00"),
            ],
        )])),
        None,
    );
    let result = index.talk_at("D", t("10:00"), "A", ConflictPolicy::Fail);
    assert!(matches!(result, Err(ProgrammeError::AmbiguousSlot { .. })));

    let layout = GridLayoutEngine::new(&index, options(None)).layout_day("D");
    assert!(layout.unwrap_err().is_consistency_fault());
}

#[test]
fn test_overlapping_talks_follow_the_conflict_policy() {
    let index = ScheduleIndex::build(
        Arc::new(schedule(vec![(
            "D",
            vec![
                talk("1", "track1", "A", "9:00", "9:45"),
                talk("2", "track1", "A", "9:30", "10:15"),
            ],
        )])),
        None,
    );

    let strict = GridLayoutEngine::new(&index, options(None)).layout_day("D");
    assert!(matches!(strict, Err(ProgrammeError::OverlappingTalks { .. })));

    let lenient = LayoutOptions {
        conflict_policy: ConflictPolicy::KeepLast,
        ..options(None)
    };
    let day = GridLayoutEngine::new(&index, lenient).layout_day("D").unwrap();
    let ids: Vec<&str> = day.talks().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
}
