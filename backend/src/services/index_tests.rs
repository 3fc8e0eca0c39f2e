#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::config::ConflictPolicy;
    use crate::error::ProgrammeError;
    use crate::models::{Day, Schedule, Talk, TalkId, TimeOfDay};
    use crate::services::index::ScheduleIndex;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn talk(id: &str, room: Option<&str>, start: &str, end: &str) -> Talk {
        Talk {
            id: TalkId::new(id),
            title: format!("Talk {}", id),
            format: "conference".to_string(),
            track: "track1".to_string(),
            room: room.map(str::to_string),
            start: t(start),
            end: t(end),
        }
    }

    fn index_of(days: Vec<(&str, Vec<Talk>)>, overflow: Option<&str>) -> ScheduleIndex {
        let schedule = Schedule::new(
            days.into_iter()
                .map(|(date, talks)| Day {
                    date: date.to_string(),
                    talks,
                })
                .collect(),
        );
        ScheduleIndex::build(Arc::new(schedule), overflow.map(str::to_string))
    }

    #[test]
    fn test_dates_keep_feed_order() {
        let index = index_of(
            vec![
                ("12/06/2015", vec![talk("1", Some("A"), "9:00", "10:00")]),
                ("10/06/2015", vec![talk("2", Some("A"), "9:00", "10:00")]),
            ],
            None,
        );
        assert_eq!(index.dates(), vec!["12/06/2015", "10/06/2015"]);
        assert_eq!(index.talks_by_date()["10/06/2015"].len(), 1);
    }

    #[test]
    fn test_slots_sorted_numerically() {
        let index = index_of(
            vec![(
                "D",
                vec![
                    talk("1", Some("A"), "10:00", "11:00"),
                    talk("2", Some("B"), "9:00", "10:00"),
                    talk("3", Some("A"), "9:00", "10:00"),
                ],
            )],
            None,
        );
        let slots = index.slots_for_date("D").unwrap();
        assert_eq!(slots, &[t("09:00"), t("10:00")]);
    }

    #[test]
    fn test_rooms_sorted_and_overflow_filtered() {
        let index = index_of(
            vec![(
                "D",
                vec![
                    talk("1", Some("Hall"), "9:00", "10:00"),
                    talk("2", Some("Amphi B"), "9:00", "10:00"),
                    talk("3", Some("Amphi A"), "9:00", "10:00"),
                    talk("4", None, "12:00", "13:00"),
                ],
            )],
            Some("Hall"),
        );
        assert_eq!(
            index.rooms_for_date("D", true).unwrap(),
            vec!["Amphi A", "Amphi B", "Hall"]
        );
        assert_eq!(
            index.rooms_for_date("D", false).unwrap(),
            vec!["Amphi A", "Amphi B"]
        );
        // Roomless talks still contribute their slot
        assert!(index.slots_for_date("D").unwrap().contains(&t("12:00")));
    }

    #[test]
    fn test_rooms_are_per_date() {
        let index = index_of(
            vec![
                ("D1", vec![talk("1", Some("A"), "9:00", "10:00")]),
                ("D2", vec![talk("2", Some("B"), "9:00", "10:00")]),
            ],
            None,
        );
        assert_eq!(index.rooms_for_date("D1", true).unwrap(), vec!["A"]);
        assert_eq!(index.rooms_for_date("D2", true).unwrap(), vec!["B"]);
    }

    #[test]
    fn test_unknown_date() {
        let index = index_of(vec![("D", vec![])], None);
        assert!(matches!(
            index.slots_for_date("X"),
            Err(ProgrammeError::UnknownDate(_))
        ));
    }

    #[test]
    fn test_talk_at_finds_talk() {
        let index = index_of(
            vec![("D", vec![talk("1", Some("A"), "9:00", "10:00")])],
            None,
        );
        let found = index.talk_at("D", t("09:00"), "A", ConflictPolicy::Fail).unwrap();
        assert_eq!(found.unwrap().id, TalkId::new("1"));
        assert!(index
            .talk_at("D", t("09:00"), "B", ConflictPolicy::Fail)
            .unwrap()
            .is_none());
        assert!(index
            .talk_at("D", t("09:30"), "A", ConflictPolicy::Fail)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_talk_at_ambiguous_fails() {
        let index = index_of(
            vec![(
                "D",
                vec![
                    talk("1", Some("A"), "10:00", "11:00"),
                    talk("2", Some("A"), "10:00", "10:30"),
                ],
            )],
            None,
        );
        let err = index
            .talk_at("D", t("10:00"), "A", ConflictPolicy::Fail)
            .unwrap_err();
        assert!(matches!(err, ProgrammeError::AmbiguousSlot { .. }));
        assert_eq!(err.to_string(), "Two talks for D 10:00 A: 1 and 2");
    }

    #[test]
    fn test_talk_at_keep_last() {
        let index = index_of(
            vec![(
                "D",
                vec![
                    talk("1", Some("A"), "10:00", "11:00"),
                    talk("2", Some("A"), "10:00", "10:30"),
                ],
            )],
            None,
        );
        let kept = index
            .talk_at("D", t("10:00"), "A", ConflictPolicy::KeepLast)
            .unwrap()
            .unwrap();
        assert_eq!(kept.id, TalkId::new("2"));
    }

    #[test]
    fn test_end_of_slot_is_min_end() {
        let index = index_of(
            vec![(
                "D",
                vec![
                    talk("1", Some("A"), "9:00", "10:00"),
                    talk("2", Some("B"), "9:00", "9:45"),
                    talk("3", Some("Hall"), "9:00", "9:15"),
                ],
            )],
            Some("Hall"),
        );
        let grid_rooms = index.rooms_for_date("D", false).unwrap();
        assert_eq!(
            index.end_of_slot("D", t("09:00"), &grid_rooms, ConflictPolicy::Fail).unwrap(),
            Some(t("09:45"))
        );
        let all_rooms = index.rooms_for_date("D", true).unwrap();
        assert_eq!(
            index.end_of_slot("D", t("09:00"), &all_rooms, ConflictPolicy::Fail).unwrap(),
            Some(t("09:15"))
        );
        assert_eq!(index.end_of_slot("D", t("11:00"), &all_rooms, ConflictPolicy::Fail).unwrap(), None);
    }

    #[test]
    fn test_row_span_counts_slots_in_range() {
        let lab = talk("1", Some("A"), "9:00", "12:00");
        let index = index_of(
            vec![(
                "D",
                vec![
                    lab.clone(),
                    talk("2", Some("B"), "9:00", "10:00"),
                    talk("3", Some("B"), "10:00", "11:00"),
                    talk("4", Some("B"), "11:00", "12:00"),
                    talk("5", Some("B"), "12:00", "13:00"),
                ],
            )],
            None,
        );
        assert_eq!(index.row_span("D", &lab).unwrap(), 3);
    }

    #[test]
    fn test_row_span_unaligned_end() {
        // 9:50 is not a slot boundary; 9:00 and 9:30 are both covered
        let talk_a = talk("1", Some("A"), "9:00", "9:50");
        let index = index_of(
            vec![(
                "D",
                vec![
                    talk_a.clone(),
                    talk("2", Some("B"), "9:30", "10:00"),
                    talk("3", Some("B"), "10:00", "11:00"),
                ],
            )],
            None,
        );
        assert_eq!(index.row_span("D", &talk_a).unwrap(), 2);
    }

    #[test]
    fn test_find_overlaps() {
        let index = index_of(
            vec![(
                "D",
                vec![
                    talk("1", Some("A"), "9:00", "9:45"),
                    talk("2", Some("A"), "9:30", "10:15"),
                    talk("3", Some("A"), "10:15", "11:00"),
                    talk("4", Some("B"), "9:00", "11:00"),
                ],
            )],
            None,
        );
        let overlaps = index.find_overlaps("D").unwrap();
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].0.id, TalkId::new("1"));
        assert_eq!(overlaps[0].1.id, TalkId::new("2"));
    }

    #[test]
    fn test_check_conflicts_includes_overflow_room() {
        let index = index_of(
            vec![(
                "D",
                vec![
                    talk("1", Some("Hall"), "12:00", "13:00"),
                    talk("2", Some("Hall"), "12:00", "13:00"),
                ],
            )],
            Some("Hall"),
        );
        assert!(index.check_conflicts("D", ConflictPolicy::Fail).is_err());
        assert!(index.check_conflicts("D", ConflictPolicy::KeepLast).is_ok());
    }

    #[test]
    fn test_check_conflicts_overlap_policy() {
        let index = index_of(
            vec![(
                "D",
                vec![
                    talk("1", Some("A"), "9:00", "9:45"),
                    talk("2", Some("A"), "9:30", "10:15"),
                ],
            )],
            None,
        );
        assert!(matches!(
            index.check_conflicts("D", ConflictPolicy::Fail),
            Err(ProgrammeError::OverlappingTalks { .. })
        ));
        assert!(index.check_conflicts("D", ConflictPolicy::KeepLast).is_ok());
    }
}
