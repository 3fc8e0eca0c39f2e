// ============================================================================
// Grid layout engine
// ============================================================================
//
// Places the talks of a day into a slot × room grid:
//
// - rows are the day's slots, columns the day's rooms
// - a talk produces one cell in the row of its start slot, spanning every slot it
//   covers; the rows below carry no cell for that room
// - the day is split into two pages at the first slot at or after the break time,
//   provided the first page already shows a talk
//
// A talk running across the page break is cut at the break and continues on the
// next page with a `Continued` cell, so every page stays a rectangular table.

use log::debug;
use std::collections::HashMap;

use super::index::ScheduleIndex;
use crate::config::{ConflictPolicy, LayoutSettings};
use crate::error::ProgrammeResult;
use crate::models::{Talk, TimeOfDay};

/// Knobs that differ between document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Start a new page at the first slot at or after this time
    pub break_at: Option<TimeOfDay>,
    /// Draw the overflow room as a column
    pub include_overflow: bool,
    /// Drop rows where no talk starts or continues
    pub skip_empty_rows: bool,
    pub conflict_policy: ConflictPolicy,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            break_at: TimeOfDay::from_hm(14, 0).ok(),
            include_overflow: false,
            skip_empty_rows: false,
            conflict_policy: ConflictPolicy::Fail,
        }
    }
}

impl LayoutOptions {
    /// Full programme grid.
    pub fn programme(settings: &LayoutSettings) -> Self {
        Self {
            break_at: settings.page_break(),
            include_overflow: settings.show_overflow,
            skip_empty_rows: false,
            conflict_policy: settings.conflict_policy,
        }
    }

    /// Pocket programme: whole day in one table, every room shown, empty rows dropped.
    pub fn mini(settings: &LayoutSettings) -> Self {
        Self {
            break_at: None,
            include_overflow: true,
            skip_empty_rows: true,
            conflict_policy: settings.conflict_policy,
        }
    }

    /// One room per page, whole day on a single page.
    pub fn room(settings: &LayoutSettings) -> Self {
        Self {
            break_at: None,
            ..Self::programme(settings)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellContent<'a> {
    /// No talk starts or runs here
    Empty,
    /// A talk starting in this row
    Talk { talk: &'a Talk, row_span: usize },
    /// A talk that started on the previous page and runs into this one
    Continued { talk: &'a Talk, row_span: usize },
}

impl<'a> CellContent<'a> {
    pub fn talk(&self) -> Option<&'a Talk> {
        match self {
            CellContent::Empty => None,
            CellContent::Talk { talk, .. } | CellContent::Continued { talk, .. } => Some(talk),
        }
    }

    pub fn row_span(&self) -> usize {
        match self {
            CellContent::Empty => 1,
            CellContent::Talk { row_span, .. } | CellContent::Continued { row_span, .. } => {
                *row_span
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell<'a> {
    pub room: &'a str,
    pub content: CellContent<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow<'a> {
    pub slot: TimeOfDay,
    /// Earliest end among the talks starting at this slot, `None` if none starts
    pub slot_end: Option<TimeOfDay>,
    /// Cells in room order; rooms covered by a talk from an earlier row are absent
    pub cells: Vec<GridCell<'a>>,
}

impl<'a> GridRow<'a> {
    pub fn cell(&self, room: &str) -> Option<&GridCell<'a>> {
        self.cells.iter().find(|c| c.room == room)
    }

    /// Talks starting in this row, in room order.
    pub fn starting_talks(&self) -> impl Iterator<Item = &'a Talk> + '_ {
        self.cells.iter().filter_map(|c| match c.content {
            CellContent::Talk { talk, .. } => Some(talk),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridPage<'a> {
    pub rows: Vec<GridRow<'a>>,
    /// Tracks shown on this page, first occurrence first
    pub legend: Vec<&'a str>,
}

impl<'a> GridPage<'a> {
    pub fn has_talks(&self) -> bool {
        self.rows
            .iter()
            .any(|r| r.cells.iter().any(|c| c.content.talk().is_some()))
    }

    pub fn slots(&self) -> Vec<TimeOfDay> {
        self.rows.iter().map(|r| r.slot).collect()
    }

    fn note_track(&mut self, track: &'a str) {
        if !track.is_empty() && !self.legend.contains(&track) {
            self.legend.push(track);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayLayout<'a> {
    pub date: &'a str,
    /// Grid columns, after the time column
    pub rooms: Vec<&'a str>,
    pub pages: Vec<GridPage<'a>>,
}

impl<'a> DayLayout<'a> {
    /// Talks starting anywhere in the layout, in page, row and room order.
    pub fn talks(&self) -> impl Iterator<Item = &'a Talk> + '_ {
        self.pages
            .iter()
            .flat_map(|p| p.rows.iter())
            .flat_map(|r| r.starting_talks())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgrammeLayout<'a> {
    pub days: Vec<DayLayout<'a>>,
    /// Talks to describe in the detail section, deduplicated, first occurrence first
    pub talks_to_explain: Vec<&'a Talk>,
}

/// Builds grid layouts from a [`ScheduleIndex`].
#[derive(Debug, Clone, Copy)]
pub struct GridLayoutEngine<'a> {
    index: &'a ScheduleIndex,
    options: LayoutOptions,
}

impl<'a> GridLayoutEngine<'a> {
    pub fn new(index: &'a ScheduleIndex, options: LayoutOptions) -> Self {
        Self { index, options }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Lay out every day in feed order and collect the talks to explain.
    pub fn layout_programme(&self) -> ProgrammeResult<ProgrammeLayout<'a>> {
        let mut days = Vec::new();
        let mut talks_to_explain: Vec<&'a Talk> = Vec::new();

        for date in self.index.dates() {
            let day = self.layout_day(date)?;
            for talk in day.talks() {
                if !talks_to_explain.iter().any(|t| t.id == talk.id) {
                    talks_to_explain.push(talk);
                }
            }
            days.push(day);
        }

        Ok(ProgrammeLayout {
            days,
            talks_to_explain,
        })
    }

    /// Lay out one day with one column per room.
    pub fn layout_day(&self, date: &str) -> ProgrammeResult<DayLayout<'a>> {
        self.index.check_conflicts(date, self.options.conflict_policy)?;
        let rooms = self.index.rooms_for_date(date, self.options.include_overflow)?;
        self.layout_grid(date, rooms)
    }

    /// Lay out one day for a single room.
    pub fn layout_room(&self, date: &str, room: &str) -> ProgrammeResult<DayLayout<'a>> {
        self.index.check_conflicts(date, self.options.conflict_policy)?;
        let rooms = self
            .index
            .rooms_for_date(date, true)?
            .into_iter()
            .filter(|r| *r == room)
            .collect();
        self.layout_grid(date, rooms)
    }

    fn layout_grid(&self, date: &str, rooms: Vec<&'a str>) -> ProgrammeResult<DayLayout<'a>> {
        let index = self.index;
        let policy = self.options.conflict_policy;
        let slots = index.slots_for_date(date)?;
        let date_label = index
            .dates()
            .into_iter()
            .find(|d| *d == date)
            .unwrap_or_default();
        // Time column end times follow the grid rooms without the overflow room
        let end_rooms = index.rooms_for_date(date, false)?;
        let break_index = self
            .options
            .break_at
            .and_then(|t| slots.iter().position(|s| *s >= t));

        let mut pages = Vec::new();
        let mut page = GridPage::default();
        // Talk last seen in each room and the rows it still covers below
        let mut running: HashMap<&str, (&'a Talk, usize)> = HashMap::new();

        for (row, &slot) in slots.iter().enumerate() {
            let at_break = Some(row) == break_index && page.has_talks();
            if at_break {
                debug!("Page break on {} at {}", date, slot);
                pages.push(std::mem::take(&mut page));
            }
            // Spans starting before the break stop at the break row
            let stop = break_index.filter(|b| row < *b);

            let mut cells = Vec::with_capacity(rooms.len());
            let mut occupied = false;

            for &room in &rooms {
                if let Some(talk) = index.talk_at(date, slot, room, policy)? {
                    let row_span = self.span_from(date, slots, row, talk, room, stop)?;
                    running.insert(room, (talk, row_span - 1));
                    page.note_track(&talk.track);
                    cells.push(GridCell {
                        room,
                        content: CellContent::Talk { talk, row_span },
                    });
                    occupied = true;
                    continue;
                }

                match running.get_mut(room) {
                    Some((_, left)) if *left > 0 => {
                        *left -= 1;
                        occupied = true;
                    }
                    Some((talk, left)) if at_break && talk.end > slot => {
                        let talk: &'a Talk = *talk;
                        let row_span = self.span_from(date, slots, row, talk, room, None)?;
                        *left = row_span - 1;
                        page.note_track(&talk.track);
                        cells.push(GridCell {
                            room,
                            content: CellContent::Continued { talk, row_span },
                        });
                        occupied = true;
                    }
                    _ => cells.push(GridCell {
                        room,
                        content: CellContent::Empty,
                    }),
                }
            }

            if self.options.skip_empty_rows && !occupied {
                continue;
            }
            page.rows.push(GridRow {
                slot,
                slot_end: index.end_of_slot(date, slot, &end_rooms, policy)?,
                cells,
            });
        }

        if !page.rows.is_empty() || pages.is_empty() {
            pages.push(page);
        }

        Ok(DayLayout {
            date: date_label,
            rooms,
            pages,
        })
    }

    /// Rows covered by `talk` from `row`: every following slot before the talk's end,
    /// stopping at `stop` and at the next talk starting in the same room.
    fn span_from(
        &self,
        date: &str,
        slots: &[TimeOfDay],
        row: usize,
        talk: &Talk,
        room: &str,
        stop: Option<usize>,
    ) -> ProgrammeResult<usize> {
        let mut span = 1;
        for (i, &slot) in slots.iter().enumerate().skip(row + 1) {
            if slot >= talk.end || Some(i) == stop {
                break;
            }
            if self
                .index
                .talk_at(date, slot, room, self.options.conflict_policy)?
                .is_some()
            {
                break;
            }
            span += 1;
        }
        Ok(span)
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod layout_tests;
