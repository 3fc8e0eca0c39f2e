//! Page composer.
//!
//! Walks grid layouts and talk details and describes the resulting pages to a
//! [`DocumentSink`]. Four documents are produced from the same layouts:
//!
//! - **Full programme**: cover, one landscape grid page per half day with its
//!   legend, then the talk detail section
//! - **Room schedules**: one portrait page per date and room
//! - **Mini table**: the day grid on A6, titles only
//! - **Mini text**: the day as a two-column list of slots on A6

use log::{debug, info};
use std::fmt;
use std::str::FromStr;

use super::context::RenderContext;
use super::layout::{CellContent, DayLayout, GridPage, GridRow, LayoutOptions};
use crate::error::ProgrammeResult;
use crate::models::Talk;
use crate::render::{
    markdown_to_paragraphs, render_pdf, Align, Block, Document, DocumentSink, Legend, LegendEntry,
    PageSize, Paragraph, Rgb, Table, TableCell, TableRow, TextStyle,
};

const PAGE_MARGIN: f32 = 36.0;
const MINI_MARGIN: f32 = 8.0;

/// Documents the composer knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    FullProgramme,
    RoomSchedules,
    MiniTable,
    MiniText,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::FullProgramme,
        DocumentKind::RoomSchedules,
        DocumentKind::MiniTable,
        DocumentKind::MiniText,
    ];

    /// File name used by the CLI.
    pub fn file_name(&self) -> &'static str {
        match self {
            DocumentKind::FullProgramme => "programme.pdf",
            DocumentKind::RoomSchedules => "salles.pdf",
            DocumentKind::MiniTable => "mini-programme.pdf",
            DocumentKind::MiniText => "mini-programme-texte.pdf",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::FullProgramme => "programme",
            DocumentKind::RoomSchedules => "salles",
            DocumentKind::MiniTable => "mini",
            DocumentKind::MiniText => "mini-text",
        };
        f.write_str(name)
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().trim_end_matches(".pdf") {
            "programme" | "full" => Ok(Self::FullProgramme),
            "salles" | "rooms" => Ok(Self::RoomSchedules),
            "mini" | "mini-table" | "mini-programme" => Ok(Self::MiniTable),
            "mini-text" | "mini-texte" | "mini-programme-texte" => Ok(Self::MiniText),
            _ => Err(format!("Unknown document kind: {}", s)),
        }
    }
}

/// Font sizes of a grid, full size or pocket size.
#[derive(Debug, Clone, Copy)]
struct GridScale {
    title: f32,
    header: f32,
    time: f32,
    talk: f32,
    track: f32,
    speaker: f32,
    format: f32,
    /// Pocket grids only print the title
    full_cells: bool,
}

const FULL_GRID: GridScale = GridScale {
    title: 14.0,
    header: 10.0,
    time: 10.0,
    talk: 11.0,
    track: 8.0,
    speaker: 9.0,
    format: 7.0,
    full_cells: true,
};

const MINI_GRID: GridScale = GridScale {
    title: 4.0,
    header: 4.0,
    time: 3.0,
    talk: 3.0,
    track: 3.0,
    speaker: 3.0,
    format: 3.0,
    full_cells: false,
};

/// Composes documents from a [`RenderContext`].
pub struct PageComposer<'a> {
    ctx: &'a RenderContext,
}

impl<'a> PageComposer<'a> {
    pub fn new(ctx: &'a RenderContext) -> Self {
        Self { ctx }
    }

    /// Describe the document of `kind` to `sink`.
    pub fn compose<S: DocumentSink>(&self, kind: DocumentKind, sink: &mut S) -> ProgrammeResult<()> {
        debug!("Composing {}", kind);
        match kind {
            DocumentKind::FullProgramme => self.compose_full_programme(sink),
            DocumentKind::RoomSchedules => self.compose_room_schedules(sink),
            DocumentKind::MiniTable => self.compose_mini_table(sink),
            DocumentKind::MiniText => self.compose_mini_text(sink),
        }
    }

    fn footer(&self) -> Option<String> {
        self.ctx.config.edition.footer.clone()
    }

    // ========================================================================
    // Full programme
    // ========================================================================

    fn compose_full_programme<S: DocumentSink>(&self, sink: &mut S) -> ProgrammeResult<()> {
        let settings = &self.ctx.config.layout;
        let layout = self
            .ctx
            .layout_engine(LayoutOptions::programme(settings))
            .layout_programme()?;

        self.compose_cover(sink)?;

        for day in &layout.days {
            for page in &day.pages {
                sink.begin_page(PageSize::A4.landscape(), PAGE_MARGIN, self.footer());
                sink.add_paragraph(
                    format!("Programme du {}", day.date),
                    TextStyle::sized(FULL_GRID.title)
                        .bold()
                        .align(Align::Center)
                        .space_after(10.0),
                )?;
                sink.add_table(self.grid_table(day, page, FULL_GRID))?;
                if settings.show_legend {
                    sink.add_spacer(10.0)?;
                    sink.add_legend(self.legend(&page.legend, 9.0))?;
                }
            }
        }

        self.compose_talk_details(sink, &layout.talks_to_explain)
    }

    fn compose_cover<S: DocumentSink>(&self, sink: &mut S) -> ProgrammeResult<()> {
        let edition = &self.ctx.config.edition;
        sink.begin_page(PageSize::A4, PAGE_MARGIN, None);
        sink.add_spacer(120.0)?;
        sink.add_paragraph(
            edition.title.clone(),
            TextStyle::sized(36.0)
                .bold()
                .align(Align::Center)
                .space_after(30.0),
        )?;
        sink.add_paragraph(
            edition.dates.clone(),
            TextStyle::sized(20.0).align(Align::Center).space_after(80.0),
        )?;
        sink.add_paragraph(
            edition.subtitle.clone(),
            TextStyle::sized(56.0).align(Align::Center),
        )
    }

    fn compose_talk_details<S: DocumentSink>(&self, sink: &mut S, talks: &[&Talk]) -> ProgrammeResult<()> {
        sink.begin_page(PageSize::A4, PAGE_MARGIN, self.footer());
        sink.add_paragraph(
            "Liste des talks",
            TextStyle::sized(25.0).align(Align::Center).space_after(25.0),
        )?;

        let heading = TextStyle::sized(13.0).bold().color(Rgb::GRAY).space_after(6.0);
        let body = TextStyle::sized(10.0).align(Align::Justify).space_after(4.0);
        let mut described = 0usize;

        for talk in talks {
            let Some(detail) = self.ctx.detail(&talk.id) else {
                debug!("No detail for talk {}, skipped", talk.id);
                continue;
            };

            let title = if detail.title.trim().is_empty() {
                talk.title.as_str()
            } else {
                detail.title.as_str()
            };
            let mut blocks = vec![
                Block::Paragraph(Paragraph::new(
                    title,
                    TextStyle::sized(17.0)
                        .bold()
                        .color(Rgb::DARK_GRAY)
                        .space_after(4.0),
                )),
            ];
            if !talk.format.trim().is_empty() {
                blocks.push(Block::Paragraph(Paragraph::new(
                    format_tag(&talk.format),
                    TextStyle::sized(8.0).italic().color(Rgb::DARK_GRAY).space_after(6.0),
                )));
            }
            blocks.push(Block::Paragraph(Paragraph::new(
                format!(
                    "Salle {} de {} à {}",
                    talk.room.as_deref().unwrap_or_default(),
                    talk.start,
                    talk.end
                ),
                heading,
            )));
            blocks.extend(
                markdown_to_paragraphs(&detail.description, body)
                    .into_iter()
                    .map(Block::Paragraph),
            );
            blocks.push(Block::Spacer(6.0));
            blocks.push(Block::Paragraph(Paragraph::new("Présenté par :", heading)));
            blocks.extend(detail.speaker_names().map(|name| {
                Block::Paragraph(Paragraph::new(name, TextStyle::sized(11.0).space_after(2.0)))
            }));
            blocks.push(Block::Spacer(20.0));

            sink.add_block(Block::Group(blocks))?;
            described += 1;
        }

        info!("Described {} of {} talks", described, talks.len());
        Ok(())
    }

    // ========================================================================
    // Room schedules
    // ========================================================================

    fn compose_room_schedules<S: DocumentSink>(&self, sink: &mut S) -> ProgrammeResult<()> {
        let settings = &self.ctx.config.layout;
        let engine = self.ctx.layout_engine(LayoutOptions::room(settings));

        for date in self.ctx.index.dates() {
            for room in self.ctx.index.rooms_for_date(date, settings.show_overflow)? {
                let day = engine.layout_room(date, room)?;
                for page in &day.pages {
                    sink.begin_page(PageSize::A4, PAGE_MARGIN, self.footer());
                    sink.add_paragraph(
                        format!("Programme du {} - {}", day.date, room),
                        TextStyle::sized(14.0)
                            .bold()
                            .align(Align::Center)
                            .space_after(20.0),
                    )?;
                    let mut table = self.grid_table(&day, page, FULL_GRID);
                    table.widths = vec![0.2, 1.0];
                    if let Some(header) = table.header.as_mut() {
                        if let Some(cell) = header.cells.get_mut(1) {
                            cell.lines.clear();
                        }
                    }
                    sink.add_table(table)?;
                    if settings.show_legend {
                        sink.add_spacer(10.0)?;
                        sink.add_legend(self.legend(&page.legend, 9.0))?;
                    }
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Pocket programmes
    // ========================================================================

    fn compose_mini_table<S: DocumentSink>(&self, sink: &mut S) -> ProgrammeResult<()> {
        let engine = self
            .ctx
            .layout_engine(LayoutOptions::mini(&self.ctx.config.layout));

        for date in self.ctx.index.dates() {
            let day = engine.layout_day(date)?;
            for page in &day.pages {
                sink.begin_page(PageSize::A6, MINI_MARGIN, None);
                sink.add_paragraph(
                    format!("Programme du {}", day.date),
                    TextStyle::sized(MINI_GRID.title)
                        .bold()
                        .align(Align::Center)
                        .space_after(3.0),
                )?;
                sink.add_table(self.grid_table(&day, page, MINI_GRID))?;
            }
        }
        Ok(())
    }

    fn compose_mini_text<S: DocumentSink>(&self, sink: &mut S) -> ProgrammeResult<()> {
        let ctx = self.ctx;
        let settings = &ctx.config.layout;
        let time_style = TextStyle::sized(6.0).bold().align(Align::Center);
        let room_style = TextStyle::sized(5.0).italic().color(Rgb::DARK_GRAY);
        let talk_style = TextStyle::sized(6.0);

        for date in ctx.index.dates() {
            ctx.index.check_conflicts(date, settings.conflict_policy)?;
            let rooms = ctx.index.rooms_for_date(date, true)?;
            let mut morning = Vec::new();
            let mut afternoon = Vec::new();

            for &slot in ctx.index.slots_for_date(date)? {
                let mut table = Table::new(vec![1.0, 2.2, 10.0]);
                table.borders = false;
                for &room in &rooms {
                    let Some(talk) = ctx.index.talk_at(date, slot, room, settings.conflict_policy)?
                    else {
                        continue;
                    };
                    let time = if table.rows.is_empty() {
                        TableCell::new(0).line(slot.to_string(), time_style)
                    } else {
                        TableCell::new(0)
                    };
                    table.rows.push(TableRow::new(vec![
                        time,
                        TableCell::new(1).line(settings.short_room_name(room), room_style),
                        TableCell::new(2).line(talk.title.clone(), talk_style),
                    ]));
                }
                if table.rows.is_empty() {
                    continue;
                }
                let afternoon_slot = settings.page_break().is_some_and(|b| slot >= b);
                if afternoon_slot {
                    afternoon.push(Block::Table(table));
                } else {
                    morning.push(Block::Table(table));
                }
            }

            sink.begin_page(PageSize::A6, MINI_MARGIN, None);
            sink.add_paragraph(
                format!("Programme du {}", date),
                TextStyle::sized(9.0)
                    .bold()
                    .align(Align::Center)
                    .space_after(10.0),
            )?;
            sink.add_block(Block::Columns(vec![morning, afternoon]))?;
        }
        Ok(())
    }

    // ========================================================================
    // Shared pieces
    // ========================================================================

    fn grid_table(&self, day: &DayLayout<'_>, page: &GridPage<'_>, scale: GridScale) -> Table {
        let mut widths = vec![1.0; day.rooms.len() + 1];
        widths[0] = 0.5;
        let mut table = Table::new(widths);
        table.keep_together = true;

        let header_style = TextStyle::sized(scale.header)
            .color(Rgb::WHITE)
            .align(Align::Center);
        let mut header = vec![TableCell::new(0)
            .line("Heure", header_style)
            .background(Some(Rgb::GRAY))];
        header.extend(day.rooms.iter().enumerate().map(|(i, room)| {
            TableCell::new(i + 1)
                .line(*room, header_style)
                .background(Some(Rgb::GRAY))
        }));
        table.header = Some(TableRow::new(header));

        table.rows = page
            .rows
            .iter()
            .map(|row| self.grid_row(day, row, scale))
            .collect();
        table
    }

    fn grid_row(&self, day: &DayLayout<'_>, row: &GridRow<'_>, scale: GridScale) -> TableRow {
        let time_style = TextStyle::sized(scale.time).align(Align::Center);
        let mut time = TableCell::new(0).line(row.slot.to_string(), time_style);
        if let Some(end) = row.slot_end {
            time = time.line(end.to_string(), time_style);
        }

        let mut cells = vec![time];
        for cell in &row.cells {
            let Some(column) = day.rooms.iter().position(|r| *r == cell.room) else {
                continue;
            };
            let column = column + 1;
            cells.push(match cell.content {
                CellContent::Empty => TableCell::new(column),
                CellContent::Talk { talk, row_span } => {
                    self.talk_cell(column, talk, row_span, false, scale)
                }
                CellContent::Continued { talk, row_span } => {
                    self.talk_cell(column, talk, row_span, true, scale)
                }
            });
        }
        TableRow::new(cells)
    }

    fn talk_cell(&self, column: usize, talk: &Talk, row_span: usize, continued: bool, scale: GridScale) -> TableCell {
        let config = &self.ctx.config;
        let mut cell = TableCell::new(column)
            .row_span(row_span)
            .background(config.track_fill(&talk.track));

        let title = if continued {
            format!("{} (suite)", talk.title)
        } else {
            talk.title.clone()
        };

        if !scale.full_cells {
            return cell.line(title, TextStyle::sized(scale.talk).align(Align::Center));
        }

        if !talk.format.trim().is_empty() {
            cell = cell.line(
                format_tag(&talk.format),
                TextStyle::sized(scale.format)
                    .italic()
                    .color(Rgb::DARK_GRAY)
                    .space_after(2.0),
            );
        }
        cell = cell
            .line(title, TextStyle::sized(scale.talk).align(Align::Center))
            .line(
                config.track_label(&talk.track),
                TextStyle::sized(scale.track)
                    .italic()
                    .color(Rgb::GRAY)
                    .align(Align::Center),
            );
        if let Some(detail) = self.ctx.detail(&talk.id) {
            for name in detail.speaker_names() {
                cell = cell.line(name, TextStyle::sized(scale.speaker).align(Align::Center));
            }
        }
        cell
    }

    fn legend(&self, tracks: &[&str], size: f32) -> Legend {
        let config = &self.ctx.config;
        let mut entries: Vec<LegendEntry> = Vec::with_capacity(tracks.len());
        for track in tracks {
            let label = config.track_label(track);
            // Tracks sharing a label and colour are listed once
            if entries.iter().any(|e| e.label == label) {
                continue;
            }
            entries.push(LegendEntry {
                label: label.to_string(),
                color: config.track_fill(track),
            });
        }
        Legend {
            title: "Légende : ".to_string(),
            entries,
            style: TextStyle::sized(size),
        }
    }
}

/// Text tag standing in for the format icon.
fn format_tag(format: &str) -> String {
    format!("[{}]", format.trim())
}

/// Compose the document of `kind` in memory.
pub fn compose_document(ctx: &RenderContext, kind: DocumentKind) -> ProgrammeResult<Document> {
    let mut document = Document::new(format!("{} - {}", ctx.config.edition.title, kind));
    PageComposer::new(ctx).compose(kind, &mut document)?;
    Ok(document)
}

/// Compose and render the document of `kind` to PDF bytes.
pub fn render_document(ctx: &RenderContext, kind: DocumentKind) -> ProgrammeResult<Vec<u8>> {
    let document = compose_document(ctx, kind)?;
    render_pdf(&document)
}

#[cfg(test)]
#[path = "composer_tests.rs"]
mod composer_tests;
