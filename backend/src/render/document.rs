//! In-memory document model.
//!
//! The composer describes pages as a flow of blocks (paragraphs, tables, legends)
//! and leaves positioning to the PDF writer. A logical [`Page`] may flow over
//! several physical pages when its content is taller than the sheet.

use serde::Serialize;

use super::color::Rgb;
use crate::error::{ProgrammeError, ProgrammeResult};

// ============================================================================
// Geometry
// ============================================================================

/// Sheet size in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width: 595.0,
        height: 842.0,
    };
    pub const A6: PageSize = PageSize {
        width: 298.0,
        height: 420.0,
    };

    pub fn landscape(self) -> Self {
        if self.width >= self.height {
            self
        } else {
            Self {
                width: self.height,
                height: self.width,
            }
        }
    }
}

// ============================================================================
// Text
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FontStyle {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStyle {
    pub size: f32,
    pub font: FontStyle,
    pub color: Rgb,
    pub align: Align,
    /// Vertical space left after the paragraph
    pub space_after: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 10.0,
            font: FontStyle::Regular,
            color: Rgb::BLACK,
            align: Align::Left,
            space_after: 0.0,
        }
    }
}

impl TextStyle {
    pub fn sized(size: f32) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.font = match self.font {
            FontStyle::Italic | FontStyle::BoldItalic => FontStyle::BoldItalic,
            _ => FontStyle::Bold,
        };
        self
    }

    pub fn italic(mut self) -> Self {
        self.font = match self.font {
            FontStyle::Bold | FontStyle::BoldItalic => FontStyle::BoldItalic,
            _ => FontStyle::Italic,
        };
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn space_after(mut self, space: f32) -> Self {
        self.space_after = space;
        self
    }

    /// Baseline-to-baseline distance.
    pub fn leading(&self) -> f32 {
        self.size * 1.2
    }
}

/// A run of text in a single style, wrapped to the available width.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paragraph {
    pub text: String,
    pub style: TextStyle,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

// ============================================================================
// Tables and legends
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCell {
    /// Column the cell starts in; columns covered by spans from earlier rows have no cell
    pub column: usize,
    pub lines: Vec<Paragraph>,
    pub row_span: usize,
    pub background: Option<Rgb>,
}

impl TableCell {
    pub fn new(column: usize) -> Self {
        Self {
            column,
            lines: Vec::new(),
            row_span: 1,
            background: None,
        }
    }

    pub fn line(mut self, text: impl Into<String>, style: TextStyle) -> Self {
        self.lines.push(Paragraph::new(text, style));
        self
    }

    pub fn row_span(mut self, span: usize) -> Self {
        self.row_span = span.max(1);
        self
    }

    pub fn background(mut self, color: Option<Rgb>) -> Self {
        self.background = color;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    /// Relative column widths; scaled to the available width
    pub widths: Vec<f32>,
    /// Repeated at the top of every physical page the table spans
    pub header: Option<TableRow>,
    pub rows: Vec<TableRow>,
    /// Move the whole table to a fresh page when it does not fit the remaining space
    pub keep_together: bool,
    pub borders: bool,
    pub min_row_height: f32,
}

impl Table {
    pub fn new(widths: Vec<f32>) -> Self {
        Self {
            widths,
            header: None,
            rows: Vec::new(),
            keep_together: false,
            borders: true,
            min_row_height: 0.0,
        }
    }

    pub fn columns(&self) -> usize {
        self.widths.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Option<Rgb>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    pub entries: Vec<LegendEntry>,
    pub style: TextStyle,
}

// ============================================================================
// Blocks and pages
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    Legend(Legend),
    Spacer(f32),
    /// Side-by-side columns of equal width
    Columns(Vec<Vec<Block>>),
    /// Blocks kept on the same physical page when they fit on one
    Group(Vec<Block>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub size: PageSize,
    pub margin: f32,
    pub footer: Option<String>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    pub title: String,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pages: Vec::new(),
        }
    }

    /// Every table in the document, in page order.
    pub fn tables(&self) -> Vec<&Table> {
        fn collect<'a>(blocks: &'a [Block], out: &mut Vec<&'a Table>) {
            for block in blocks {
                match block {
                    Block::Table(table) => out.push(table),
                    Block::Columns(columns) => {
                        for column in columns {
                            collect(column, out);
                        }
                    }
                    Block::Group(inner) => collect(inner, out),
                    _ => {}
                }
            }
        }

        let mut out = Vec::new();
        for page in &self.pages {
            collect(&page.blocks, &mut out);
        }
        out
    }

    /// Every paragraph text in the document, tables included, in page order.
    pub fn texts(&self) -> Vec<&str> {
        fn collect<'a>(blocks: &'a [Block], out: &mut Vec<&'a str>) {
            for block in blocks {
                match block {
                    Block::Paragraph(p) => out.push(&p.text),
                    Block::Table(table) => {
                        for row in table.header.iter().chain(table.rows.iter()) {
                            for cell in &row.cells {
                                out.extend(cell.lines.iter().map(|l| l.text.as_str()));
                            }
                        }
                    }
                    Block::Legend(legend) => {
                        out.push(&legend.title);
                        out.extend(legend.entries.iter().map(|e| e.label.as_str()));
                    }
                    Block::Columns(columns) => {
                        for column in columns {
                            collect(column, out);
                        }
                    }
                    Block::Group(inner) => collect(inner, out),
                    Block::Spacer(_) => {}
                }
            }
        }

        let mut out = Vec::new();
        for page in &self.pages {
            collect(&page.blocks, &mut out);
        }
        out
    }
}

// ============================================================================
// Sink
// ============================================================================

/// Receiver of composed pages.
///
/// The composer only ever talks to this trait, so alternative outputs (a recording
/// sink in tests, another document backend) can be plugged in.
pub trait DocumentSink {
    fn begin_page(&mut self, size: PageSize, margin: f32, footer: Option<String>);

    fn add_block(&mut self, block: Block) -> ProgrammeResult<()>;

    fn add_paragraph(&mut self, text: impl Into<String>, style: TextStyle) -> ProgrammeResult<()>
    where
        Self: Sized,
    {
        self.add_block(Block::Paragraph(Paragraph::new(text, style)))
    }

    fn add_table(&mut self, table: Table) -> ProgrammeResult<()> {
        self.add_block(Block::Table(table))
    }

    fn add_legend(&mut self, legend: Legend) -> ProgrammeResult<()> {
        self.add_block(Block::Legend(legend))
    }

    fn add_spacer(&mut self, height: f32) -> ProgrammeResult<()> {
        self.add_block(Block::Spacer(height))
    }
}

impl DocumentSink for Document {
    fn begin_page(&mut self, size: PageSize, margin: f32, footer: Option<String>) {
        self.pages.push(Page {
            size,
            margin,
            footer,
            blocks: Vec::new(),
        });
    }

    fn add_block(&mut self, block: Block) -> ProgrammeResult<()> {
        match self.pages.last_mut() {
            Some(page) => {
                page.blocks.push(block);
                Ok(())
            }
            None => Err(ProgrammeError::Render(
                "Content added before the first page".to_string(),
            )),
        }
    }
}
