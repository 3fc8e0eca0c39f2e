//! PDF output for composed documents.
//!
//! Documents are written with `pdf-writer` using the base-14 Helvetica family, so no
//! font file is embedded. Text is encoded as WinAnsi; characters outside that code
//! page are replaced with `?`.
//!
//! Layout happens here: paragraphs are word-wrapped with Helvetica metrics, tables get
//! their row heights from their content, and any block that does not fit the remaining
//! space of a sheet continues on a new sheet with the same size and footer. Tables
//! repeat their header row on every sheet they touch; a row-spanning cell that crosses
//! a sheet boundary is drawn on both sheets, its text only on the first.

use chrono::{Datelike, Timelike, Utc};
use log::{debug, info};
use pdf_writer::{Content, Date, Name, Pdf, Rect, Ref, Str, TextStr};

use super::color::Rgb;
use super::document::{
    Align, Block, Document, FontStyle, Legend, Page, PageSize, Paragraph, Table, TableRow,
    TextStyle,
};
use crate::error::{ProgrammeError, ProgrammeResult};

const FONTS: [(&[u8], &[u8]); 4] = [
    (b"F1", b"Helvetica"),
    (b"F2", b"Helvetica-Bold"),
    (b"F3", b"Helvetica-Oblique"),
    (b"F4", b"Helvetica-BoldOblique"),
];

const CELL_PADDING: f32 = 3.0;
const BORDER_WIDTH: f32 = 0.5;
const BORDER_COLOR: Rgb = Rgb::GRAY;
const COLUMN_GAP: f32 = 10.0;
const FOOTER_SIZE: f32 = 8.0;
const FOOTER_RESERVE: f32 = 12.0;
const EPSILON: f32 = 0.01;

/// Bytes of a rendered document plus the number of physical pages written.
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Render a document to PDF bytes.
pub fn render_pdf(document: &Document) -> ProgrammeResult<Vec<u8>> {
    render_pdf_document(document).map(|rendered| rendered.bytes)
}

/// Render a document and report how many physical pages it took.
pub fn render_pdf_document(document: &Document) -> ProgrammeResult<RenderedPdf> {
    if document.pages.is_empty() {
        return Err(ProgrammeError::Render(format!(
            "Document '{}' has no pages",
            document.title
        )));
    }

    let mut writer = SheetWriter::default();
    for page in &document.pages {
        let mut cursor = writer.begin_page(page);
        let region = Region {
            x: page.margin,
            width: page.size.width - 2.0 * page.margin,
        };
        for block in &page.blocks {
            cursor = writer.place_block(block, region, cursor)?;
        }
    }

    let page_count = writer.sheets.len();
    let bytes = writer.finish(&document.title);
    info!(
        "Rendered '{}': {} logical pages, {} PDF pages, {} bytes",
        document.title,
        document.pages.len(),
        page_count,
        bytes.len()
    );
    Ok(RenderedPdf { bytes, page_count })
}

// ============================================================================
// Fonts and text
// ============================================================================

fn font_resource(font: FontStyle) -> &'static [u8] {
    match font {
        FontStyle::Regular => FONTS[0].0,
        FontStyle::Bold => FONTS[1].0,
        FontStyle::Italic => FONTS[2].0,
        FontStyle::BoldItalic => FONTS[3].0,
    }
}

/// Helvetica advance widths for printable ASCII, in thousandths of an em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

fn base_letter(c: char) -> char {
    match c {
        'à' | 'â' | 'ä' | 'á' | 'ã' | 'å' => 'a',
        'À' | 'Â' | 'Ä' | 'Á' | 'Ã' | 'Å' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'î' | 'ï' | 'í' | 'ì' => 'i',
        'Î' | 'Ï' | 'Í' | 'Ì' => 'I',
        'ô' | 'ö' | 'ó' | 'ò' | 'õ' => 'o',
        'Ô' | 'Ö' | 'Ó' | 'Ò' | 'Õ' => 'O',
        'û' | 'ü' | 'ú' | 'ù' => 'u',
        'Û' | 'Ü' | 'Ú' | 'Ù' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        '’' | '‘' => '\'',
        '“' | '”' => '"',
        '–' => '-',
        _ => c,
    }
}

fn char_width(c: char, font: FontStyle) -> f32 {
    let c = base_letter(c);
    let width = match c as u32 {
        code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize] as f32,
        _ => match c {
            '…' | '—' | 'œ' | 'Œ' | '€' => 1000.0,
            '•' => 350.0,
            _ => 556.0,
        },
    };
    match font {
        FontStyle::Bold | FontStyle::BoldItalic => width * 1.06,
        _ => width,
    }
}

/// Width of `text` in points.
pub fn text_width(text: &str, style: &TextStyle) -> f32 {
    text.chars()
        .map(|c| char_width(c, style.font))
        .sum::<f32>()
        * style.size
        / 1000.0
}

/// Encode text in WinAnsi (Windows-1252).
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => b' ',
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            'Œ' => 0x8C,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            'œ' => 0x9C,
            'Ÿ' => 0x9F,
            _ => b'?',
        })
        .collect()
}

/// Greedy word wrap. Words wider than `width` are broken between characters.
pub fn wrap_text(text: &str, style: &TextStyle, width: f32) -> Vec<String> {
    let space = text_width(" ", style);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0.0f32;

    for word in text.split_whitespace() {
        let word_width = text_width(word, style);

        if !line.is_empty() && line_width + space + word_width <= width + EPSILON {
            line.push(' ');
            line.push_str(word);
            line_width += space + word_width;
            continue;
        }
        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }

        if word_width <= width + EPSILON {
            line.push_str(word);
            line_width = word_width;
            continue;
        }

        // Hard break inside an oversized word
        line_width = 0.0;
        for c in word.chars() {
            let w = char_width(c, style.font) * style.size / 1000.0;
            if !line.is_empty() && line_width + w > width + EPSILON {
                lines.push(std::mem::take(&mut line));
                line_width = 0.0;
            }
            line.push(c);
            line_width += w;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn paragraph_height(paragraph: &Paragraph, width: f32) -> f32 {
    let lines = wrap_text(&paragraph.text, &paragraph.style, width).len();
    lines as f32 * paragraph.style.leading() + paragraph.style.space_after
}

// ============================================================================
// Sheets
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct Region {
    x: f32,
    width: f32,
}

/// Position in the output: sheet index and the y coordinate of the next free line.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    sheet: usize,
    y: f32,
}

impl Cursor {
    /// The cursor that is further down the document.
    fn lowest(self, other: Cursor) -> Cursor {
        if other.sheet > self.sheet || (other.sheet == self.sheet && other.y < self.y) {
            other
        } else {
            self
        }
    }
}

struct Sheet {
    size: PageSize,
    margin: f32,
    footer: Option<String>,
    content: Content,
}

#[derive(Default)]
struct SheetWriter {
    sheets: Vec<Sheet>,
}

impl SheetWriter {
    fn begin_page(&mut self, page: &Page) -> Cursor {
        debug!(
            "New page {}x{} ({} blocks)",
            page.size.width,
            page.size.height,
            page.blocks.len()
        );
        self.sheets.push(Sheet {
            size: page.size,
            margin: page.margin,
            footer: page.footer.clone(),
            content: Content::new(),
        });
        let sheet = self.sheets.len() - 1;
        Cursor {
            sheet,
            y: self.top(sheet),
        }
    }

    fn top(&self, sheet: usize) -> f32 {
        let s = &self.sheets[sheet];
        s.size.height - s.margin
    }

    fn bottom(&self, sheet: usize) -> f32 {
        let s = &self.sheets[sheet];
        let reserve = if s.footer.is_some() { FOOTER_RESERVE } else { 0.0 };
        s.margin + reserve
    }

    fn fits(&self, cursor: Cursor, height: f32) -> bool {
        cursor.y - height >= self.bottom(cursor.sheet) - EPSILON
    }

    fn at_top(&self, cursor: Cursor) -> bool {
        (cursor.y - self.top(cursor.sheet)).abs() < EPSILON
    }

    /// Move to the next sheet, reusing one opened by a sibling column.
    fn next_sheet(&mut self, cursor: Cursor) -> Cursor {
        let next = cursor.sheet + 1;
        if next >= self.sheets.len() {
            let current = &self.sheets[cursor.sheet];
            let sheet = Sheet {
                size: current.size,
                margin: current.margin,
                footer: current.footer.clone(),
                content: Content::new(),
            };
            self.sheets.push(sheet);
        }
        Cursor {
            sheet: next,
            y: self.top(next),
        }
    }

    // ------------------------------------------------------------------------
    // Measuring
    // ------------------------------------------------------------------------

    fn measure(&self, block: &Block, width: f32) -> f32 {
        match block {
            Block::Paragraph(p) => paragraph_height(p, width),
            Block::Table(table) => {
                let widths = column_widths(table, width);
                let header = table
                    .header
                    .as_ref()
                    .map(|h| header_height(h, &widths, table.min_row_height))
                    .unwrap_or(0.0);
                header + row_heights(table, &widths).iter().sum::<f32>()
            }
            Block::Legend(legend) => layout_legend(legend, width).1,
            Block::Spacer(height) => *height,
            Block::Columns(columns) => {
                let column_width = columns_width(columns.len(), width);
                columns
                    .iter()
                    .map(|c| c.iter().map(|b| self.measure(b, column_width)).sum::<f32>())
                    .fold(0.0, f32::max)
            }
            Block::Group(blocks) => blocks.iter().map(|b| self.measure(b, width)).sum(),
        }
    }

    // ------------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------------

    fn place_block(&mut self, block: &Block, region: Region, cursor: Cursor) -> ProgrammeResult<Cursor> {
        match block {
            Block::Paragraph(p) => Ok(self.place_paragraph(p, region, cursor)),
            Block::Table(table) => self.place_table(table, region, cursor),
            Block::Legend(legend) => Ok(self.place_legend(legend, region, cursor)),
            Block::Spacer(height) => Ok(Cursor {
                sheet: cursor.sheet,
                y: cursor.y - height,
            }),
            Block::Columns(columns) => {
                if columns.is_empty() {
                    return Ok(cursor);
                }
                let width = columns_width(columns.len(), region.width);
                let mut end = cursor;
                for (i, column) in columns.iter().enumerate() {
                    let sub = Region {
                        x: region.x + i as f32 * (width + COLUMN_GAP),
                        width,
                    };
                    let mut c = cursor;
                    for block in column {
                        c = self.place_block(block, sub, c)?;
                    }
                    end = end.lowest(c);
                }
                Ok(end)
            }
            Block::Group(blocks) => {
                let mut c = cursor;
                let height = self.measure(block, region.width);
                if !self.fits(c, height) && !self.at_top(c) {
                    c = self.next_sheet(c);
                }
                for block in blocks {
                    c = self.place_block(block, region, c)?;
                }
                Ok(c)
            }
        }
    }

    fn place_paragraph(&mut self, paragraph: &Paragraph, region: Region, mut cursor: Cursor) -> Cursor {
        let style = &paragraph.style;
        let lines = wrap_text(&paragraph.text, style, region.width);
        let count = lines.len();
        for (i, line) in lines.iter().enumerate() {
            if !self.fits(cursor, style.leading()) && !self.at_top(cursor) {
                cursor = self.next_sheet(cursor);
            }
            let baseline = cursor.y - style.size;
            let content = &mut self.sheets[cursor.sheet].content;
            draw_text(content, line, style, region.x, region.width, baseline, i + 1 == count);
            cursor.y -= style.leading();
        }
        cursor.y -= style.space_after;
        cursor
    }

    fn place_legend(&mut self, legend: &Legend, region: Region, mut cursor: Cursor) -> Cursor {
        let (boxes, height) = layout_legend(legend, region.width);
        if !self.fits(cursor, height) && !self.at_top(cursor) {
            cursor = self.next_sheet(cursor);
        }
        let content = &mut self.sheets[cursor.sheet].content;
        let box_height = legend.style.leading() + 2.0 * CELL_PADDING;
        for item in boxes {
            let top = cursor.y - item.y;
            let x = region.x + item.x;
            if let Some(color) = item.color {
                fill_rect(content, x, top - box_height, item.width, box_height, color);
            }
            let style = if item.is_title {
                legend.style.bold()
            } else {
                legend.style
            };
            draw_text(
                content,
                &item.label,
                &style,
                x + CELL_PADDING,
                item.width - 2.0 * CELL_PADDING,
                top - CELL_PADDING - style.size,
                true,
            );
        }
        cursor.y -= height;
        cursor
    }

    fn place_table(&mut self, table: &Table, region: Region, mut cursor: Cursor) -> ProgrammeResult<Cursor> {
        let columns = table.columns();
        if columns == 0 {
            return Err(ProgrammeError::Render("Table without columns".to_string()));
        }
        for row in table.header.iter().chain(table.rows.iter()) {
            if let Some(cell) = row.cells.iter().find(|c| c.column >= columns) {
                return Err(ProgrammeError::Render(format!(
                    "Cell in column {} of a {}-column table",
                    cell.column, columns
                )));
            }
        }

        let widths = column_widths(table, region.width);
        let offsets: Vec<f32> = widths
            .iter()
            .scan(region.x, |x, w| {
                let start = *x;
                *x += w;
                Some(start)
            })
            .collect();
        let header_h = table
            .header
            .as_ref()
            .map(|h| header_height(h, &widths, table.min_row_height))
            .unwrap_or(0.0);
        let heights = row_heights(table, &widths);

        if table.keep_together {
            let total = header_h + heights.iter().sum::<f32>();
            if !self.fits(cursor, total) && !self.at_top(cursor) {
                cursor = self.next_sheet(cursor);
            }
        }

        // Assign every row a sheet and a top coordinate, repeating the header
        let mut placements: Vec<Cursor> = Vec::with_capacity(heights.len());
        let mut rows_on_sheet: Option<usize> = None;
        for &height in &heights {
            let needs_sheet = match rows_on_sheet {
                None => true,
                Some(n) => n > 0 && !self.fits(cursor, height),
            };
            if needs_sheet {
                let advance = match rows_on_sheet {
                    None => !self.fits(cursor, header_h + height) && !self.at_top(cursor),
                    Some(_) => true,
                };
                if advance {
                    cursor = self.next_sheet(cursor);
                }
                if let Some(header) = &table.header {
                    self.draw_header(header, &offsets, &widths, header_h, table.borders, cursor);
                    cursor.y -= header_h;
                }
                rows_on_sheet = Some(0);
            }
            placements.push(cursor);
            cursor.y -= height;
            rows_on_sheet = rows_on_sheet.map(|n| n + 1);
        }
        if heights.is_empty() {
            if let Some(header) = &table.header {
                if !self.fits(cursor, header_h) && !self.at_top(cursor) {
                    cursor = self.next_sheet(cursor);
                }
                self.draw_header(header, &offsets, &widths, header_h, table.borders, cursor);
                cursor.y -= header_h;
            }
        }

        for (index, row) in table.rows.iter().enumerate() {
            for cell in &row.cells {
                let span = cell.row_span.clamp(1, heights.len() - index);
                let x = offsets[cell.column];
                let w = widths[cell.column];

                // Split the spanned rows into per-sheet segments
                let mut first_segment = true;
                let mut r = index;
                while r < index + span {
                    let sheet = placements[r].sheet;
                    let top = placements[r].y;
                    let mut height = 0.0;
                    while r < index + span && placements[r].sheet == sheet {
                        height += heights[r];
                        r += 1;
                    }
                    let content = &mut self.sheets[sheet].content;
                    if let Some(color) = cell.background {
                        fill_rect(content, x, top - height, w, height, color);
                    }
                    if table.borders {
                        stroke_rect(content, x, top - height, w, height);
                    }
                    if first_segment {
                        draw_cell_text(content, &cell.lines, x, top, w, height);
                        first_segment = false;
                    }
                }
            }
        }

        Ok(cursor)
    }

    fn draw_header(
        &mut self,
        header: &TableRow,
        offsets: &[f32],
        widths: &[f32],
        height: f32,
        borders: bool,
        cursor: Cursor,
    ) {
        let content = &mut self.sheets[cursor.sheet].content;
        for cell in &header.cells {
            let x = offsets[cell.column];
            let w = widths[cell.column];
            if let Some(color) = cell.background {
                fill_rect(content, x, cursor.y - height, w, height, color);
            }
            if borders {
                stroke_rect(content, x, cursor.y - height, w, height);
            }
            draw_cell_text(content, &cell.lines, x, cursor.y, w, height);
        }
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    fn finish(self, title: &str) -> Vec<u8> {
        let mut pdf = Pdf::new();
        let mut alloc = Ref::new(1);
        let catalog_id = alloc.bump();
        let pages_id = alloc.bump();
        let info_id = alloc.bump();
        let font_ids: Vec<Ref> = FONTS.iter().map(|_| alloc.bump()).collect();
        let page_ids: Vec<Ref> = self.sheets.iter().map(|_| alloc.bump()).collect();
        let content_ids: Vec<Ref> = self.sheets.iter().map(|_| alloc.bump()).collect();

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(page_ids.len() as i32);

        for ((_, base_font), id) in FONTS.iter().zip(&font_ids) {
            pdf.type1_font(*id)
                .base_font(Name(*base_font))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }

        let now = Utc::now();
        pdf.document_info(info_id)
            .title(TextStr(title))
            .producer(TextStr("progpdf"))
            .creation_date(
                Date::new(now.year() as u16)
                    .month(now.month() as u8)
                    .day(now.day() as u8)
                    .hour(now.hour() as u8)
                    .minute(now.minute() as u8)
                    .second(now.second() as u8)
                    .utc_offset_hour(0),
            );

        for (i, mut sheet) in self.sheets.into_iter().enumerate() {
            if let Some(footer) = &sheet.footer {
                let style = TextStyle::sized(FOOTER_SIZE)
                    .color(Rgb::DARK_GRAY)
                    .align(Align::Center);
                let baseline = (sheet.margin * 0.5).max(FOOTER_SIZE);
                draw_text(
                    &mut sheet.content,
                    footer,
                    &style,
                    0.0,
                    sheet.size.width,
                    baseline,
                    true,
                );
            }

            {
                let mut page = pdf.page(page_ids[i]);
                page.media_box(Rect::new(0.0, 0.0, sheet.size.width, sheet.size.height))
                    .parent(pages_id)
                    .contents(content_ids[i]);
                let mut resources = page.resources();
                let mut fonts = resources.fonts();
                for ((name, _), id) in FONTS.iter().zip(&font_ids) {
                    fonts.pair(Name(*name), *id);
                }
            }
            pdf.stream(content_ids[i], &sheet.content.finish());
        }

        pdf.finish()
    }
}

// ============================================================================
// Table and legend geometry
// ============================================================================

fn column_widths(table: &Table, available: f32) -> Vec<f32> {
    let total: f32 = table.widths.iter().map(|w| w.max(0.0)).sum();
    if total <= 0.0 {
        let even = available / table.widths.len().max(1) as f32;
        return vec![even; table.widths.len()];
    }
    table
        .widths
        .iter()
        .map(|w| w.max(0.0) / total * available)
        .collect()
}

fn columns_width(count: usize, available: f32) -> f32 {
    let count = count.max(1) as f32;
    (available - COLUMN_GAP * (count - 1.0)) / count
}

fn cell_height(lines: &[Paragraph], width: f32) -> f32 {
    let inner = (width - 2.0 * CELL_PADDING).max(1.0);
    2.0 * CELL_PADDING + lines.iter().map(|l| paragraph_height(l, inner)).sum::<f32>()
}

fn header_height(header: &TableRow, widths: &[f32], min: f32) -> f32 {
    header
        .cells
        .iter()
        .filter_map(|c| widths.get(c.column).map(|w| cell_height(&c.lines, *w)))
        .fold(min, f32::max)
}

/// Row heights: single-row cells set the base height, spanning cells that need more
/// room than their rows provide stretch the last row they cover.
fn row_heights(table: &Table, widths: &[f32]) -> Vec<f32> {
    let count = table.rows.len();
    let mut heights = vec![table.min_row_height; count];

    for (index, row) in table.rows.iter().enumerate() {
        for cell in row.cells.iter().filter(|c| c.row_span <= 1) {
            if let Some(w) = widths.get(cell.column) {
                heights[index] = heights[index].max(cell_height(&cell.lines, *w));
            }
        }
    }

    for (index, row) in table.rows.iter().enumerate() {
        for cell in row.cells.iter().filter(|c| c.row_span > 1) {
            let Some(w) = widths.get(cell.column) else {
                continue;
            };
            let span = cell.row_span.min(count - index);
            let need = cell_height(&cell.lines, *w);
            let have: f32 = heights[index..index + span].iter().sum();
            if need > have {
                heights[index + span - 1] += need - have;
            }
        }
    }
    heights
}

struct LegendBox {
    label: String,
    color: Option<Rgb>,
    is_title: bool,
    x: f32,
    /// Offset below the legend top
    y: f32,
    width: f32,
}

fn layout_legend(legend: &Legend, width: f32) -> (Vec<LegendBox>, f32) {
    let line_height = legend.style.leading() + 2.0 * CELL_PADDING;
    let mut boxes = Vec::with_capacity(legend.entries.len() + 1);
    let mut x = 0.0f32;
    let mut y = 0.0f32;

    let items = std::iter::once((legend.title.as_str(), None, true)).chain(
        legend
            .entries
            .iter()
            .map(|e| (e.label.as_str(), e.color, false)),
    );
    for (label, color, is_title) in items {
        let style = if is_title {
            legend.style.bold()
        } else {
            legend.style
        };
        let w = (text_width(label, &style) + 2.0 * CELL_PADDING).min(width);
        if x > 0.0 && x + w > width + EPSILON {
            x = 0.0;
            y += line_height;
        }
        boxes.push(LegendBox {
            label: label.to_string(),
            color,
            is_title,
            x,
            y,
            width: w,
        });
        x += w + CELL_PADDING;
    }
    (boxes, y + line_height + legend.style.space_after)
}

// ============================================================================
// Drawing primitives
// ============================================================================

fn draw_text(
    content: &mut Content,
    text: &str,
    style: &TextStyle,
    x: f32,
    width: f32,
    baseline: f32,
    last_line: bool,
) {
    if text.is_empty() {
        return;
    }
    let measured = text_width(text, style);
    let start = match style.align {
        Align::Left | Align::Justify => x,
        Align::Center => x + (width - measured) / 2.0,
        Align::Right => x + width - measured,
    };
    let spaces = text.matches(' ').count();
    let word_spacing = if style.align == Align::Justify && !last_line && spaces > 0 {
        ((width - measured) / spaces as f32).max(0.0)
    } else {
        0.0
    };

    let (r, g, b) = style.color.to_unit();
    content.save_state();
    content.set_fill_rgb(r, g, b);
    content.begin_text();
    content.set_font(Name(font_resource(style.font)), style.size);
    if word_spacing > 0.0 {
        content.set_word_spacing(word_spacing);
    }
    content.next_line(start, baseline);
    content.show(Str(&encode_win_ansi(text)));
    content.end_text();
    content.restore_state();
}

fn draw_cell_text(content: &mut Content, lines: &[Paragraph], x: f32, top: f32, width: f32, height: f32) {
    if lines.is_empty() {
        return;
    }
    let inner = (width - 2.0 * CELL_PADDING).max(1.0);
    content.save_state();
    content.rect(x, top - height, width, height);
    content.clip_nonzero();
    content.end_path();

    let mut y = top - CELL_PADDING;
    for paragraph in lines {
        let wrapped = wrap_text(&paragraph.text, &paragraph.style, inner);
        let count = wrapped.len();
        for (i, line) in wrapped.iter().enumerate() {
            draw_text(
                content,
                line,
                &paragraph.style,
                x + CELL_PADDING,
                inner,
                y - paragraph.style.size,
                i + 1 == count,
            );
            y -= paragraph.style.leading();
        }
        y -= paragraph.style.space_after;
    }
    content.restore_state();
}

fn fill_rect(content: &mut Content, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
    let (r, g, b) = color.to_unit();
    content.save_state();
    content.set_fill_rgb(r, g, b);
    content.rect(x, y, width, height);
    content.fill_nonzero();
    content.restore_state();
}

fn stroke_rect(content: &mut Content, x: f32, y: f32, width: f32, height: f32) {
    let (r, g, b) = BORDER_COLOR.to_unit();
    content.save_state();
    content.set_line_width(BORDER_WIDTH);
    content.set_stroke_rgb(r, g, b);
    content.rect(x, y, width, height);
    content.stroke();
    content.restore_state();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::document::{DocumentSink, LegendEntry, TableCell};

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn table_of(rows: usize, height: f32) -> Table {
        let mut table = Table::new(vec![0.5, 1.0]);
        table.min_row_height = height;
        table.header = Some(TableRow::new(vec![
            TableCell::new(0).line("Heure", TextStyle::sized(8.0)),
            TableCell::new(1).line("Amphi A", TextStyle::sized(8.0)),
        ]));
        for i in 0..rows {
            table.rows.push(TableRow::new(vec![
                TableCell::new(0).line(format!("{:02}:00", i), TextStyle::sized(8.0)),
                TableCell::new(1),
            ]));
        }
        table
    }

    #[test]
    fn test_render_minimal_document() {
        let mut doc = Document::new("Programme");
        doc.begin_page(PageSize::A4, 36.0, Some("BreizhCamp 2015".to_string()));
        doc.add_paragraph("Programme du 10/06/2015", TextStyle::sized(14.0).bold())
            .unwrap();
        let rendered = render_pdf_document(&doc).unwrap();
        assert!(rendered.bytes.starts_with(b"%PDF-"));
        assert!(contains(&rendered.bytes, b"Helvetica-Bold"));
        assert!(contains(&rendered.bytes, b"WinAnsiEncoding"));
        assert_eq!(rendered.page_count, 1);
    }

    #[test]
    fn test_empty_document_is_an_error() {
        let doc = Document::new("empty");
        assert!(matches!(render_pdf(&doc), Err(ProgrammeError::Render(_))));
    }

    #[test]
    fn test_long_table_flows_over_sheets() {
        let mut doc = Document::new("t");
        doc.begin_page(PageSize::A6, 20.0, None);
        // 380pt of usable height, 30pt rows plus header
        doc.add_table(table_of(30, 30.0)).unwrap();
        let rendered = render_pdf_document(&doc).unwrap();
        assert!(rendered.page_count >= 3);
    }

    #[test]
    fn test_cell_outside_table_is_rejected() {
        let mut doc = Document::new("t");
        doc.begin_page(PageSize::A6, 20.0, None);
        let mut table = Table::new(vec![1.0]);
        table.rows.push(TableRow::new(vec![TableCell::new(3)]));
        doc.add_table(table).unwrap();
        assert!(render_pdf(&doc).is_err());
    }

    #[test]
    fn test_spanning_cell_stretches_last_row() {
        let mut table = Table::new(vec![1.0]);
        let tall = TableCell::new(0)
            .row_span(2)
            .line("a b c d e f g h i j k l m n o p", TextStyle::sized(10.0));
        table.rows.push(TableRow::new(vec![tall]));
        table.rows.push(TableRow::new(vec![]));
        let heights = row_heights(&table, &[30.0]);
        let need = cell_height(&table.rows[0].cells[0].lines, 30.0);
        assert_eq!(heights[0], 0.0);
        assert!((heights[1] - need).abs() < 1e-3);
    }

    #[test]
    fn test_span_past_table_end_is_clamped() {
        let mut doc = Document::new("t");
        doc.begin_page(PageSize::A6, 20.0, None);
        let mut table = Table::new(vec![1.0]);
        table
            .rows
            .push(TableRow::new(vec![TableCell::new(0).row_span(5).line("x", TextStyle::default())]));
        doc.add_table(table).unwrap();
        assert!(render_pdf(&doc).is_ok());
    }

    #[test]
    fn test_wrap_text() {
        let style = TextStyle::sized(10.0);
        let lines = wrap_text("Programme du jour", &style, 60.0);
        assert!(lines.len() >= 2);
        assert_eq!(lines.join(" "), "Programme du jour");
        assert!(wrap_text("", &style, 60.0).is_empty());
        // A single oversized word is broken between characters
        let broken = wrap_text("Supercalifragilistic", &style, 30.0);
        assert!(broken.len() > 1);
        assert_eq!(broken.concat(), "Supercalifragilistic");
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("Sécurité"), b"S\xE9curit\xE9".to_vec());
        assert_eq!(encode_win_ansi("l’IoT…"), b"l\x92IoT\x85".to_vec());
        assert_eq!(encode_win_ansi("日"), b"?".to_vec());
    }

    #[test]
    fn test_columns_and_legend_render() {
        let mut doc = Document::new("mini");
        doc.begin_page(PageSize::A6, 10.0, None);
        doc.add_block(Block::Columns(vec![
            vec![Block::Paragraph(Paragraph::new("09:00", TextStyle::sized(6.0)))],
            vec![Block::Paragraph(Paragraph::new("14:00", TextStyle::sized(6.0)))],
        ]))
        .unwrap();
        doc.add_legend(Legend {
            title: "Légende : ".to_string(),
            entries: vec![LegendEntry {
                label: "Keynote".to_string(),
                color: Some(Rgb::new(0x93, 0xD2, 0xC5)),
            }],
            style: TextStyle::sized(6.0),
        })
        .unwrap();
        let rendered = render_pdf_document(&doc).unwrap();
        assert_eq!(rendered.page_count, 1);
    }
}
