//! Document model and PDF output.
//!
//! - [`document`]: pages, blocks, tables and the [`DocumentSink`] trait the composer writes to
//! - [`pdf`]: lays out a [`Document`] and writes it with `pdf-writer`
//! - [`markdown`]: converts talk abstracts into paragraphs
//! - [`color`]: track colours

pub mod color;
pub mod document;
pub mod markdown;
pub mod pdf;

pub use color::Rgb;
pub use document::{
    Align, Block, Document, DocumentSink, FontStyle, Legend, LegendEntry, Page, PageSize,
    Paragraph, Table, TableCell, TableRow, TextStyle,
};
pub use markdown::markdown_to_paragraphs;
pub use pdf::{render_pdf, render_pdf_document, RenderedPdf};
