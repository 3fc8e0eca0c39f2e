//! Service layer: indexing, layout and page composition.
//!
//! Services sit between the feed models and the document renderer:
//!
//! - [`index`] answers slot and room lookups over a schedule snapshot
//! - [`layout`] turns a day into grid pages
//! - [`composer`] turns grid pages and talk details into documents
//! - [`context`] bundles everything a render pass needs

pub mod composer;
pub mod context;
pub mod index;
pub mod layout;

pub use composer::{compose_document, render_document, DocumentKind, PageComposer};
pub use context::RenderContext;
pub use index::ScheduleIndex;
pub use layout::{
    CellContent, DayLayout, GridCell, GridLayoutEngine, GridPage, GridRow, LayoutOptions,
    ProgrammeLayout,
};
