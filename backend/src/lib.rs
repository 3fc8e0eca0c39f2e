//! # progpdf
//!
//! Conference programme renderer.
//!
//! This crate fetches a conference schedule (talks, speakers, rooms, time slots) from a
//! JSON feed and turns it into printable PDF documents: the full programme with talk
//! abstracts, per-room schedules and pocket-sized mini programmes.
//!
//! ## Features
//!
//! - **Data Loading**: Parse the programme feed and per-talk details from JSON
//! - **Indexing**: Derive dates, slots, rooms and `(date, slot, room)` lookups per day
//! - **Grid Layout**: Place talks into a time × room table with row spans and page breaks
//! - **Composition**: Turn grid layouts into pages, tables, legends and detail sections
//! - **PDF Output**: Write the composed document with `pdf-writer`
//! - **HTTP API**: Serve the generated documents over axum
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: Schedule model, talk details and time-of-day handling
//! - [`feed`]: Schedule sources (HTTP feed, local files) behind the [`feed::ScheduleFeed`] trait
//! - [`services`]: Schedule index, grid layout engine, page composer and render context
//! - [`render`]: Document model, colours, markdown conversion and the PDF writer
//! - [`config`]: TOML configuration with environment overrides
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Data flow
//!
//! ```text
//! feed snapshot -> Schedule -> ScheduleIndex -> GridLayoutEngine -> PageComposer -> PDF
//! ```

pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod render;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

pub use config::ProgrammeConfig;
pub use error::{ProgrammeError, ProgrammeResult};
