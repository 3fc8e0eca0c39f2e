//! Schedule feeds.
//!
//! The feed is the only place that touches the network. Everything downstream works
//! on the immutable [`Schedule`](crate::models::Schedule) snapshot it returns.
//!
//! - [`ScheduleFeed`]: the trait every source implements
//! - [`HttpFeed`]: the conference JSON API
//! - [`LocalFeed`]: files or in-memory data, for offline rendering and tests
//! - [`factory::create_feed`]: picks one from the configuration

pub mod factory;
pub mod http;
pub mod local;
pub mod source;

pub use factory::{create_feed, FeedType};
pub use http::HttpFeed;
pub use local::LocalFeed;
pub use source::ScheduleFeed;
