pub mod detail;
pub mod macros;
pub mod schedule;
pub mod time;


pub use detail::*;
pub use schedule::*;
pub use time::*;
