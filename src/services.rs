//! Call-and-transform wrappers over the core request executor.
//!
//! Each wrapper issues one upstream call (or a paginated series) and projects
//! the response into a small typed summary. No wrapper adds credential or
//! retry behavior of its own; the 401 recovery lives entirely in the core.

pub mod fee;
pub mod reserve;
pub mod vehicle;

pub use fee::*;
pub use reserve::*;
pub use vehicle::*;
