//! Pipeline entry points.
//!
//! - `Resolver`: run the strategy chain over a share link

pub mod resolve;

pub use resolve::{Resolution, Resolver};
