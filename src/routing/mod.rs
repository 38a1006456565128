//! Route matching module
//!
//! Pattern parsing and the ordered, first-match route table.

pub mod pattern;
pub mod router;

pub use pattern::{Params, PathPattern, Segment};
pub use router::{HandlerFn, RouteMatch, Router};
