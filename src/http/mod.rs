//! HTTP protocol layer module
//!
//! Response values, fixed error pages, and MIME lookup, decoupled from the
//! routing and dispatch logic that produces them.

pub mod mime;
pub mod response;

pub use response::{forbidden, internal_error, not_found, Body, Response};
