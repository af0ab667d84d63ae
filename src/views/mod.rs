//! View state for the upload, history and detail pages.
//!
//! Each view owns its inputs and the outcome of its single in-flight
//! request; handlers drive them and render the result.

mod detail;
mod generation;
mod history;
mod pagination;
mod upload;

pub use detail::*;
pub use generation::*;
pub use history::*;
pub use pagination::*;
pub use upload::*;
