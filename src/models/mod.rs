//! Data models for the list query and filter engine.
//!
//! Field names serialize in camelCase to match the list views' request contract.

mod filter;
mod request;
mod result;
mod row;
mod state;

pub use filter::*;
pub use request::*;
pub use result::*;
pub use row::*;
pub use state::*;
