//! Pieces shared by every crate in the broker workspace.

pub mod types;
pub mod utils;
