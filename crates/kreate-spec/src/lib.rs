//! Render OpenAPI schemas as [`SimplifiedSpec`] trees and cut subtrees out of them.
//!
//! [`SimplifiedSpec`]: kreate_core::SimplifiedSpec

mod error;
mod project;
mod simplify;

pub use error::SpecError;
pub use project::{limit_depth, project};
pub use simplify::{simplify, type_of};
