//! Utility types shared by every stage.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`Aabb`] and math re-exports from glam

mod error;
mod math;

pub use error::*;
pub use math::*;
