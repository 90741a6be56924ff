//! Pricing module: line item capture and the cost engine

pub mod draft;
pub mod engine;

pub use draft::*;
pub use engine::*;
