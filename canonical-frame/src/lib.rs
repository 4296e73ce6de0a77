//! Typed image coordinate frames.
//!
//! Sizes and points carry the frame they live in as a type parameter, so a
//! raw dataset coordinate can only reach the canonical grid through a
//! [Rescale].

mod common;

pub mod frame;
pub use frame::*;

pub mod size;
pub use size::*;

pub mod point;
pub use point::*;

pub mod rescale;
pub use rescale::*;
