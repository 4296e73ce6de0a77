//! Annotation files and image loading.

mod records;
pub use records::*;

mod image;
pub use image::*;
