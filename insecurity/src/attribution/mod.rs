//! Gradient-weighted activation attribution.

mod error;
pub use error::*;

mod saliency;
pub use saliency::*;

mod extractor;
pub use extractor::*;

mod difficulty;
pub use difficulty::*;

mod class_confusion;
pub use class_confusion::*;
