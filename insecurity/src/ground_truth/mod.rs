//! Part annotations projected onto the canonical grid.

mod parts;
pub use parts::*;

mod table;
pub use table::*;

mod projector;
pub use projector::*;
