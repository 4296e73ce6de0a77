/// Side length of the square canonical grid that masks and projected
/// annotations share.
pub const CANONICAL_SIZE: usize = 224;

/// Number of cells in the canonical grid.
pub const CANONICAL_AREA: usize = CANONICAL_SIZE * CANONICAL_SIZE;

pub trait Frame {
    const NAME: &'static str;
}

impl Frame for RawFrame {
    const NAME: &'static str = "raw";
}

impl Frame for CanonicalFrame {
    const NAME: &'static str = "canonical";
}

/// The pixel space of the original, unresized image file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawFrame;

/// The fixed 224x224 pixel space shared by masks and annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalFrame;
