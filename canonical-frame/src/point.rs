use crate::{
    common::*,
    frame::{CanonicalFrame, Frame, RawFrame},
};

/// A 2D coordinate tagged with its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point<T, F>
where
    F: Frame,
{
    pub(crate) y: T,
    pub(crate) x: T,
    _phantom: PhantomData<F>,
}

impl<T, F> Point<T, F>
where
    F: Frame,
{
    pub fn from_xy(x: T, y: T) -> Self {
        Self {
            y,
            x,
            _phantom: PhantomData,
        }
    }

    pub fn x(&self) -> T
    where
        T: Copy,
    {
        self.x
    }

    pub fn y(&self) -> T
    where
        T: Copy,
    {
        self.y
    }

    /// The origin is reserved as the "missing annotation" marker.
    pub fn is_origin(&self) -> bool
    where
        T: Num,
    {
        self.x.is_zero() && self.y.is_zero()
    }
}

pub type RawPoint = Point<f64, RawFrame>;

/// Integer pixel on the canonical grid, addressed as (row, col) = (y, x).
pub type GridPoint = Point<usize, CanonicalFrame>;

impl GridPoint {
    pub fn row(&self) -> usize {
        self.y
    }

    pub fn col(&self) -> usize {
        self.x
    }
}
