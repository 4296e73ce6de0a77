use crate::{
    common::*,
    point::{GridPoint, RawPoint},
    size::{CanonicalSize, RawSize},
};

/// Proportional mapping from an original image to the canonical grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Rescale {
    sy: f64,
    sx: f64,
    max_row: usize,
    max_col: usize,
}

impl Rescale {
    pub fn from_sizes(src: &RawSize<usize>, tgt: &CanonicalSize<usize>) -> Self {
        let sy = tgt.h() as f64 / src.h() as f64;
        let sx = tgt.w() as f64 / src.w() as f64;

        Self {
            sy,
            sx,
            max_row: tgt.h() - 1,
            max_col: tgt.w() - 1,
        }
    }

    pub fn to_canonical(src: &RawSize<usize>) -> Self {
        Self::from_sizes(src, &CanonicalSize::canonical())
    }

    pub fn sy(&self) -> f64 {
        self.sy
    }

    pub fn sx(&self) -> f64 {
        self.sx
    }

    /// Scales, rounds to the nearest pixel and clamps into the grid.
    ///
    /// A coordinate at the far image border would round to the grid size
    /// itself, so it is clamped onto the last row or column. Non-finite
    /// coordinates collapse onto the origin, which readers treat as missing.
    pub fn project(&self, point: &RawPoint) -> GridPoint {
        let scale = |value: f64, factor: f64, max: usize| -> usize {
            let scaled = (value * factor).round();
            if !scaled.is_finite() || scaled <= 0.0 {
                0
            } else {
                (scaled as usize).min(max)
            }
        };

        let x = scale(point.x(), self.sx, self.max_col);
        let y = scale(point.y(), self.sy, self.max_row);
        GridPoint::from_xy(x, y)
    }
}
