use crate::common::*;

/// Number of annotated parts per image.
pub const NUM_PARTS: usize = 15;

/// Raw part coordinates of one image, `(0, 0)` marking a missing part.
#[derive(Debug, Clone, PartialEq)]
pub struct PartLocations {
    pub dataset_index: usize,
    pub points: Vec<RawPoint>,
}

impl PartLocations {
    /// Parses `x0 y0 x1 y1 ... index`, the dataset index coming last.
    pub fn parse_line(line: &str, num_parts: usize) -> Result<Self> {
        let values: Vec<f64> = line
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<f64>()
                    .with_context(|| format!("invalid number '{}'", token))
            })
            .try_collect()?;
        ensure!(
            values.len() == num_parts * 2 + 1,
            "expect {} values, but get {}",
            num_parts * 2 + 1,
            values.len()
        );

        let (coords, index) = values.split_at(num_parts * 2);
        let index = index[0];
        ensure!(
            index >= 0.0 && index.fract() == 0.0,
            "invalid dataset index {}",
            index
        );

        let points = coords
            .chunks_exact(2)
            .map(|xy| RawPoint::from_xy(xy[0], xy[1]))
            .collect();

        Ok(Self {
            dataset_index: index as usize,
            points,
        })
    }

    /// An image without any annotated part.
    pub fn unannotated(dataset_index: usize, num_parts: usize) -> Self {
        Self {
            dataset_index,
            points: vec![RawPoint::from_xy(0.0, 0.0); num_parts],
        }
    }

    pub fn num_parts(&self) -> usize {
        self.points.len()
    }
}
