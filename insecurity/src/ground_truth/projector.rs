use super::{PartLocations, NUM_PARTS};
use crate::common::*;

/// Distinct annotated positions on the canonical grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionGrid {
    cells: Array2<bool>,
    points: Vec<GridPoint>,
}

impl PositionGrid {
    /// Marks every point except the origin, which stands for a missing part.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a GridPoint>,
    {
        let mut cells = Array2::from_elem((CANONICAL_SIZE, CANONICAL_SIZE), false);
        let points = points
            .into_iter()
            .filter(|point| !point.is_origin())
            .filter(|point| {
                let cell = &mut cells[[point.row(), point.col()]];
                let is_new = !*cell;
                *cell = true;
                is_new
            })
            .copied()
            .collect();
        Self { cells, points }
    }

    pub fn cells(&self) -> &Array2<bool> {
        &self.cells
    }

    pub fn points(&self) -> impl Iterator<Item = &GridPoint> + '_ {
        self.points.iter()
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn contains(&self, point: &GridPoint) -> bool {
        self.cells[[point.row(), point.col()]]
    }
}

/// Part positions of one image in the canonical frame, one per part.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedParts {
    points: Vec<GridPoint>,
}

impl ProjectedParts {
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    /// Every annotated part.
    pub fn all_positions(&self) -> PositionGrid {
        PositionGrid::from_points(&self.points)
    }

    /// The parts listed in `attributes`.
    pub fn common_positions(&self, attributes: &[usize]) -> Result<PositionGrid> {
        let selected: Vec<&GridPoint> = attributes
            .iter()
            .map(|&index| {
                self.points.get(index).ok_or_else(|| {
                    format_err!(
                        "attribute index {} is out of range for {} parts",
                        index,
                        self.points.len()
                    )
                })
            })
            .try_collect()?;
        Ok(PositionGrid::from_points(selected))
    }
}

/// Rescales raw part annotations into the canonical frame.
#[derive(Debug, Clone)]
pub struct AttributeGroundTruthProjector {
    num_parts: usize,
}

impl Default for AttributeGroundTruthProjector {
    fn default() -> Self {
        Self {
            num_parts: NUM_PARTS,
        }
    }
}

impl AttributeGroundTruthProjector {
    pub fn new(num_parts: usize) -> Self {
        Self { num_parts }
    }

    pub fn num_parts(&self) -> usize {
        self.num_parts
    }

    pub fn project(&self, parts: &PartLocations, size: &RawSize<usize>) -> Result<ProjectedParts> {
        ensure!(
            parts.num_parts() == self.num_parts,
            "expect {} parts for image {}, but get {}",
            self.num_parts,
            parts.dataset_index,
            parts.num_parts()
        );

        let rescale = Rescale::to_canonical(size);
        let points = parts
            .points
            .iter()
            .map(|point| rescale.project(point))
            .collect();
        Ok(ProjectedParts { points })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(coords: &[(f64, f64)]) -> PartLocations {
        PartLocations {
            dataset_index: 0,
            points: coords
                .iter()
                .map(|&(x, y)| RawPoint::from_xy(x, y))
                .collect(),
        }
    }

    #[test]
    fn project_and_select_parts() -> Result<()> {
        let projector = AttributeGroundTruthProjector::new(4);
        let size = RawSize::from_hw(448, 224)?;
        let projected = projector.project(
            &parts(&[(10.0, 20.0), (0.0, 0.0), (100.0, 300.0), (10.0, 20.0)]),
            &size,
        )?;

        let points: Vec<_> = projected
            .points()
            .iter()
            .map(|point| (point.row(), point.col()))
            .collect();
        assert_eq!(points, vec![(10, 10), (0, 0), (150, 100), (10, 10)]);

        // missing and duplicated parts count once
        let all = projected.all_positions();
        assert_eq!(all.count(), 2);
        assert!(!all.contains(&GridPoint::from_xy(0, 0)));

        let common = projected.common_positions(&[1, 2])?;
        assert_eq!(common.count(), 1);
        assert!(common.contains(&GridPoint::from_xy(100, 150)));

        assert!(projected.common_positions(&[1])?.is_empty());
        assert!(projected.common_positions(&[4]).is_err());
        Ok(())
    }

    #[test]
    fn part_count_is_checked() -> Result<()> {
        let projector = AttributeGroundTruthProjector::default();
        let size = RawSize::from_hw(100, 100)?;
        assert!(projector.project(&parts(&[(1.0, 1.0)]), &size).is_err());
        Ok(())
    }
}
