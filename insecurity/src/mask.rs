use crate::{budget::Budget, common::*, field::InsecurityField, ground_truth::PositionGrid};

/// Binary mask on the canonical grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    cells: Array2<bool>,
}

impl Mask {
    pub fn new(cells: Array2<bool>) -> Result<Self> {
        ensure!(
            cells.dim() == (CANONICAL_SIZE, CANONICAL_SIZE),
            "a mask must be {}x{}, but get {:?}",
            CANONICAL_SIZE,
            CANONICAL_SIZE,
            cells.dim()
        );
        Ok(Self { cells })
    }

    pub fn cells(&self) -> &Array2<bool> {
        &self.cells
    }

    pub fn is_on(&self, point: &GridPoint) -> bool {
        self.cells[[point.row(), point.col()]]
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&on| on).count()
    }

    /// Number of grid positions that are on in both.
    pub fn count_overlap(&self, grid: &PositionGrid) -> usize {
        grid.points().filter(|point| self.is_on(point)).count()
    }
}

/// Top-budget masks of an insecurity field for a fixed list of budgets.
#[derive(Debug, Clone)]
pub struct MaskThresholder {
    budgets: Vec<Budget>,
}

impl MaskThresholder {
    pub fn new(budgets: Vec<Budget>) -> Result<Self> {
        ensure!(!budgets.is_empty(), "at least one budget is required");
        Ok(Self { budgets })
    }

    pub fn budgets(&self) -> &[Budget] {
        &self.budgets
    }

    /// The value at zero-based position `k = floor(p * N)` of the
    /// descending order, or `None` when `k = 0`.
    ///
    /// `sorted` is in descending order.
    pub fn threshold(sorted: &[f32], budget: Budget) -> Option<f32> {
        match budget.num_retained(sorted.len()) {
            0 => None,
            index => sorted.get(index).copied(),
        }
    }

    pub fn mask(&self, field: &InsecurityField, budget: Budget) -> Result<Mask> {
        let sorted = sorted_descending(field);
        Self::mask_sorted(field, &sorted, budget)
    }

    /// One mask per configured budget, in budget order.
    pub fn masks(&self, field: &InsecurityField) -> Result<Vec<Mask>> {
        let sorted = sorted_descending(field);
        self.budgets
            .iter()
            .map(|&budget| Self::mask_sorted(field, &sorted, budget))
            .try_collect()
    }

    fn mask_sorted(field: &InsecurityField, sorted: &[f32], budget: Budget) -> Result<Mask> {
        let cells = match Self::threshold(sorted, budget) {
            Some(threshold) => field.values().mapv(|value| value > threshold),
            None => Array2::from_elem(field.values().dim(), false),
        };
        Mask::new(cells)
    }
}

fn sorted_descending(field: &InsecurityField) -> Vec<f32> {
    let mut values = field.values().iter().copied().collect_vec();
    values.sort_unstable_by(|lhs, rhs| rhs.total_cmp(lhs));
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BudgetSweep;

    fn budget(value: f64) -> Budget {
        Budget::try_from(value).unwrap()
    }

    #[test]
    fn single_region_is_recovered_exactly() -> Result<()> {
        // top-left quarter is the unique maximum
        let mut values = Array2::from_elem((224, 224), 1f32);
        values.slice_mut(s![..112, ..112]).fill(5.0);
        let field = InsecurityField::new(values)?;

        let mask = MaskThresholder::new(vec![budget(0.25)])?.mask(&field, budget(0.25))?;
        assert_eq!(mask.count(), 112 * 112);
        assert!(mask.cells().slice(s![..112, ..112]).iter().all(|&on| on));
        Ok(())
    }

    #[test]
    fn ties_at_threshold_are_off() -> Result<()> {
        let field = InsecurityField::new(Array2::from_elem((224, 224), 2f32))?;
        let thresholder = MaskThresholder::new(vec![budget(0.1), budget(0.5), budget(0.9)])?;

        let masks = thresholder.masks(&field)?;
        assert_eq!(masks.len(), 3);
        assert!(masks.iter().all(|mask| mask.count() == 0));
        Ok(())
    }

    #[test]
    fn zero_retained_cells_give_empty_mask() {
        let sorted = vec![4f32, 3.0, 2.0, 1.0];
        assert_eq!(MaskThresholder::threshold(&sorted, budget(0.2)), None);
        assert_eq!(MaskThresholder::threshold(&sorted, budget(0.5)), Some(2.0));
    }

    #[test]
    fn mask_never_exceeds_budget() -> Result<()> {
        let values =
            Array2::from_shape_fn((224, 224), |(row, col)| ((row * 7 + col * 13) % 31) as f32);
        let field = InsecurityField::new(values)?;
        let budgets = BudgetSweep::default().budgets()?;
        let thresholder = MaskThresholder::new(budgets.clone())?;

        thresholder
            .masks(&field)?
            .iter()
            .zip(budgets)
            .for_each(|(mask, budget)| {
                assert!(mask.count() <= budget.num_retained(CANONICAL_AREA));
            });
        Ok(())
    }
}
