use crate::common::*;

/// Fraction of the canonical grid kept "on" by a mask, strictly within `(0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Budget(R64);

impl Budget {
    pub fn to_f64(&self) -> f64 {
        self.0.raw()
    }

    /// Number of cells retained out of `num_cells`, rounded down.
    pub fn num_retained(&self, num_cells: usize) -> usize {
        // absorbs representation error so that exact products are not floored away
        let count = (self.0.raw() * num_cells as f64 + 1e-9).floor() as usize;
        count.min(num_cells)
    }
}

impl Display for Budget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.raw())
    }
}

impl Serialize for Budget {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Budget {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Self::try_from(value).map_err(|err| D::Error::custom(format!("{:?}", err)))
    }
}

impl TryFrom<R64> for Budget {
    type Error = Error;

    fn try_from(value: R64) -> Result<Self, Self::Error> {
        ensure!(
            value > 0.0 && value < 1.0,
            "budget value must be within range (0.0, 1.0), but get {}",
            value
        );
        Ok(Self(value))
    }
}

impl TryFrom<f64> for Budget {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::try_from(R64::try_new(value).ok_or_else(|| format_err!("not a finite value"))?)
    }
}

impl From<Budget> for f64 {
    fn from(budget: Budget) -> Self {
        budget.0.raw()
    }
}

/// Arithmetic sweep `start, start + step, ...` excluding `stop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSweep {
    pub start: R64,
    pub stop: R64,
    pub step: R64,
}

impl Default for BudgetSweep {
    fn default() -> Self {
        Self {
            start: r64(0.01),
            stop: r64(1.0),
            step: r64(0.01),
        }
    }
}

impl BudgetSweep {
    pub fn budgets(&self) -> Result<Vec<Budget>> {
        let Self { start, stop, step } = *self;
        ensure!(step > 0.0, "budget step must be positive, but get {}", step);
        ensure!(
            start < stop,
            "budget start {} must be less than stop {}",
            start,
            stop
        );

        let count = ((stop - start) / step).raw().ceil() as usize;
        let budgets: Vec<_> = (0..count)
            .map(|index| {
                // snap to 12 decimals so 0.25, 0.5 and 0.75 stay exact
                let value = start.raw() + step.raw() * index as f64;
                (value * 1e12).round() / 1e12
            })
            .filter(|&value| value < stop.raw())
            .map(Budget::try_from)
            .try_collect()?;

        ensure!(!budgets.is_empty(), "the budget sweep is empty");
        Ok(budgets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn budget_range_is_open() {
        assert!(Budget::try_from(0.0).is_err());
        assert!(Budget::try_from(1.0).is_err());
        assert!(Budget::try_from(f64::NAN).is_err());
        assert!(Budget::try_from(0.5).is_ok());
    }

    #[test]
    fn default_sweep_has_99_budgets() -> Result<()> {
        let budgets = BudgetSweep::default().budgets()?;
        assert_eq!(budgets.len(), 99);
        assert_abs_diff_eq!(budgets[0].to_f64(), 0.01);
        assert_abs_diff_eq!(budgets[98].to_f64(), 0.99);
        assert_eq!(budgets[24].to_f64(), 0.25);
        assert_eq!(budgets[49].to_f64(), 0.5);
        Ok(())
    }

    #[test]
    fn retained_cells_round_down() -> Result<()> {
        assert_eq!(Budget::try_from(0.5)?.num_retained(CANONICAL_AREA), 25088);
        assert_eq!(Budget::try_from(0.29)?.num_retained(CANONICAL_AREA), 14551);
        assert_eq!(Budget::try_from(0.01)?.num_retained(16), 0);
        Ok(())
    }

    #[test]
    fn sweep_rejects_bad_ranges() {
        let backwards = BudgetSweep {
            start: r64(0.5),
            stop: r64(0.1),
            step: r64(0.1),
        };
        assert!(backwards.budgets().is_err());

        let out_of_range = BudgetSweep {
            start: r64(0.0),
            stop: r64(0.5),
            step: r64(0.1),
        };
        assert!(out_of_range.budgets().is_err());
    }
}
