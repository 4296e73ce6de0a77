use crate::{budget::Budget, common::*, ground_truth::PositionGrid, mask::Mask};

/// Precision and recall at one budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrecRec<T>
where
    T: Copy,
{
    pub precision: T,
    pub recall: T,
}

/// Overlap counts of one mask with the ground truth of one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairCounts {
    pub common: usize,
    pub mask_common: usize,
    pub mask_all: usize,
}

impl PairCounts {
    pub fn measure(mask: &Mask, common: &PositionGrid, all: &PositionGrid) -> Self {
        Self {
            common: common.count(),
            mask_common: mask.count_overlap(common),
            mask_all: mask.count_overlap(all),
        }
    }

    pub fn recall(&self) -> Option<f64> {
        (self.common > 0).then(|| self.mask_common as f64 / self.common as f64)
    }

    /// Excluded when the mask misses every annotated part.
    pub fn precision(&self) -> Option<f64> {
        (self.mask_all > 0).then(|| self.mask_common as f64 / self.mask_all as f64)
    }
}

/// Per-budget scores of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageScore {
    pub dataset_index: usize,
    /// Pairs that were scored against usable ground truth.
    pub num_usable_pairs: usize,
    /// Pairs without usable common ground truth.
    pub num_no_effect_pairs: usize,
    /// Per budget, the number of usable pairs whose precision is defined.
    pub num_precision_pairs: Vec<usize>,
    pub scores: Vec<PrecRec<Option<f64>>>,
}

/// Accumulates the pairs of one image.
#[derive(Debug, Clone)]
pub struct ImageScoreBuilder {
    dataset_index: usize,
    recall_sum: Vec<f64>,
    precision_sum: Vec<f64>,
    precision_count: Vec<usize>,
    num_usable_pairs: usize,
    num_no_effect_pairs: usize,
}

impl ImageScoreBuilder {
    pub fn new(dataset_index: usize, num_budgets: usize) -> Self {
        Self {
            dataset_index,
            recall_sum: vec![0.0; num_budgets],
            precision_sum: vec![0.0; num_budgets],
            precision_count: vec![0; num_budgets],
            num_usable_pairs: 0,
            num_no_effect_pairs: 0,
        }
    }

    pub fn add_no_effect(&mut self) {
        self.num_no_effect_pairs += 1;
    }

    /// Scores the masks of one pair, one mask per budget.
    pub fn add_pair(
        &mut self,
        masks: &[Mask],
        common: &PositionGrid,
        all: &PositionGrid,
    ) -> Result<()> {
        ensure!(
            masks.len() == self.recall_sum.len(),
            "expect {} masks, one per budget, but get {}",
            self.recall_sum.len(),
            masks.len()
        );
        ensure!(
            !common.is_empty(),
            "a usable pair needs common ground truth"
        );

        masks.iter().enumerate().for_each(|(index, mask)| {
            let counts = PairCounts::measure(mask, common, all);
            self.recall_sum[index] += counts.recall().unwrap_or(0.0);
            if let Some(precision) = counts.precision() {
                self.precision_sum[index] += precision;
                self.precision_count[index] += 1;
            }
        });
        self.num_usable_pairs += 1;
        Ok(())
    }

    pub fn finish(self) -> ImageScore {
        let Self {
            dataset_index,
            recall_sum,
            precision_sum,
            precision_count,
            num_usable_pairs,
            num_no_effect_pairs,
        } = self;

        let scores = izip!(&recall_sum, &precision_sum, &precision_count)
            .map(|(&recall, &precision, &count)| PrecRec {
                recall: (num_usable_pairs > 0).then(|| recall / num_usable_pairs as f64),
                precision: (count > 0).then(|| precision / count as f64),
            })
            .collect();

        ImageScore {
            dataset_index,
            num_usable_pairs,
            num_no_effect_pairs,
            num_precision_pairs: precision_count,
            scores,
        }
    }
}

/// Mean of the defined values, `None` when every value is excluded.
pub fn nan_skipping_mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// One point of the aggregated curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub budget: Budget,
    pub recall: Option<f64>,
    pub precision: Option<f64>,
}

/// Collects image scores and averages them per budget.
#[derive(Debug, Clone)]
pub struct ScoreAggregator {
    budgets: Vec<Budget>,
    images: Vec<ImageScore>,
    num_failed_images: usize,
}

impl ScoreAggregator {
    pub fn new(budgets: Vec<Budget>) -> Self {
        Self {
            budgets,
            images: vec![],
            num_failed_images: 0,
        }
    }

    pub fn push(&mut self, score: ImageScore) -> Result<()> {
        ensure!(
            score.scores.len() == self.budgets.len(),
            "image {} has {} scores, but {} budgets are configured",
            score.dataset_index,
            score.scores.len(),
            self.budgets.len()
        );
        self.images.push(score);
        Ok(())
    }

    pub fn record_failure(&mut self) {
        self.num_failed_images += 1;
    }

    pub fn budgets(&self) -> &[Budget] {
        &self.budgets
    }

    pub fn images(&self) -> &[ImageScore] {
        &self.images
    }

    pub fn num_failed_images(&self) -> usize {
        self.num_failed_images
    }

    pub fn curve(&self) -> Vec<CurvePoint> {
        self.budgets
            .iter()
            .enumerate()
            .map(|(index, &budget)| {
                let scores = || self.images.iter().map(move |image| image.scores[index]);
                CurvePoint {
                    budget,
                    recall: nan_skipping_mean(scores().map(|score| score.recall)),
                    precision: nan_skipping_mean(scores().map(|score| score.precision)),
                }
            })
            .collect()
    }
}
