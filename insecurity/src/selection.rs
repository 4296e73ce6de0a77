use crate::{common::*, config::SelectionConfig, dataset::GroundTruthRecord};

/// A test image with its predicted difficulty and candidate classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardExample {
    pub record: GroundTruthRecord,
    pub difficulty: R64,
    pub candidates: Vec<i64>,
}

/// Picks the images the difficulty model rates hardest.
#[derive(Debug, Clone)]
pub struct HardExampleSelector {
    num_hardest: usize,
    num_candidates: usize,
}

impl HardExampleSelector {
    pub fn new(config: &SelectionConfig) -> Result<Self> {
        let SelectionConfig {
            num_hardest,
            num_candidates,
        } = *config;
        ensure!(num_hardest > 0, "num_hardest must be positive");
        ensure!(
            num_candidates >= 2,
            "at least 2 candidate classes are required, but get {}",
            num_candidates
        );
        Ok(Self {
            num_hardest,
            num_candidates,
        })
    }

    pub fn num_candidates(&self) -> usize {
        self.num_candidates
    }

    /// Reads the single difficulty score of a `[1, 1]` output.
    pub fn difficulty(&self, output: &Tensor) -> Result<R64> {
        ensure!(
            output.numel() == 1,
            "expect one difficulty score, but get shape {:?}",
            output.size()
        );
        let score = output.f_view([-1])?.double_value(&[0]);
        R64::try_new(score)
            .ok_or_else(|| format_err!("the difficulty score {} is not finite", score))
    }

    /// Classes with the highest softmax probability, most probable first.
    pub fn candidates(&self, logits: &Tensor) -> Result<Vec<i64>> {
        let (_, num_classes) = logits.size2()?;
        ensure!(
            self.num_candidates as i64 <= num_classes,
            "cannot take {} candidates out of {} classes",
            self.num_candidates,
            num_classes
        );

        let probs = logits.f_softmax(-1, Kind::Float)?;
        let (_, indices) = probs.f_topk(self.num_candidates as i64, -1, true, true)?;
        Ok(Vec::<i64>::from(&indices.f_view([-1])?))
    }

    /// Sorts ascending by difficulty and keeps the hardest tail, still in
    /// ascending order.
    pub fn select(&self, mut scored: Vec<HardExample>) -> Vec<HardExample> {
        scored.sort_by_key(|example| example.difficulty);
        let skip = scored.len().saturating_sub(self.num_hardest);
        let selected = scored.split_off(skip);
        if let Some(easiest) = selected.first() {
            debug!(
                "kept {} of {} images with difficulty at least {}",
                selected.len(),
                skip + selected.len(),
                easiest.difficulty
            );
        }
        selected
    }
}
