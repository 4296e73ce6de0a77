//! Classifier accuracy and per-image predictions over the test list.

use crate::{common::*, dataset::GroundTruthRecord};

/// Number of top classes kept per prediction, enough for top-5 accuracy.
pub const NUM_TOP_CLASSES: usize = 5;

/// The verdict of both models on one test image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub dataset_index: usize,
    pub label: i64,
    pub difficulty: R64,
    /// Classes ordered by descending logit.
    pub top_classes: Vec<i64>,
}

impl Prediction {
    pub fn from_logits(
        record: &GroundTruthRecord,
        difficulty: R64,
        logits: &Tensor,
    ) -> Result<Self> {
        let (_, num_classes) = logits.size2()?;
        ensure!(num_classes > 0, "the classifier yields no class");
        let k = num_classes.min(NUM_TOP_CLASSES as i64);
        let (_, indices) = logits.f_topk(k, -1, true, true)?;

        Ok(Self {
            dataset_index: record.dataset_index,
            label: record.label,
            difficulty,
            top_classes: Vec::<i64>::from(&indices.f_view([-1])?),
        })
    }

    pub fn predicted(&self) -> Option<i64> {
        self.top_classes.first().copied()
    }

    pub fn is_correct(&self) -> bool {
        self.predicted() == Some(self.label)
    }

    /// Whether the label is among the `k` most likely classes.
    pub fn is_top_k_correct(&self, k: usize) -> bool {
        self.top_classes
            .iter()
            .take(k)
            .any(|&class| class == self.label)
    }
}

/// Top-1 and top-5 accuracy, `None` over an empty set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Accuracy {
    pub num_images: usize,
    pub top1: Option<f64>,
    pub top5: Option<f64>,
}

impl Accuracy {
    pub fn measure(predictions: &[Prediction]) -> Self {
        let num_images = predictions.len();
        let ratio = |k: usize| {
            let num_correct = predictions
                .iter()
                .filter(|prediction| prediction.is_top_k_correct(k))
                .count();
            (num_images > 0).then(|| num_correct as f64 / num_images as f64)
        };

        Self {
            num_images,
            top1: ratio(1),
            top5: ratio(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn record(index: usize, label: i64) -> GroundTruthRecord {
        GroundTruthRecord {
            image_file: PathBuf::from(format!("{}.jpg", index)),
            label,
            dataset_index: index,
        }
    }

    fn prediction(label: i64, top_classes: Vec<i64>) -> Prediction {
        Prediction {
            dataset_index: 0,
            label,
            difficulty: r64(0.0),
            top_classes,
        }
    }

    #[test]
    fn prediction_follows_logits() -> Result<()> {
        let logits = Tensor::of_slice(&[0.1f32, 3.0, -2.0, 1.5, 2.0, 0.5, -1.0]).view([1, 7]);
        let prediction = Prediction::from_logits(&record(4, 4), r64(1.5), &logits)?;

        assert_eq!(prediction.top_classes, vec![1, 4, 3, 5, 0]);
        assert_eq!(prediction.predicted(), Some(1));
        assert!(!prediction.is_correct());
        assert!(prediction.is_top_k_correct(2));
        assert!(!prediction.is_top_k_correct(1));

        let few_classes = Tensor::of_slice(&[0.2f32, 0.9, 0.1]).view([1, 3]);
        let prediction = Prediction::from_logits(&record(5, 1), r64(0.0), &few_classes)?;
        assert_eq!(prediction.top_classes, vec![1, 0, 2]);
        assert!(prediction.is_correct());
        Ok(())
    }

    #[test]
    fn accuracy_counts_top1_and_top5() {
        let predictions = vec![
            prediction(3, vec![3, 1, 2, 0, 4]),
            prediction(4, vec![3, 1, 2, 0, 4]),
            prediction(9, vec![3, 1, 2, 0, 4]),
            prediction(1, vec![1, 3, 2, 0, 4]),
        ];
        let accuracy = Accuracy::measure(&predictions);

        assert_eq!(accuracy.num_images, 4);
        assert_abs_diff_eq!(accuracy.top1.unwrap(), 0.5);
        assert_abs_diff_eq!(accuracy.top5.unwrap(), 0.75);

        let empty = Accuracy::measure(&[]);
        assert_eq!(empty.top1, None);
        assert_eq!(empty.top5, None);
    }
}
