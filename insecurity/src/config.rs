//! Component configuration sections.
//!
//! Each component takes its own section by reference at construction.

use crate::{budget::BudgetSweep, common::*};

/// Probed layer names of the two attributed models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionConfig {
    #[serde(default = "default_layer")]
    pub classifier_layer: String,
    #[serde(default = "default_layer")]
    pub difficulty_layer: String,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            classifier_layer: default_layer(),
            difficulty_layer: default_layer(),
        }
    }
}

/// Parameters of the pair enumeration, thresholding and scoring stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Number of top-ranked candidate slots kept per pixel.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub budgets: BudgetSweep,
    /// Log and exclude an image whose data cannot be processed instead of
    /// aborting the run.
    #[serde(default)]
    pub skip_failed_images: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            budgets: BudgetSweep::default(),
            skip_failed_images: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_num_hardest")]
    pub num_hardest: usize,
    #[serde(default = "default_num_candidates")]
    pub num_candidates: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            num_hardest: default_num_hardest(),
            num_candidates: default_num_candidates(),
        }
    }
}

/// Per-channel RGB normalization applied after scaling pixels to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    #[serde(default = "default_mean")]
    pub mean: [R64; 3],
    #[serde(default = "default_std")]
    pub std: [R64; 3],
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            mean: default_mean(),
            std: default_std(),
        }
    }
}

fn default_layer() -> String {
    "11".into()
}

fn default_top_k() -> usize {
    3
}

fn default_num_hardest() -> usize {
    100
}

fn default_num_candidates() -> usize {
    5
}

fn default_mean() -> [R64; 3] {
    [r64(0.4706145), r64(0.46000465), r64(0.45479808)]
}

fn default_std() -> [R64; 3] {
    [r64(0.26668432), r64(0.26578658), r64(0.2706199)]
}
