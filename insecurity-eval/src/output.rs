use crate::common::*;
use insecurity::{
    score::{CurvePoint, ImageScore},
    selection::HardExample,
    validation::{Accuracy, Prediction},
};

/// Timestamp format of output directory names.
pub const FILE_STRFTIME: &str = "%Y-%m-%d-%H-%M-%S.%3f%z";

#[derive(Debug, Serialize)]
struct CurveRow {
    budget: f64,
    recall: f64,
    precision: f64,
}

#[derive(Debug, Serialize)]
struct DifficultyRow {
    index: usize,
    difficulty: f64,
    predicted: Option<i64>,
    correct: bool,
}

/// Aggregated results of one run.
#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub num_selected_images: usize,
    pub num_scored_images: usize,
    pub num_failed_images: usize,
    pub num_usable_pairs: usize,
    pub num_no_effect_pairs: usize,
    pub accuracy: Accuracy,
    pub curve: &'a [CurvePoint],
    pub images: &'a [ImageScore],
}

/// Writes `budget,recall,precision` rows with NaN for excluded values.
pub fn write_curve(path: impl AsRef<Path>, curve: &[CurvePoint]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create '{}'", path.display()))?;

    for point in curve {
        writer.serialize(CurveRow {
            budget: point.budget.to_f64(),
            recall: point.recall.unwrap_or(f64::NAN),
            precision: point.precision.unwrap_or(f64::NAN),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `index,difficulty,predicted,correct` rows, one per test image.
pub fn write_difficulty_scores(path: impl AsRef<Path>, predictions: &[Prediction]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create '{}'", path.display()))?;

    for prediction in predictions {
        writer.serialize(DifficultyRow {
            index: prediction.dataset_index,
            difficulty: prediction.difficulty.raw(),
            predicted: prediction.predicted(),
            correct: prediction.is_correct(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `path label index` lines.
pub fn write_hard_examples(path: impl AsRef<Path>, examples: &[HardExample]) -> Result<()> {
    let path = path.as_ref();
    let mut file =
        fs::File::create(path).with_context(|| format!("failed to create '{}'", path.display()))?;

    for example in examples {
        let record = &example.record;
        writeln!(
            file,
            "{} {} {}",
            record.image_file.display(),
            record.label,
            record.dataset_index
        )?;
    }
    Ok(())
}

pub fn write_summary(path: impl AsRef<Path>, summary: &Summary<'_>) -> Result<()> {
    let path = path.as_ref();
    let text = serde_json::to_string_pretty(summary)?;
    fs::write(path, text).with_context(|| format!("failed to write '{}'", path.display()))?;
    Ok(())
}
