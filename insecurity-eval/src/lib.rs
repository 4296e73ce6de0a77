//! The evaluation program for insecurity maps.

mod common;
pub mod config;
pub mod dataset;
pub mod output;

use crate::{common::*, config::Config, dataset::EvalDataset};
use insecurity::{
    dataset::{GroundTruthRecord, ImagePreprocessor, LoadedImage},
    model::{ClassifierNet, DifficultyNet, DifficultyNetInit},
    pipeline::{ImageInput, InsecurityExtractor},
    score::{ImageScore, ScoreAggregator},
    selection::{HardExample, HardExampleSelector},
    validation::{Accuracy, Prediction},
};

/// The entry of the evaluation program.
pub fn start(config: &Config) -> Result<()> {
    let start_time = Local::now();
    let output_dir = config
        .output
        .dir
        .join(format!("{}", start_time.format(output::FILE_STRFTIME)));

    // create dirs and save config
    {
        fs::create_dir_all(&output_dir)?;
        let path = output_dir.join("config.json5");
        let text = serde_json::to_string_pretty(config)?;
        fs::write(&path, text)?;
    }

    // load models
    info!("loading models");
    let (mut classifier, mut difficulty) = load_models(config)?;

    // load dataset
    info!("loading dataset");
    let dataset = EvalDataset::load(&config.dataset)?;
    let preprocessor = ImagePreprocessor::new(&config.dataset.preprocess, config.model.device)?;

    // the extractor validates the probed layers before any image is touched
    let extractor = InsecurityExtractor::new(
        &classifier,
        &difficulty,
        &config.model.attribution,
        &config.extraction,
    )?;

    // select hard examples
    info!("scoring difficulty of {} images", dataset.records.len());
    let selector = HardExampleSelector::new(&config.selection)?;
    let (hard_examples, predictions) = select_hard_examples(
        config,
        &dataset.records,
        &preprocessor,
        &classifier,
        &difficulty,
        &selector,
    )?;
    let accuracy = Accuracy::measure(&predictions);
    info!(
        "Prec@1 {:.3} Prec@5 {:.3} over {} images",
        accuracy.top1.unwrap_or(f64::NAN) * 100.0,
        accuracy.top5.unwrap_or(f64::NAN) * 100.0,
        accuracy.num_images
    );
    output::write_difficulty_scores(output_dir.join("difficulty_scores.csv"), &predictions)?;
    output::write_hard_examples(output_dir.join("hard_examples.txt"), &hard_examples)?;
    info!("selected {} hard examples", hard_examples.len());

    // extract and score insecurity maps
    let mut aggregator = ScoreAggregator::new(extractor.budgets().to_vec());
    for (step, example) in hard_examples.iter().enumerate() {
        let dataset_index = example.record.dataset_index;
        info!(
            "processing image {} ({}/{})",
            dataset_index,
            step + 1,
            hard_examples.len()
        );

        let result = evaluate_image(
            &extractor,
            &mut classifier,
            &mut difficulty,
            &preprocessor,
            &dataset,
            example,
        );
        match isolate_failure(config.extraction.skip_failed_images, dataset_index, result)? {
            Some(score) => aggregator.push(score)?,
            None => aggregator.record_failure(),
        }
    }

    // save results
    let curve = aggregator.curve();
    output::write_curve(output_dir.join("curve.csv"), &curve)?;
    let summary = output::Summary {
        num_selected_images: hard_examples.len(),
        num_scored_images: aggregator.images().len(),
        num_failed_images: aggregator.num_failed_images(),
        num_usable_pairs: aggregator
            .images()
            .iter()
            .map(|image| image.num_usable_pairs)
            .sum(),
        num_no_effect_pairs: aggregator
            .images()
            .iter()
            .map(|image| image.num_no_effect_pairs)
            .sum(),
        accuracy,
        curve: &curve,
        images: aggregator.images(),
    };
    output::write_summary(output_dir.join("summary.json"), &summary)?;
    info!("results are saved in '{}'", output_dir.display());

    Ok(())
}

fn load_models(config: &Config) -> Result<(ClassifierNet, DifficultyNet)> {
    let model = &config.model;

    let mut classifier = ClassifierNet::alexnet(model.device, model.num_classes)?;
    classifier.load(&model.classifier_file)?;

    let mut difficulty = DifficultyNetInit {
        trunk_outputs: model.trunk_outputs,
        hidden: model.difficulty_hidden,
    }
    .build(model.device)?;
    difficulty.load(&model.difficulty_file)?;

    Ok((classifier, difficulty))
}

fn select_hard_examples(
    config: &Config,
    records: &[GroundTruthRecord],
    preprocessor: &ImagePreprocessor,
    classifier: &ClassifierNet,
    difficulty: &DifficultyNet,
    selector: &HardExampleSelector,
) -> Result<(Vec<HardExample>, Vec<Prediction>)> {
    let skip_failed_images = config.extraction.skip_failed_images;
    let mut scored = Vec::with_capacity(records.len());
    let mut predictions = Vec::with_capacity(records.len());

    for record in records {
        let result = score_record(record, preprocessor, classifier, difficulty, selector);
        if let Some((example, prediction)) =
            isolate_failure(skip_failed_images, record.dataset_index, result)?
        {
            scored.push(example);
            predictions.push(prediction);
        }
    }

    Ok((selector.select(scored), predictions))
}

fn score_record(
    record: &GroundTruthRecord,
    preprocessor: &ImagePreprocessor,
    classifier: &ClassifierNet,
    difficulty: &DifficultyNet,
    selector: &HardExampleSelector,
) -> Result<(HardExample, Prediction)> {
    let LoadedImage { tensor, .. } = preprocessor.load(&record.image_file)?;
    let (score, logits) = tch::no_grad(|| {
        (
            difficulty.forward_t(&tensor, false),
            classifier.forward_t(&tensor, false),
        )
    });

    let score = selector.difficulty(&score)?;
    let prediction = Prediction::from_logits(record, score, &logits)?;
    let example = HardExample {
        record: record.clone(),
        difficulty: score,
        candidates: selector.candidates(&logits)?,
    };
    Ok((example, prediction))
}

fn evaluate_image(
    extractor: &InsecurityExtractor,
    classifier: &mut ClassifierNet,
    difficulty: &mut DifficultyNet,
    preprocessor: &ImagePreprocessor,
    dataset: &EvalDataset,
    example: &HardExample,
) -> Result<ImageScore> {
    let record = &example.record;
    let parts = dataset.parts(record.dataset_index);
    let LoadedImage {
        tensor,
        original_size,
    } = preprocessor.load(&record.image_file)?;

    let input = ImageInput {
        dataset_index: record.dataset_index,
        image: &tensor,
        original_size,
        candidates: &example.candidates,
        parts: &parts,
    };
    extractor.process(classifier, difficulty, &input, &dataset.table)
}

/// Turns a per-image error into a skipped image when the configuration
/// allows it.
fn isolate_failure<T>(
    skip_failed_images: bool,
    dataset_index: usize,
    result: Result<T>,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if skip_failed_images => {
            warn!("skip image {}: {:#}", dataset_index, err);
            Ok(None)
        }
        Err(err) => {
            let context = format!("failed to process image {}", dataset_index);
            Err(err.context(context))
        }
    }
}
