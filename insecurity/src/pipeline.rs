use crate::{
    attribution::{ClassConfusionAttributor, ClassSaliency, DifficultyAttributor, SaliencyMap},
    budget::Budget,
    common::*,
    config::{AttributionConfig, ExtractionConfig},
    confusion::{ClassPair, ConfusionPairEnumerator},
    field::{InsecurityField, InsecurityFieldBuilder, SALIENCY_EPSILON},
    ground_truth::{
        AttributeGroundTruthProjector, CommonAttributeTable, PartLocations, ProjectedParts,
    },
    mask::MaskThresholder,
    model::AttributionModel,
    score::{ImageScore, ImageScoreBuilder},
};

/// Per-image inputs of the extraction.
#[derive(Debug)]
pub struct ImageInput<'a> {
    pub dataset_index: usize,
    /// Preprocessed `[1, 3, 224, 224]` image.
    pub image: &'a Tensor,
    pub original_size: RawSize<usize>,
    pub candidates: &'a [i64],
    pub parts: &'a PartLocations,
}

/// Attribution maps of one image.
#[derive(Debug, Clone)]
pub struct ImageAttribution {
    pub difficulty: SaliencyMap,
    pub classes: ClassSaliency,
}

/// Scores the pair fields of one image against its projected parts.
#[derive(Debug, Clone)]
pub struct ImageScorer {
    thresholder: MaskThresholder,
    projector: AttributeGroundTruthProjector,
}

impl ImageScorer {
    pub fn new(thresholder: MaskThresholder, projector: AttributeGroundTruthProjector) -> Self {
        Self {
            thresholder,
            projector,
        }
    }

    pub fn budgets(&self) -> &[Budget] {
        self.thresholder.budgets()
    }

    pub fn project(&self, parts: &PartLocations, size: &RawSize<usize>) -> Result<ProjectedParts> {
        self.projector.project(parts, size)
    }

    /// Fields are only built for pairs with usable common ground truth.
    pub fn score<F>(
        &self,
        dataset_index: usize,
        pairs: &[ClassPair],
        candidates: &[i64],
        projected: &ProjectedParts,
        table: &CommonAttributeTable,
        mut build_field: F,
    ) -> Result<ImageScore>
    where
        F: FnMut(ClassPair) -> Result<InsecurityField>,
    {
        let all = projected.all_positions();
        let mut builder = ImageScoreBuilder::new(dataset_index, self.budgets().len());

        for &pair in pairs {
            let (first, second) = pair.classes(candidates)?;
            let attributes = table.lookup(first, second);
            if attributes.is_empty() {
                debug!(
                    "image {}: no common attributes for classes ({}, {})",
                    dataset_index, first, second
                );
                builder.add_no_effect();
                continue;
            }

            let common = projected.common_positions(attributes)?;
            if common.is_empty() {
                debug!(
                    "image {}: common attributes of classes ({}, {}) are not annotated",
                    dataset_index, first, second
                );
                builder.add_no_effect();
                continue;
            }

            let field = build_field(pair)?;
            let masks = self.thresholder.masks(&field)?;
            builder.add_pair(&masks, &common, &all)?;
        }

        Ok(builder.finish())
    }
}

/// Runs attribution, pair enumeration, field construction and scoring for
/// one image at a time.
#[derive(Debug, Clone)]
pub struct InsecurityExtractor {
    difficulty: DifficultyAttributor,
    classes: ClassConfusionAttributor,
    enumerator: ConfusionPairEnumerator,
    fields: InsecurityFieldBuilder,
    scorer: ImageScorer,
}

impl InsecurityExtractor {
    pub fn new<C, D>(
        classifier: &C,
        difficulty: &D,
        attribution: &AttributionConfig,
        extraction: &ExtractionConfig,
    ) -> Result<Self>
    where
        C: AttributionModel,
        D: AttributionModel,
    {
        let classes = ClassConfusionAttributor::new(classifier, attribution)
            .context("invalid classifier attribution layer")?;
        let difficulty = DifficultyAttributor::new(difficulty, attribution)
            .context("invalid difficulty attribution layer")?;
        let enumerator = ConfusionPairEnumerator::new(extraction)?;
        let thresholder = MaskThresholder::new(extraction.budgets.budgets()?)?;
        info!(
            "probing classifier layer '{}' and difficulty layer '{}' over {} budgets",
            classes.layer(),
            difficulty.layer(),
            thresholder.budgets().len()
        );

        Ok(Self {
            difficulty,
            classes,
            enumerator,
            fields: InsecurityFieldBuilder::new(),
            scorer: ImageScorer::new(thresholder, AttributeGroundTruthProjector::default()),
        })
    }

    pub fn budgets(&self) -> &[Budget] {
        self.scorer.budgets()
    }

    pub fn attribute<C, D>(
        &self,
        classifier: &mut C,
        difficulty: &mut D,
        image: &Tensor,
        candidates: &[i64],
    ) -> Result<ImageAttribution>
    where
        C: AttributionModel,
        D: AttributionModel,
    {
        let difficulty = self.difficulty.attribute(difficulty, image)?;
        let classes = self
            .classes
            .attribute(classifier, image, candidates)?
            .clip_negative(SALIENCY_EPSILON);
        Ok(ImageAttribution {
            difficulty,
            classes,
        })
    }

    pub fn process<C, D>(
        &self,
        classifier: &mut C,
        difficulty: &mut D,
        input: &ImageInput<'_>,
        table: &CommonAttributeTable,
    ) -> Result<ImageScore>
    where
        C: AttributionModel,
        D: AttributionModel,
    {
        let ImageInput {
            dataset_index,
            image,
            ref original_size,
            candidates,
            parts,
        } = *input;

        let attribution = self.attribute(classifier, difficulty, image, candidates)?;
        let pairs = self.enumerator.pairs(&attribution.classes)?;
        debug!("image {}: {} confusion pairs", dataset_index, pairs.len());

        let projected = self.scorer.project(parts, original_size)?;
        let build_field = |pair| {
            self.fields
                .build(&attribution.classes, &attribution.difficulty, pair)
        };
        self.scorer.score(
            dataset_index,
            &pairs,
            candidates,
            &projected,
            table,
            build_field,
        )
    }
}
