use super::{GradientAttributionExtractor, SaliencyMap};
use crate::{common::*, config::AttributionConfig, model::AttributionModel};

/// Attributes the pre-sigmoid difficulty score of an image.
#[derive(Debug, Clone)]
pub struct DifficultyAttributor {
    extractor: GradientAttributionExtractor,
}

impl DifficultyAttributor {
    pub fn new<M>(model: &M, config: &AttributionConfig) -> Result<Self>
    where
        M: AttributionModel,
    {
        let extractor = GradientAttributionExtractor::new(model, &config.difficulty_layer)?;
        Ok(Self { extractor })
    }

    pub fn layer(&self) -> &str {
        self.extractor.layer()
    }

    pub fn attribute<M>(&self, model: &mut M, input: &Tensor) -> Result<SaliencyMap>
    where
        M: AttributionModel,
    {
        let session = self.extractor.session(model, input)?;
        session.attribute(|output| {
            ensure!(
                output.numel() == 1,
                "the difficulty model must output one score, but get shape {:?}",
                output.size()
            );
            Ok(output.sum(Kind::Float))
        })
    }
}
