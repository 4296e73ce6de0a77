use super::{AttributionError, ClassSaliency, GradientAttributionExtractor, SaliencyMap};
use crate::{common::*, config::AttributionConfig, model::AttributionModel};

/// Attributes the logits of the candidate classes of an image, one map per
/// candidate.
#[derive(Debug, Clone)]
pub struct ClassConfusionAttributor {
    extractor: GradientAttributionExtractor,
}

impl ClassConfusionAttributor {
    pub fn new<M>(model: &M, config: &AttributionConfig) -> Result<Self>
    where
        M: AttributionModel,
    {
        let extractor = GradientAttributionExtractor::new(model, &config.classifier_layer)?;
        Ok(Self { extractor })
    }

    pub fn layer(&self) -> &str {
        self.extractor.layer()
    }

    pub fn attribute<M>(
        &self,
        model: &mut M,
        input: &Tensor,
        candidates: &[i64],
    ) -> Result<ClassSaliency>
    where
        M: AttributionModel,
    {
        ensure!(!candidates.is_empty(), "no candidate classes are given");

        let maps: Vec<SaliencyMap> = candidates
            .iter()
            .map(|&class| {
                let session = self.extractor.session(&mut *model, input)?;
                session.attribute(|logits| {
                    let num_classes = match *logits.size().as_slice() {
                        [1, num_classes] => num_classes,
                        ref shape => bail!("expect logits of shape [1, N], but get {:?}", shape),
                    };
                    if !(0..num_classes).contains(&class) {
                        let err = AttributionError::ClassOutOfRange { class, num_classes };
                        return Err(err.into());
                    }

                    let device = logits.device();
                    let index = Tensor::of_slice(&[class]).to_device(device);
                    let one_hot = Tensor::zeros(&[1, num_classes], (Kind::Float, device))
                        .f_index_fill_(1, &index, 1.0)?;
                    Ok((logits * one_hot).sum(Kind::Float))
                })
            })
            .try_collect()?;

        ClassSaliency::from_maps(&maps, candidates.to_vec())
    }
}
