use super::{AttributionError, SaliencyMap};
use crate::{
    common::*,
    model::{AttributionModel, Probe},
};

/// Attributes scalar targets of a model at one named layer.
///
/// The layer is validated against the model's registry on construction.
#[derive(Debug, Clone)]
pub struct GradientAttributionExtractor {
    layer: String,
}

impl GradientAttributionExtractor {
    pub fn new<M>(model: &M, layer: impl Into<String>) -> Result<Self, AttributionError>
    where
        M: AttributionModel,
    {
        let layer = layer.into();
        model.probe_registry().check_layer(&layer)?;
        Ok(Self { layer })
    }

    pub fn layer(&self) -> &str {
        &self.layer
    }

    /// Runs the forward pass of a new session on a `[1, 3, H, W]` image.
    pub fn session<'a, M>(
        &self,
        model: &'a mut M,
        input: &Tensor,
    ) -> Result<AttributionSession<'a, M>>
    where
        M: AttributionModel,
    {
        let input_size = input.size();
        ensure!(
            matches!(*input_size.as_slice(), [1, _, _, _]),
            "expect input of shape [1, C, H, W], but get {:?}",
            input_size
        );

        let input = input.detach().set_requires_grad(true);
        let Probe { activation, output } =
            tch::with_grad(|| model.forward_probe(&input, &self.layer))
                .with_context(|| format!("forward pass failed at layer '{}'", self.layer))?;

        Ok(AttributionSession {
            model,
            activation,
            output,
        })
    }
}

/// One forward pass waiting for exactly one backward pass.
///
/// Consumed by [AttributionSession::attribute], so a recorded graph is never
/// reused for a second target.
pub struct AttributionSession<'a, M>
where
    M: AttributionModel,
{
    model: &'a mut M,
    activation: Tensor,
    output: Tensor,
}

impl<'a, M> AttributionSession<'a, M>
where
    M: AttributionModel,
{
    pub fn output(&self) -> &Tensor {
        &self.output
    }

    /// Backpropagates the scalar selected by `target` from the model output.
    pub fn attribute<F>(self, target: F) -> Result<SaliencyMap>
    where
        F: FnOnce(&Tensor) -> Result<Tensor>,
    {
        let Self {
            model,
            activation,
            output,
        } = self;

        let target = target(&output)?;
        ensure!(
            target.numel() == 1,
            "the attribution target must be a scalar, but get shape {:?}",
            target.size()
        );

        model.zero_grad();
        let gradient = Tensor::run_backward(&[&target], &[&activation], false, false)
            .into_iter()
            .next()
            .ok_or_else(|| format_err!("no gradient returned for the probed activation"))?;

        SaliencyMap::from_activation_gradient(&activation, &gradient)
    }
}
