//! Networks with an explicit, ordered layer registry.

use crate::common::*;

mod stage;
pub use stage::*;

mod registry;
pub use registry::*;

mod classifier;
pub use classifier::*;

mod difficulty;
pub use difficulty::*;

/// Activation captured at a probed layer together with the network output
/// of the same forward pass.
#[derive(Debug)]
pub struct Probe {
    pub activation: Tensor,
    pub output: Tensor,
}

/// A network whose intermediate layers can be looked up by name.
pub trait AttributionModel {
    /// The registry holding the layers that can be probed.
    fn probe_registry(&self) -> &LayerRegistry;

    /// Runs one forward pass in evaluation mode and captures the output of
    /// `layer`.
    fn forward_probe(&self, input: &Tensor, layer: &str) -> Result<Probe>;

    /// Clears the accumulated gradients of all trainable parameters.
    fn zero_grad(&mut self);
}

pub(crate) fn zero_var_store_grad(vs: &nn::VarStore) {
    vs.trainable_variables()
        .iter_mut()
        .for_each(|param| param.zero_grad());
}

pub(crate) fn load_var_store(vs: &mut nn::VarStore, path: &Path) -> Result<()> {
    vs.load(path)
        .with_context(|| format!("failed to load checkpoint file '{}'", path.display()))?;
    Ok(())
}
