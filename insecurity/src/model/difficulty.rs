use super::{
    load_var_store, zero_var_store_grad, AlexNetInit, AttributionModel, FeatureNet, LayerRegistry,
    Probe, Stage,
};
use crate::common::*;

/// Trunk classifier chained with a head that scores how hard an image is.
#[derive(Debug, Clone)]
pub struct DifficultyNetInit {
    pub trunk_outputs: usize,
    pub hidden: usize,
}

impl Default for DifficultyNetInit {
    fn default() -> Self {
        Self {
            trunk_outputs: 1000,
            hidden: 512,
        }
    }
}

impl DifficultyNetInit {
    pub fn build(self, device: Device) -> Result<DifficultyNet> {
        let Self {
            trunk_outputs,
            hidden,
        } = self;
        ensure!(hidden > 0, "the difficulty head width must be positive");

        let vs = nn::VarStore::new(device);
        let root = vs.root();
        let trunk = AlexNetInit::new(trunk_outputs).build(&root / "trunk")?;

        let mut head = LayerRegistry::new();
        head.push(
            "0",
            nn::linear(
                &(&root / "head") / "0",
                trunk_outputs as i64,
                hidden as i64,
                Default::default(),
            ),
        )?;
        head.push("1", Stage::Relu)?;
        head.push(
            "2",
            nn::linear(&(&root / "head") / "2", hidden as i64, 1, Default::default()),
        )?;

        Ok(DifficultyNet { vs, trunk, head })
    }
}

/// Difficulty predictor yielding one pre-sigmoid score per image.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct DifficultyNet {
    #[derivative(Debug = "ignore")]
    vs: nn::VarStore,
    trunk: FeatureNet,
    head: LayerRegistry,
}

impl DifficultyNet {
    /// Wraps a trunk and head whose parameters live in `vs`.
    pub fn new(vs: nn::VarStore, trunk: FeatureNet, head: LayerRegistry) -> Self {
        Self { vs, trunk, head }
    }

    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        load_var_store(&mut self.vs, path.as_ref())
    }

    pub fn device(&self) -> Device {
        self.vs.device()
    }

    pub fn var_store(&self) -> &nn::VarStore {
        &self.vs
    }

    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        let xs = self.trunk.forward_t(xs, train);
        self.head.forward_t(&xs, train)
    }
}

impl AttributionModel for DifficultyNet {
    fn probe_registry(&self) -> &LayerRegistry {
        self.trunk.features()
    }

    fn forward_probe(&self, input: &Tensor, layer: &str) -> Result<Probe> {
        let Probe { activation, output } = self.trunk.forward_probe_t(input, layer, false)?;
        let output = self.head.forward_t(&output, false);
        Ok(Probe { activation, output })
    }

    fn zero_grad(&mut self) {
        zero_var_store_grad(&self.vs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_net_yields_one_score() -> Result<()> {
        let model = DifficultyNetInit {
            trunk_outputs: 1000,
            hidden: 16,
        }
        .build(Device::Cpu)?;

        let variables = model.var_store().variables();
        assert!(variables.contains_key("trunk.features.0.weight"));
        assert_eq!(variables["head.2.weight"].size(), vec![1, 16]);

        let input = Tensor::rand(&[1, 3, 224, 224], (Kind::Float, Device::Cpu));
        let probe = tch::no_grad(|| model.forward_probe(&input, "11"))?;
        assert_eq!(probe.activation.size(), vec![1, 256, 13, 13]);
        assert_eq!(probe.output.size(), vec![1, 1]);
        Ok(())
    }
}
