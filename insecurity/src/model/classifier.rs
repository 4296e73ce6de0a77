use super::{load_var_store, zero_var_store_grad, AttributionModel, LayerRegistry, Probe, Stage};
use crate::common::*;

/// A probed feature stack followed by a head.
#[derive(Debug)]
pub struct FeatureNet {
    features: LayerRegistry,
    head: LayerRegistry,
}

impl FeatureNet {
    pub fn new(features: LayerRegistry, head: LayerRegistry) -> Self {
        Self { features, head }
    }

    pub fn features(&self) -> &LayerRegistry {
        &self.features
    }

    pub fn head(&self) -> &LayerRegistry {
        &self.head
    }

    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        let xs = self.features.forward_t(xs, train);
        self.head.forward_t(&xs, train)
    }

    pub fn forward_probe_t(&self, xs: &Tensor, layer: &str, train: bool) -> Result<Probe> {
        let (activation, xs) = self.features.forward_capture_t(xs, layer, train)?;
        let output = self.head.forward_t(&xs, train);
        Ok(Probe { activation, output })
    }
}

/// AlexNet layout with torchvision-compatible parameter paths.
#[derive(Debug, Clone)]
pub struct AlexNetInit {
    pub num_classes: usize,
    pub dropout: f64,
}

impl AlexNetInit {
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            dropout: 0.5,
        }
    }

    pub fn build<'p, P>(self, path: P) -> Result<FeatureNet>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            num_classes,
            dropout,
        } = self;
        ensure!(num_classes > 0, "the number of classes must be positive");

        let conv = |name: &str, in_c: i64, out_c: i64, ksize: i64, stride: i64, padding: i64| {
            nn::conv2d(
                &(&(path / "features") / name),
                in_c,
                out_c,
                ksize,
                nn::ConvConfig {
                    stride,
                    padding,
                    ..Default::default()
                },
            )
        };
        let linear = |name: &str, in_dim: i64, out_dim: i64| {
            nn::linear(
                &(&(path / "classifier") / name),
                in_dim,
                out_dim,
                Default::default(),
            )
        };
        let max_pool = || Stage::MaxPool2D {
            ksize: 3,
            stride: 2,
        };

        let mut features = LayerRegistry::new();
        features.push("0", conv("0", 3, 64, 11, 4, 2))?;
        features.push("1", Stage::Relu)?;
        features.push("2", max_pool())?;
        features.push("3", conv("3", 64, 192, 5, 1, 2))?;
        features.push("4", Stage::Relu)?;
        features.push("5", max_pool())?;
        features.push("6", conv("6", 192, 384, 3, 1, 1))?;
        features.push("7", Stage::Relu)?;
        features.push("8", conv("8", 384, 256, 3, 1, 1))?;
        features.push("9", Stage::Relu)?;
        features.push("10", conv("10", 256, 256, 3, 1, 1))?;
        features.push("11", Stage::Relu)?;
        features.push("12", max_pool())?;

        let mut head = LayerRegistry::new();
        head.push("avgpool", Stage::AdaptiveAvgPool2D([6, 6]))?;
        head.push("flatten", Stage::Flatten)?;
        head.push("classifier.0", Stage::Dropout(dropout))?;
        head.push("classifier.1", linear("1", 256 * 6 * 6, 4096))?;
        head.push("classifier.2", Stage::Relu)?;
        head.push("classifier.3", Stage::Dropout(dropout))?;
        head.push("classifier.4", linear("4", 4096, 4096))?;
        head.push("classifier.5", Stage::Relu)?;
        head.push("classifier.6", linear("6", 4096, num_classes as i64))?;

        Ok(FeatureNet::new(features, head))
    }
}

/// Image classifier producing per-class logits.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct ClassifierNet {
    #[derivative(Debug = "ignore")]
    vs: nn::VarStore,
    net: FeatureNet,
}

impl ClassifierNet {
    /// Wraps a network whose parameters live in `vs`.
    pub fn new(vs: nn::VarStore, net: FeatureNet) -> Self {
        Self { vs, net }
    }

    pub fn alexnet(device: Device, num_classes: usize) -> Result<Self> {
        let vs = nn::VarStore::new(device);
        let net = AlexNetInit::new(num_classes).build(vs.root())?;
        Ok(Self { vs, net })
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
        self.net.forward_t(xs, train)
    }
}

impl AttributionModel for ClassifierNet {
    fn probe_registry(&self) -> &LayerRegistry {
        self.net.features()
    }

    fn forward_probe(&self, input: &Tensor, layer: &str) -> Result<Probe> {
        self.net.forward_probe_t(input, layer, false)
    }

    fn zero_grad(&mut self) {
        zero_var_store_grad(&self.vs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alexnet_layout() -> Result<()> {
        let model = ClassifierNet::alexnet(Device::Cpu, 200)?;

        let names: Vec<_> = model.probe_registry().names().collect();
        let expect: Vec<String> = (0..=12).map(|index| index.to_string()).collect();
        assert_eq!(names, expect);

        let variables = model.var_store().variables();
        for name in [
            "features.0.weight",
            "features.10.bias",
            "classifier.1.weight",
            "classifier.6.bias",
        ] {
            assert!(variables.contains_key(name), "missing parameter {}", name);
        }
        assert_eq!(variables["classifier.6.weight"].size(), vec![200, 4096]);
        Ok(())
    }

    #[test]
    fn alexnet_probe_resolution() -> Result<()> {
        let model = ClassifierNet::alexnet(Device::Cpu, 200)?;
        let input = Tensor::rand(&[1, 3, 224, 224], (Kind::Float, Device::Cpu));

        let Probe { activation, output } = tch::no_grad(|| model.forward_probe(&input, "11"))?;
        assert_eq!(activation.size(), vec![1, 256, 13, 13]);
        assert_eq!(output.size(), vec![1, 200]);
        Ok(())
    }
}
